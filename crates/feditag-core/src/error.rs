use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("missing required attribute `{name}`")]
    #[diagnostic(
        code(feditag::config::missing_attribute),
        help("set `host`, `account` and `tag` on the <fedi-tag> element")
    )]
    MissingAttribute { name: &'static str },

    #[error("`{host}` is not a usable server host")]
    #[diagnostic(code(feditag::config::invalid_host))]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("attribute `{name}` must be a positive integer, got `{value}`")]
    #[diagnostic(code(feditag::config::invalid_number))]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Error, Diagnostic)]
pub enum FeedError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(code(feditag::feed::request))]
    Request { url: String, message: String },

    #[error("response body is not valid JSON: {0}")]
    #[diagnostic(code(feditag::feed::decode))]
    Decode(String),
}

/// Everything that can stop a widget from showing posts.
#[derive(Debug, Error, Diagnostic)]
pub enum FeditagError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Feed(#[from] FeedError),
}
