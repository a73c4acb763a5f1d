use url::Url;

use crate::error::ConfigError;

/// Posts rendered per batch unless `chunk-size` says otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Largest page the statuses endpoint will return.
/// See <https://docs.joinmastodon.org/methods/accounts/#statuses>.
pub const MAX_LIMIT: u32 = 40;

pub const DEFAULT_LINK_ICON: &str = "external-link.svg";

/// Settings for one widget instance, read once when it is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub host: String,
    pub account: String,
    /// Hashtag without the leading `#`.
    pub tag: String,
    pub chunk_size: usize,
    pub limit: u32,
    pub link_icon: String,
}

impl WidgetConfig {
    pub fn new(
        host: impl Into<String>,
        account: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        let tag = tag.into();
        Self {
            host: host.into(),
            account: account.into(),
            tag: tag.trim_start_matches('#').to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            limit: MAX_LIMIT,
            link_icon: DEFAULT_LINK_ICON.to_string(),
        }
    }

    /// Build a config from host element attributes.
    ///
    /// `attribute` looks up one attribute by name. Blank values count as missing.
    pub fn from_attributes<F>(attribute: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &'static str| {
            attribute(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingAttribute { name });

        let mut config = Self::new(required("host")?, required("account")?, required("tag")?);
        if config.tag.is_empty() {
            return Err(ConfigError::MissingAttribute { name: "tag" });
        }

        if let Some(value) = lookup("chunk-size") {
            config.chunk_size = match value.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "chunk-size",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("limit") {
            let limit = value
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "limit",
                    value: value.clone(),
                })?;
            config.limit = limit.clamp(1, MAX_LIMIT);
        }
        if let Some(icon) = lookup("link-icon") {
            config.link_icon = icon;
        }

        // surface a bad host now rather than at load time
        config.statuses_url()?;
        Ok(config)
    }

    /// `https://{host}/api/v1/accounts/{account}/statuses?limit=..&tagged=..`
    pub fn statuses_url(&self) -> Result<Url, ConfigError> {
        let invalid_host = |source| ConfigError::InvalidHost {
            host: self.host.clone(),
            source,
        };
        let mut url = Url::parse(&format!("https://{}/", self.host)).map_err(invalid_host)?;
        if url.path() != "/" || url.query().is_some() {
            return Err(invalid_host(url::ParseError::InvalidDomainCharacter));
        }
        url.path_segments_mut()
            .map_err(|_| invalid_host(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .clear()
            .extend(["api", "v1", "accounts", self.account.as_str(), "statuses"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.limit.to_string())
            .append_pair("tagged", &self.tag);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn builds_statuses_url() {
        let config = WidgetConfig::new("mastodon.example", "109876", "rustlang");
        assert_eq!(
            config.statuses_url().unwrap().as_str(),
            "https://mastodon.example/api/v1/accounts/109876/statuses?limit=40&tagged=rustlang"
        );
    }

    #[test]
    fn reads_attributes_with_defaults() {
        let config = WidgetConfig::from_attributes(attrs(&[
            ("host", "mastodon.example"),
            ("account", "42"),
            ("tag", "#photos"),
        ]))
        .unwrap();
        assert_eq!(config.tag, "photos");
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.limit, MAX_LIMIT);
        assert_eq!(config.link_icon, DEFAULT_LINK_ICON);
    }

    #[test]
    fn optional_attributes() {
        let config = WidgetConfig::from_attributes(attrs(&[
            ("host", "mastodon.example"),
            ("account", "42"),
            ("tag", "photos"),
            ("chunk-size", "3"),
            ("limit", "400"),
            ("link-icon", "/static/open.svg"),
        ]))
        .unwrap();
        assert_eq!(config.chunk_size, 3);
        assert_eq!(config.limit, MAX_LIMIT);
        assert_eq!(config.link_icon, "/static/open.svg");
    }

    #[test]
    fn missing_and_blank_attributes() {
        let err = WidgetConfig::from_attributes(attrs(&[("host", "h.example"), ("tag", "x")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAttribute { name: "account" }
        ));

        let err = WidgetConfig::from_attributes(attrs(&[
            ("host", "h.example"),
            ("account", "1"),
            ("tag", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAttribute { name: "tag" }));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = WidgetConfig::from_attributes(attrs(&[
            ("host", "h.example"),
            ("account", "1"),
            ("tag", "x"),
            ("chunk-size", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                name: "chunk-size",
                ..
            }
        ));
    }

    #[test]
    fn rejects_host_with_path() {
        let config = WidgetConfig::new("h.example/evil", "1", "x");
        assert!(matches!(
            config.statuses_url(),
            Err(ConfigError::InvalidHost { .. })
        ));
        let config = WidgetConfig::new("", "1", "x");
        assert!(config.statuses_url().is_err());
    }

    #[test]
    fn encodes_query_values() {
        let config = WidgetConfig::new("h.example", "1", "a&b");
        assert!(
            config
                .statuses_url()
                .unwrap()
                .as_str()
                .ends_with("tagged=a%26b")
        );
    }
}
