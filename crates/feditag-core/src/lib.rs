//! Core of the `<fedi-tag>` widget.
//!
//! The widget shows the posts of one account on a Mastodon-compatible server,
//! filtered by a hashtag, and renders them a few at a time as the reader scrolls.
//! This crate holds everything that does not touch a browser:
//!
//! - `types`: post records as the server returns them
//! - `config`: widget configuration read from host attributes
//! - `escape`, `emoji`, `hashtags`: text processing for post bodies
//! - `markup`: the structured node tree rendered posts are built from
//! - `render`: turns one post into a [`RenderedPost`]
//! - `feed`: request latch and response parsing
//! - `scheduler`: chunked rendering offsets
//! - `widget`: per-instance state tying the above to a [`Surface`]
//!
//! The browser side lives in `feditag-browser`, which implements [`Surface`]
//! and [`Lightbox`] over `web-sys`.

pub mod config;
pub mod emoji;
pub mod error;
pub mod escape;
pub mod feed;
pub mod hashtags;
pub mod markup;
pub mod render;
pub mod scheduler;
pub mod types;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{ConfigError, FeedError, FeditagError};
pub use escape::escape_html;
pub use hashtags::{ChildKind, ContentBlocks, strip_trailing_hashtags};
pub use markup::{Element, Node};
pub use render::{Gallery, PostRenderer, RenderedPost};
pub use scheduler::BatchCursor;
pub use types::{Emoji, MediaAttachment, MediaKind, Poll, PollOption, Post};
pub use widget::{BatchOutcome, Lightbox, NoLightbox, Surface, Widget};
