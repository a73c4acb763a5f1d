use serde_json::Value;

use crate::error::FeedError;
use crate::types::Post;

/// What a statuses response amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedContent {
    Posts(Vec<Post>),
    /// Empty array, or anything that is not an array (error objects included).
    Empty,
}

/// Parse a raw response body.
pub fn parse_feed(body: &str) -> Result<FeedContent, FeedError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    Ok(feed_from_value(value))
}

/// Interpret an already decoded JSON body.
///
/// Records that do not look like posts are logged and dropped so one bad
/// entry cannot hide the rest.
pub fn feed_from_value(value: Value) -> FeedContent {
    let Value::Array(items) = value else {
        tracing::debug!("statuses response is not an array");
        return FeedContent::Empty;
    };

    let posts: Vec<Post> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Post>(item) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed post");
                None
            }
        })
        .collect();

    if posts.is_empty() {
        FeedContent::Empty
    } else {
        FeedContent::Posts(posts)
    }
}

/// One-shot guard around the feed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedLatch {
    requested: bool,
}

impl FeedLatch {
    /// True the first time only.
    pub fn try_begin(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    pub fn is_loaded(&self) -> bool {
        self.requested
    }
}
