use feditag_core::FeedError;
use serde_json::Value;
use url::Url;

/// The widget's single request: GET the statuses page and decode it as JSON.
///
/// Non-2xx responses are still decoded; error bodies are JSON objects and end
/// up as "no posts" rather than a failure.
pub async fn fetch_statuses(url: Url) -> Result<Value, FeedError> {
    let request_error = |e: reqwest::Error| FeedError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = reqwest::get(url.clone()).await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "statuses request was not successful");
    }

    response.json::<Value>().await.map_err(|e| {
        if e.is_decode() {
            FeedError::Decode(e.to_string())
        } else {
            request_error(e)
        }
    })
}
