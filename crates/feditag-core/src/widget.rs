//! Per-instance widget state and the seams it renders through.
//!
//! A [`Widget`] owns everything one `<fedi-tag>` element needs: its config,
//! the loaded posts, the batch cursor, the gallery counter and the feed latch.
//! It never talks to a browser directly. Output goes to a [`Surface`], gallery
//! zoom goes to a [`Lightbox`], and the caller does the network request and
//! the visibility observation, feeding results back in.

use std::fmt;

use chrono::{TimeZone, Utc};
use serde_json::Value;
use url::Url;

use crate::config::WidgetConfig;
use crate::error::{ConfigError, FeedError};
use crate::feed::{FeedContent, FeedLatch, feed_from_value};
use crate::render::{GalleryCounter, PostRenderer, RenderedPost};
use crate::scheduler::BatchCursor;
use crate::types::Post;

pub const LOADING_TEXT: &str = "Loading posts...";
pub const NO_POSTS_TEXT: &str = "No posts found.";
pub const FETCHING_MORE_TEXT: &str = "Fetching more posts...";
pub const LOAD_FAILED_TEXT: &str = "Could not load posts.";
pub const MISCONFIGURED_TEXT: &str = "Widget is misconfigured.";

/// Where rendered posts end up: the posts container of one widget.
pub trait Surface {
    /// Handle to a "fetching more" block that can be removed later.
    type Placeholder;

    /// Replace the container's contents with a single status line.
    fn show_status(&mut self, message: &str);

    fn clear(&mut self);

    /// Append one post block. The surface parses `body_html`, strips the
    /// hashtag trailer, then adds the date header before it and the trailer
    /// nodes after it.
    fn append_post(&mut self, post: &RenderedPost);

    fn append_placeholder(&mut self, message: &str) -> Self::Placeholder;

    fn remove_placeholder(&mut self, placeholder: Self::Placeholder);
}

/// Optional image/video viewer supplied by the hosting page.
pub trait Lightbox {
    /// Enable the viewer for anchors matching `selector`.
    fn attach(&self, selector: &str);
}

/// Used when the page provides no viewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLightbox;

impl Lightbox for NoLightbox {
    fn attach(&self, _selector: &str) {}
}

impl<L: Lightbox + ?Sized> Lightbox for Box<L> {
    fn attach(&self, selector: &str) {
        (**self).attach(selector)
    }
}

/// Result of rendering one batch.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchOutcome<P> {
    /// Posts were rendered and a placeholder now waits to be scrolled into view.
    More(P),
    /// Nothing left to render (or nothing to render at all).
    Exhausted,
}

pub struct Widget<S: Surface, Tz: TimeZone = Utc> {
    config: WidgetConfig,
    surface: S,
    lightbox: Box<dyn Lightbox>,
    renderer: PostRenderer<Tz>,
    posts: Vec<Post>,
    cursor: BatchCursor,
    galleries: GalleryCounter,
    latch: FeedLatch,
}

impl<S, Tz> Widget<S, Tz>
where
    S: Surface,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    /// Set up a widget and put the loading message on its surface.
    pub fn new(config: WidgetConfig, mut surface: S, tz: Tz) -> Self {
        surface.show_status(LOADING_TEXT);
        Self {
            renderer: PostRenderer::new(tz, config.link_icon.clone()),
            cursor: BatchCursor::new(config.chunk_size),
            config,
            surface,
            lightbox: Box::new(NoLightbox),
            posts: Vec::new(),
            galleries: GalleryCounter::default(),
            latch: FeedLatch::default(),
        }
    }

    pub fn with_lightbox(mut self, lightbox: impl Lightbox + 'static) -> Self {
        self.lightbox = Box::new(lightbox);
        self
    }

    /// Give this widget's gallery ids their own namespace on a shared page.
    pub fn with_gallery_scope(mut self, scope: u32) -> Self {
        self.galleries = GalleryCounter::scoped(scope);
        self
    }

    /// Claim the one feed request this widget may make.
    ///
    /// Returns the URL to fetch the first time, `None` on every later call.
    pub fn begin_load(&mut self) -> Option<Url> {
        if !self.latch.try_begin() {
            tracing::trace!("feed already requested");
            return None;
        }
        match self.config.statuses_url() {
            Ok(url) => {
                tracing::debug!(%url, "requesting feed");
                Some(url)
            }
            Err(e) => {
                report_config_error(&mut self.surface, &e);
                None
            }
        }
    }

    /// Feed the decoded response body (or the failure) back in.
    pub fn finish_load(&mut self, response: Result<Value, FeedError>) -> BatchOutcome<S::Placeholder> {
        match response {
            Ok(value) => match feed_from_value(value) {
                FeedContent::Posts(posts) => self.load_posts(posts),
                FeedContent::Empty => {
                    self.surface.show_status(NO_POSTS_TEXT);
                    BatchOutcome::Exhausted
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to load feed");
                self.surface.show_status(LOAD_FAILED_TEXT);
                BatchOutcome::Exhausted
            }
        }
    }

    /// Replace the post list and render the first batch.
    pub fn load_posts(&mut self, posts: Vec<Post>) -> BatchOutcome<S::Placeholder> {
        if posts.is_empty() {
            self.surface.show_status(NO_POSTS_TEXT);
            return BatchOutcome::Exhausted;
        }
        tracing::debug!(count = posts.len(), "feed loaded");
        self.surface.clear();
        self.posts = posts;
        self.cursor.reset();
        self.render_next_batch()
    }

    /// Render the next chunk and, if it was not empty, leave a placeholder
    /// behind for the caller to watch.
    pub fn render_next_batch(&mut self) -> BatchOutcome<S::Placeholder> {
        let range = self.cursor.next_range(self.posts.len());
        if range.is_empty() {
            tracing::debug!(loaded = self.posts.len(), "feed exhausted");
            return BatchOutcome::Exhausted;
        }
        tracing::debug!(start = range.start, end = range.end, "rendering batch");

        for post in &self.posts[range] {
            let rendered = self.renderer.render(post, &mut self.galleries);
            self.surface.append_post(&rendered);
            if let Some(gallery) = &rendered.gallery {
                self.lightbox.attach(&gallery.lightbox_selector());
            }
        }
        BatchOutcome::More(self.surface.append_placeholder(FETCHING_MORE_TEXT))
    }

    /// The placeholder became visible: drop it and render what comes next.
    pub fn continue_after(&mut self, placeholder: S::Placeholder) -> BatchOutcome<S::Placeholder> {
        self.surface.remove_placeholder(placeholder);
        self.render_next_batch()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn posts_loaded(&self) -> usize {
        self.cursor.loaded()
    }

    pub fn feed_loaded(&self) -> bool {
        self.latch.is_loaded()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// Log a configuration problem and say so on the surface.
pub fn report_config_error<S: Surface>(surface: &mut S, error: &ConfigError) {
    tracing::error!(error = %error, "fedi-tag widget misconfigured");
    surface.show_status(MISCONFIGURED_TEXT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Status(String),
        Clear,
        Post(RenderedPost),
        Placeholder(usize),
        RemovePlaceholder(usize),
    }

    #[derive(Default)]
    struct RecordingSurface {
        events: Vec<Event>,
        next_placeholder: usize,
    }

    impl RecordingSurface {
        fn posts(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Post(_)))
                .count()
        }

        fn placeholders(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Placeholder(_)))
                .count()
        }
    }

    impl Surface for RecordingSurface {
        type Placeholder = usize;

        fn show_status(&mut self, message: &str) {
            self.events.push(Event::Status(message.to_string()));
        }

        fn clear(&mut self) {
            self.events.push(Event::Clear);
        }

        fn append_post(&mut self, post: &RenderedPost) {
            self.events.push(Event::Post(post.clone()));
        }

        fn append_placeholder(&mut self, _message: &str) -> usize {
            self.next_placeholder += 1;
            self.events.push(Event::Placeholder(self.next_placeholder));
            self.next_placeholder
        }

        fn remove_placeholder(&mut self, placeholder: usize) {
            self.events.push(Event::RemovePlaceholder(placeholder));
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLightbox(Rc<RefCell<Vec<String>>>);

    impl Lightbox for RecordingLightbox {
        fn attach(&self, selector: &str) {
            self.0.borrow_mut().push(selector.to_string());
        }
    }

    fn widget() -> Widget<RecordingSurface> {
        let config = WidgetConfig::new("mastodon.example", "42", "rust");
        Widget::new(config, RecordingSurface::default(), Utc)
    }

    fn posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| Post {
                content: format!("<p>post {i}</p>"),
                ..Default::default()
            })
            .collect()
    }

    fn posts_json(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| serde_json::json!({ "content": format!("<p>post {i}</p>") }))
                .collect(),
        )
    }

    #[test]
    fn starts_with_loading_message() {
        let w = widget();
        assert_eq!(w.surface().events, vec![Event::Status(LOADING_TEXT.into())]);
        assert!(!w.feed_loaded());
    }

    #[test]
    fn loads_only_once() {
        let mut w = widget();
        let url = w.begin_load().expect("first load issues a request");
        assert_eq!(
            url.as_str(),
            "https://mastodon.example/api/v1/accounts/42/statuses?limit=40&tagged=rust"
        );
        assert!(w.feed_loaded());
        assert!(w.begin_load().is_none());

        w.finish_load(Ok(posts_json(2)));
        assert!(w.begin_load().is_none());
    }

    #[test]
    fn twelve_posts_render_as_five_five_two() {
        let mut w = widget();
        let mut sizes = Vec::new();

        let mut outcome = w.load_posts(posts(12));
        let mut seen = 0;
        while let BatchOutcome::More(placeholder) = outcome {
            sizes.push(w.surface().posts() - seen);
            seen = w.surface().posts();
            outcome = w.continue_after(placeholder);
        }

        assert_eq!(sizes, vec![5, 5, 2]);
        assert_eq!(w.surface().posts(), 12);
        // no fourth placeholder once the slice came back empty
        assert_eq!(w.surface().placeholders(), 3);
        assert_eq!(w.posts_loaded(), 20);
        assert_eq!(w.posts().len(), 12);
    }

    #[test]
    fn placeholder_is_removed_before_next_batch() {
        let mut w = widget();
        let BatchOutcome::More(first) = w.load_posts(posts(6)) else {
            panic!("expected a placeholder");
        };
        let before = w.surface().events.len();
        let _ = w.continue_after(first);
        let events = &w.surface().events[before..];
        assert_eq!(events[0], Event::RemovePlaceholder(first));
        assert!(matches!(events[1], Event::Post(_)));
        assert!(matches!(events.last(), Some(Event::Placeholder(_))));
    }

    #[test]
    fn empty_response_shows_no_posts() {
        let mut w = widget();
        w.begin_load();
        assert_eq!(
            w.finish_load(Ok(Value::Array(Vec::new()))),
            BatchOutcome::Exhausted
        );
        assert_eq!(
            w.surface().events.last(),
            Some(&Event::Status(NO_POSTS_TEXT.into()))
        );
        assert_eq!(w.surface().posts(), 0);
        assert!(w.feed_loaded());
    }

    #[test]
    fn non_array_response_shows_no_posts() {
        let mut w = widget();
        w.begin_load();
        w.finish_load(Ok(serde_json::json!({ "error": "Record not found" })));
        assert_eq!(
            w.surface().events.last(),
            Some(&Event::Status(NO_POSTS_TEXT.into()))
        );
        assert_eq!(w.surface().placeholders(), 0);
    }

    #[test]
    fn loading_text_is_cleared_before_posts() {
        let mut w = widget();
        w.begin_load();
        w.finish_load(Ok(posts_json(2)));
        let events = &w.surface().events;
        assert_eq!(events[0], Event::Status(LOADING_TEXT.into()));
        assert_eq!(events[1], Event::Clear);
        assert!(matches!(events[2], Event::Post(_)));
    }

    #[test]
    fn failed_request_shows_error() {
        let mut w = widget();
        w.begin_load();
        let outcome = w.finish_load(Err(FeedError::Request {
            url: "https://mastodon.example".into(),
            message: "offline".into(),
        }));
        assert_eq!(outcome, BatchOutcome::Exhausted);
        assert_eq!(
            w.surface().events.last(),
            Some(&Event::Status(LOAD_FAILED_TEXT.into()))
        );
        assert!(w.begin_load().is_none());
    }

    #[test]
    fn bad_host_reports_misconfiguration() {
        let config = WidgetConfig::new("bad host", "42", "rust");
        let mut w = Widget::new(config, RecordingSurface::default(), Utc);
        assert!(w.begin_load().is_none());
        assert_eq!(
            w.surface().events.last(),
            Some(&Event::Status(MISCONFIGURED_TEXT.into()))
        );
    }

    #[test]
    fn lightbox_attached_per_gallery() {
        let lightbox = RecordingLightbox::default();
        let mut w = widget().with_lightbox(lightbox.clone());
        let value = serde_json::json!([
            { "content": "<p>a</p>", "media_attachments": [{ "type": "image", "url": "https://m/1.png" }] },
            { "content": "<p>b</p>" },
            { "content": "<p>c</p>", "media_attachments": [{ "type": "audio", "url": "https://m/2.mp3" }] },
        ]);
        w.finish_load(Ok(value));
        assert_eq!(
            *lightbox.0.borrow(),
            vec![
                ".feditag-gallery-n0 a".to_string(),
                ".feditag-gallery-n1 a".to_string()
            ]
        );
    }

    #[test]
    fn widgets_on_one_page_use_distinct_galleries() {
        let value = serde_json::json!([
            { "content": "<p>a</p>", "media_attachments": [{ "type": "image", "url": "https://m/1.png" }] },
        ]);
        let first = RecordingLightbox::default();
        let second = RecordingLightbox::default();
        let mut a = widget().with_lightbox(first.clone()).with_gallery_scope(0);
        let mut b = widget().with_lightbox(second.clone()).with_gallery_scope(1);
        a.finish_load(Ok(value.clone()));
        b.finish_load(Ok(value));
        assert_eq!(*first.0.borrow(), vec![".feditag-gallery-w0-n0 a".to_string()]);
        assert_eq!(*second.0.borrow(), vec![".feditag-gallery-w1-n0 a".to_string()]);
    }

    #[test]
    fn custom_chunk_size() {
        let mut config = WidgetConfig::new("mastodon.example", "42", "rust");
        config.chunk_size = 2;
        let mut w = Widget::new(config, RecordingSurface::default(), Utc);
        let outcome = w.load_posts(posts(3));
        assert!(matches!(outcome, BatchOutcome::More(_)));
        assert_eq!(w.surface().posts(), 2);
    }
}
