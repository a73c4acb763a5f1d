//! Turning one [`Post`] into displayable pieces.
//!
//! The body stays trusted server HTML (with emoji images spliced in) because
//! the surface has to parse it anyway before the hashtag trailer can be
//! stripped. Everything the widget adds around it (date header, poll, media)
//! is built as [`markup`](crate::markup) nodes.

use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::emoji::substitute_emojis;
use crate::markup::{Element, Node};
use crate::types::{MediaAttachment, MediaKind, Poll, Post};

const DATE_FORMAT: &str = "%A, %B %-d, %Y at %I:%M %p";
const VIDEO_FALLBACK: &str = "Your browser does not support the video element.";
const AUDIO_FALLBACK: &str = "Your browser does not support the audio element.";
const NEW_CONTEXT_REL: &str = "noopener noreferrer";

/// One post ready to be put on a surface, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    /// Goes first, above the body.
    pub date_header: Node,
    /// Trusted post HTML with emojis substituted. Strip the hashtag trailer
    /// after parsing it.
    pub body_html: String,
    /// Poll options followed by the vote summary. Empty without a poll.
    pub poll: Vec<Node>,
    pub gallery: Option<Gallery>,
}

impl RenderedPost {
    /// Nodes appended after the body, in order.
    pub fn trailer(&self) -> Vec<Node> {
        let mut nodes = self.poll.clone();
        if let Some(gallery) = &self.gallery {
            nodes.push(gallery.to_node());
        }
        nodes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    /// Unique within the page, also used as a class.
    pub id: String,
    pub items: Vec<Node>,
}

impl Gallery {
    /// Selector a lightbox uses to pick up this gallery's links.
    pub fn lightbox_selector(&self) -> String {
        format!(".{} a", self.id)
    }

    pub fn to_node(&self) -> Node {
        let mut gallery = Element::new("div")
            .attr("class", format!("feditag-gallery {}", self.id))
            .attr("id", self.id.clone());
        gallery.children = self.items.clone();
        gallery.into()
    }
}

/// Hands out gallery ids, strictly increasing per widget.
///
/// Widgets sharing a page each need their own scope, otherwise their first
/// galleries all end up as `feditag-gallery-n0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryCounter {
    scope: Option<u32>,
    next: u64,
}

impl GalleryCounter {
    /// Ids of the form `feditag-gallery-w{scope}-n{index}`.
    pub fn scoped(scope: u32) -> Self {
        Self {
            scope: Some(scope),
            next: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        let index = self.next;
        self.next += 1;
        match self.scope {
            Some(scope) => format!("feditag-gallery-w{scope}-n{index}"),
            None => format!("feditag-gallery-n{index}"),
        }
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// Renders posts for display in one time zone.
#[derive(Debug, Clone)]
pub struct PostRenderer<Tz: TimeZone> {
    tz: Tz,
    link_icon: String,
}

impl<Tz> PostRenderer<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    pub fn new(tz: Tz, link_icon: impl Into<String>) -> Self {
        Self {
            tz,
            link_icon: link_icon.into(),
        }
    }

    pub fn render(&self, post: &Post, galleries: &mut GalleryCounter) -> RenderedPost {
        RenderedPost {
            date_header: self.date_header(post),
            body_html: substitute_emojis(&post.content, &post.emojis),
            poll: post
                .poll
                .as_ref()
                .map(|poll| render_poll(poll, &post.url))
                .unwrap_or_default(),
            gallery: render_gallery(&post.media_attachments, galleries),
        }
    }

    fn date_header(&self, post: &Post) -> Node {
        let icon = Element::new("img")
            .attr("src", self.link_icon.clone())
            .attr("alt", "Open post")
            .class("feditag-post-link");
        let link = Element::new("a")
            .attr("href", post.url.clone())
            .attr("target", "_blank")
            .attr("rel", NEW_CONTEXT_REL)
            .class("feditag-post-link")
            .child(icon);
        Element::new("p")
            .child(
                Element::new("span")
                    .class("feditag-date")
                    .child(link)
                    .text(" ")
                    .child(Element::new("em").text(format_post_date(&post.created_at, &self.tz))),
            )
            .into()
    }
}

/// Long US-style date in `tz`, e.g. `Monday, January 15, 2024 at 03:04 PM`.
///
/// Timestamps that are not RFC 3339 are returned as they are.
pub fn format_post_date<Tz>(created_at: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(date) => date.with_timezone(tz).format(DATE_FORMAT).to_string(),
        Err(e) => {
            tracing::debug!(created_at, error = %e, "unparseable post timestamp");
            created_at.to_string()
        }
    }
}

/// Share of `total` in whole percent, rounding half up. Zero when nobody voted.
pub fn poll_percent(votes: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let share = votes as f64 / total as f64;
    (share * 100.0 + 0.5).floor() as u64
}

fn render_poll(poll: &Poll, post_url: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = poll
        .options
        .iter()
        .map(|option| {
            let percent = format!("{}%", poll_percent(option.votes_count, poll.votes_count));
            Element::new("div")
                .class("feditag-poll")
                .child(
                    Element::new("p")
                        .child(
                            Element::new("span")
                                .class("feditag-poll-percent")
                                .text(percent.clone()),
                        )
                        .text(" ")
                        .child(
                            Element::new("span")
                                .class("feditag-poll-text")
                                .text(option.title.clone()),
                        ),
                )
                .child(
                    Element::new("div")
                        .class("feditag-poll-bar")
                        .attr("style", format!("width: {percent}")),
                )
                .into()
        })
        .collect();

    let summary = Element::new("em").text(format!("{} votes | ", poll.votes_count));
    let summary = if poll.expired {
        summary.text("Poll closed")
    } else {
        summary.child(
            Element::new("a")
                .attr("href", post_url.to_string())
                .attr("target", "_blank")
                .attr("rel", NEW_CONTEXT_REL)
                .text("Vote on Mastodon"),
        )
    };
    nodes.push(Element::new("p").child(summary).into());
    nodes
}

fn render_gallery(attachments: &[MediaAttachment], galleries: &mut GalleryCounter) -> Option<Gallery> {
    if attachments.is_empty() {
        return None;
    }
    let id = galleries.next_id();

    // visual media first, then players and links for everything else
    let visual = attachments
        .iter()
        .filter(|media| media.kind.is_visual())
        .filter_map(gallery_item);
    let other = attachments
        .iter()
        .filter(|media| !media.kind.is_visual())
        .filter_map(attachment_link);

    Some(Gallery {
        id,
        items: visual.chain(other).collect(),
    })
}

fn gallery_item(media: &MediaAttachment) -> Option<Node> {
    if media.url.trim().is_empty() {
        return None;
    }
    let (width, height) = media.small_size();
    let width = width.map(|w| w.to_string());
    let height = height.map(|h| h.to_string());
    let alt = media.description.clone().unwrap_or_default();

    let item = match media.kind {
        MediaKind::Image => {
            let preview = if media.preview_url.trim().is_empty() {
                media.url.clone()
            } else {
                media.preview_url.clone()
            };
            let image = Element::new("img")
                .attr("src", preview)
                .attr("alt", alt.clone())
                .attr_opt("width", width)
                .attr_opt("height", height);
            Element::new("div").class("feditag-gallery-item").child(
                Element::new("a")
                    .attr("href", media.url.clone())
                    .attr("title", alt)
                    .child(image),
            )
        }
        MediaKind::Gifv | MediaKind::Video => {
            let mut video = Element::new("video")
                .attr_opt("width", width)
                .attr_opt("height", height)
                .flag("controls");
            if media.kind == MediaKind::Gifv {
                video = video.flag("loop").flag("autoplay").flag("muted").flag("playsinline");
            }
            let video = video
                .attr("aria-label", alt.clone())
                .attr("title", alt)
                .child(Element::new("source").attr("src", media.url.clone()))
                .text(VIDEO_FALLBACK);
            Element::new("div").class("feditag-gallery-video").child(video)
        }
        MediaKind::Audio | MediaKind::Unknown => return None,
    };
    Some(item.into())
}

fn attachment_link(media: &MediaAttachment) -> Option<Node> {
    if media.url.trim().is_empty() {
        return None;
    }
    let item = match media.kind {
        MediaKind::Audio => Element::new("p").child(
            Element::new("audio")
                .flag("controls")
                .child(Element::new("source").attr("src", media.url.clone()))
                .text(AUDIO_FALLBACK),
        ),
        _ => Element::new("p").text("Click to open media attachment: ").child(
            Element::new("a")
                .attr("href", media.url.clone())
                .text(media.url.clone()),
        ),
    };
    Some(item.into())
}
