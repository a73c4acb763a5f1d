//! Removal of the trailing hashtag paragraph.
//!
//! Posts fetched with `tagged=` usually end in a paragraph holding nothing but
//! hashtag links, which repeats the tag the widget is already filtered on.

/// What a direct child of a content block is, as far as the stripper cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    /// `<a>` whose `rel` marks it as a tag reference.
    TagLink,
    /// Any other element.
    Element,
    /// Text (or comment) node with its content.
    Text(String),
}

impl ChildKind {
    /// Classify an element child from its tag name and `rel` attribute.
    pub fn element(tag_name: &str, rel: Option<&str>) -> Self {
        if tag_name.eq_ignore_ascii_case("a") && rel.is_some_and(is_tag_rel) {
            ChildKind::TagLink
        } else {
            ChildKind::Element
        }
    }

    fn is_hashtag_filler(&self) -> bool {
        match self {
            ChildKind::TagLink => true,
            ChildKind::Element => false,
            ChildKind::Text(text) => text.trim().is_empty(),
        }
    }
}

/// `rel` is a space separated token list; any `tag` token counts.
pub fn is_tag_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("tag"))
}

/// A parsed post body: a sequence of block elements (usually `<p>`).
pub trait ContentBlocks {
    type Block;

    /// The last element child of the body, looking past trailing whitespace
    /// text. `None` if the body is empty or ends in real text.
    fn last_block(&self) -> Option<Self::Block>;

    fn block_children(&self, block: &Self::Block) -> Vec<ChildKind>;

    fn remove_block(&mut self, block: Self::Block);
}

pub fn is_hashtags_only<I>(children: I) -> bool
where
    I: IntoIterator<Item = ChildKind>,
{
    children.into_iter().all(|child| child.is_hashtag_filler())
}

/// Remove the last block of `content` if it holds only tag links and
/// whitespace. Returns whether something was removed.
///
/// Must run on the server-provided body before anything is appended after it.
pub fn strip_trailing_hashtags<C: ContentBlocks>(content: &mut C) -> bool {
    let Some(block) = content.last_block() else {
        return false;
    };
    if !is_hashtags_only(content.block_children(&block)) {
        return false;
    }
    content.remove_block(block);
    true
}
