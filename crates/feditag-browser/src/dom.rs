//! DOM implementation of the widget surface.

use feditag_core::markup::Node as Markup;
use feditag_core::{ChildKind, ContentBlocks, RenderedPost, Surface, strip_trailing_hashtags};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};

/// Build a live DOM node from rendered markup.
///
/// Text goes through `createTextNode` and attributes through `setAttribute`,
/// so nothing here is parsed as HTML.
pub fn materialize(document: &Document, markup: &Markup) -> Result<Node, JsValue> {
    match markup {
        Markup::Text(text) => Ok(document.create_text_node(text).into()),
        Markup::Element(element) => {
            let node = document.create_element(element.tag)?;
            for (name, value) in &element.attrs {
                node.set_attribute(name, value)?;
            }
            for child in &element.children {
                node.append_child(&materialize(document, child)?)?;
            }
            Ok(node.into())
        }
    }
}

/// A post body parsed by the browser.
pub struct DomContent<'a>(pub &'a Element);

impl ContentBlocks for DomContent<'_> {
    type Block = Element;

    fn last_block(&self) -> Option<Element> {
        let mut node = self.0.last_child();
        while let Some(current) = node {
            if let Some(element) = current.dyn_ref::<Element>() {
                return Some(element.clone());
            }
            let text = current.text_content().unwrap_or_default();
            if !text.trim().is_empty() {
                return None;
            }
            node = current.previous_sibling();
        }
        None
    }

    fn block_children(&self, block: &Element) -> Vec<ChildKind> {
        let nodes = block.child_nodes();
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .map(|node| match node.dyn_ref::<Element>() {
                Some(element) => {
                    ChildKind::element(&element.tag_name(), element.get_attribute("rel").as_deref())
                }
                None => ChildKind::Text(node.text_content().unwrap_or_default()),
            })
            .collect()
    }

    fn remove_block(&mut self, block: Element) {
        block.remove();
    }
}

/// The posts container of one `<fedi-tag>` element.
pub struct DomSurface {
    document: Document,
    posts: Element,
}

impl DomSurface {
    /// Build the container/posts elements and append them to `host`.
    ///
    /// Returns the surface and the outer container, which is what the initial
    /// visibility trigger watches.
    pub fn build(document: &Document, host: &Element) -> Result<(Self, Element), JsValue> {
        let container = document.create_element("div")?;
        container.set_id("feditag-container");
        container.set_class_name("feditag-container");

        let posts = document.create_element("div")?;
        posts.set_id("feditag-posts");
        posts.set_class_name("feditag-posts");

        container.append_child(&posts)?;
        host.append_child(&container)?;

        Ok((
            Self {
                document: document.clone(),
                posts,
            },
            container,
        ))
    }

    pub fn posts_element(&self) -> &Element {
        &self.posts
    }

    fn status_line(&self, message: &str) -> Result<Node, JsValue> {
        let line = feditag_core::Element::new("p").child(feditag_core::Element::new("em").text(message));
        materialize(&self.document, &line.into())
    }

    fn try_append_post(&self, post: &RenderedPost) -> Result<(), JsValue> {
        let contents = self.document.create_element("div")?;
        contents.set_inner_html(&post.body_html);

        // the trailer check looks at the server body, so it runs before
        // anything of ours is added
        if strip_trailing_hashtags(&mut DomContent(&contents)) {
            tracing::trace!("removed trailing hashtag block");
        }

        let header = materialize(&self.document, &post.date_header)?;
        contents.insert_before(&header, contents.first_child().as_ref())?;

        for node in post.trailer() {
            contents.append_child(&materialize(&self.document, &node)?)?;
        }

        let block = self.document.create_element("div")?;
        block.set_class_name("feditag-post");
        block.append_child(&contents)?;
        self.posts.append_child(&block)?;
        Ok(())
    }

    fn try_append_placeholder(&self, message: &str) -> Result<Element, JsValue> {
        let block = self.document.create_element("div")?;
        block.set_class_name("feditag-post feditag-more");
        let line = feditag_core::Element::new("p").text(message);
        block.append_child(&materialize(&self.document, &line.into())?)?;
        self.posts.append_child(&block)?;
        Ok(block)
    }
}

impl Surface for DomSurface {
    type Placeholder = Option<Element>;

    fn show_status(&mut self, message: &str) {
        self.posts.set_text_content(None);
        let appended = self
            .status_line(message)
            .and_then(|line| self.posts.append_child(&line));
        if let Err(e) = appended {
            tracing::warn!(error = ?e, status = message, "failed to show status");
        }
    }

    fn clear(&mut self) {
        self.posts.set_text_content(None);
    }

    fn append_post(&mut self, post: &RenderedPost) {
        if let Err(e) = self.try_append_post(post) {
            tracing::warn!(error = ?e, "failed to render post");
        }
    }

    fn append_placeholder(&mut self, message: &str) -> Option<Element> {
        self.try_append_placeholder(message)
            .map_err(|e| tracing::warn!(error = ?e, "failed to add placeholder"))
            .ok()
    }

    fn remove_placeholder(&mut self, placeholder: Option<Element>) {
        if let Some(placeholder) = placeholder {
            placeholder.remove();
        }
    }
}
