//! Structured markup for rendered posts.
//!
//! Rendered output is a small tree of elements and text rather than
//! concatenated HTML. Text nodes and attribute values are plain strings here;
//! they get escaped when the tree is serialized and the browser surface turns
//! them into text nodes and attributes, so untrusted fields never reach an
//! HTML parser.

use std::borrow::Cow;
use std::fmt;

use crate::escape::escape_html;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, Cow<'static, str>)>,
    pub children: Vec<Node>,
}

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["img", "source", "br", "hr", "input"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Attribute whose presence is its value (`controls`, `loop`, ...).
    pub fn flag(self, name: &'static str) -> Self {
        self.attr(name, "")
    }

    /// Set the attribute only when there is a value for it.
    pub fn attr_opt<V>(self, name: &'static str, value: Option<V>) -> Self
    where
        V: Into<Cow<'static, str>>,
    {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn class(self, class: &'static str) -> Self {
        self.attr("class", class)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Node {
    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element
                .children
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }

    /// Depth-first search for the first element with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        match self {
            Node::Text(_) => None,
            Node::Element(element) if element.tag == tag => Some(element),
            Node::Element(element) => element.children.iter().find_map(|child| child.find(tag)),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(&escape_html(text.as_str())),
            Node::Element(element) => fmt::Display::fmt(element, f),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            write!(f, " {}=\"{}\"", name, escape_html(&**value))?;
        }
        f.write_str(">")?;
        if self.is_void() {
            return Ok(());
        }
        for child in &self.children {
            fmt::Display::fmt(child, f)?;
        }
        write!(f, "</{}>", self.tag)
    }
}
