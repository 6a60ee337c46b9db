//! Component tree and HTML generation.
//!
//! Pages are described as a tree of [`Node`]s produced by a [`Component`].
//! The tree is rendered to markup on the server; interactive subtrees are
//! declared as [`Island`]s, which render with hydration marker attributes
//! carrying their serialized props so a client runtime can pick them up.
//!
//! # Examples
//!
//! ```rust
//! use nori::markup::{Component, Element, Island, Node};
//! use serde_json::json;
//!
//! struct HomePage;
//!
//! impl Component for HomePage {
//!     fn title(&self) -> Option<String> {
//!         Some("home".to_string())
//!     }
//!
//!     fn render(&self) -> Node {
//!         Element::new("main")
//!             .child(Element::new("h1").text("Welcome"))
//!             .child(Island::new("counter", json!({ "start": 0 })))
//!             .into()
//!     }
//! }
//! ```

use serde_json::Value;

use crate::error::RenderError;

/// Attribute naming the island component on its wrapper element.
pub const ISLAND_NAME_ATTR: &str = "data-nori-island";
/// Attribute carrying the island's JSON-serialized props.
pub const ISLAND_PROPS_ATTR: &str = "data-nori-props";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A server-rendered page fragment.
///
/// Implementors describe their markup as a [`Node`] tree; the render
/// pipeline turns it into HTML exactly once per request.
pub trait Component: Send + Sync {
    /// Produces the markup tree for this component.
    fn render(&self) -> Node;

    /// Optional document title, placed in `<head>` by the page assembler.
    fn title(&self) -> Option<String> {
        None
    }
}

/// One node of the markup tree.
pub enum Node {
    Element(Element),
    Text(String),
    Raw(String),
    Island(Island),
    Fragment(Vec<Node>),
}

impl Node {
    /// Escaped text content.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Pre-rendered markup inserted verbatim. The caller is responsible for
    /// its safety.
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Island> for Node {
    fn from(island: Island) -> Self {
        Self::Island(island)
    }
}

/// A regular HTML element with attributes and children.
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::text(value))
    }
}

/// A client-hydrated interactive region.
///
/// Rendered as a wrapper element with marker attributes naming the island
/// and carrying its props; children act as server-rendered fallback content.
pub struct Island {
    name: String,
    props: Value,
    children: Vec<Node>,
}

impl Island {
    pub fn new(name: impl Into<String>, props: Value) -> Self {
        Self {
            name: name.into(),
            props,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Rendered body markup plus the metadata the assembler and hooks observe.
pub(crate) struct RenderedPage {
    pub(crate) html: String,
    pub(crate) title: Option<String>,
    pub(crate) requires_hydration: bool,
}

/// Renders a component tree to body markup.
///
/// `requires_hydration` is true iff at least one island was rendered.
pub(crate) fn render_component(component: &dyn Component) -> Result<RenderedPage, RenderError> {
    let mut html = String::new();
    let mut requires_hydration = false;
    write_node(&component.render(), &mut html, &mut requires_hydration)?;

    Ok(RenderedPage {
        html,
        title: component.title(),
        requires_hydration,
    })
}

fn write_node(node: &Node, out: &mut String, hydrate: &mut bool) -> Result<(), RenderError> {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Raw(raw) => out.push_str(raw),
        Node::Fragment(children) => {
            for child in children {
                write_node(child, out, hydrate)?;
            }
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
            }
            out.push('>');

            if VOID_TAGS.contains(&element.tag.as_str()) {
                return Ok(());
            }

            for child in &element.children {
                write_node(child, out, hydrate)?;
            }
            out.push_str(&format!("</{}>", element.tag));
        }
        Node::Island(island) => {
            *hydrate = true;
            let props =
                serde_json::to_string(&island.props).map_err(|e| RenderError::IslandProps {
                    island: island.name.clone(),
                    reason: e.to_string(),
                })?;

            out.push_str(&format!(
                "<div {}=\"{}\" {}=\"{}\">",
                ISLAND_NAME_ATTR,
                escape_attr(&island.name),
                ISLAND_PROPS_ATTR,
                escape_attr(&props),
            ));
            for child in &island.children {
                write_node(child, out, hydrate)?;
            }
            out.push_str("</div>");
        }
    }

    Ok(())
}

/// Escapes text content for placement between tags.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a value for placement inside a double-quoted attribute.
pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Page(Node);

    impl Component for Page {
        fn render(&self) -> Node {
            match &self.0 {
                Node::Raw(raw) => Node::raw(raw.clone()),
                _ => unreachable!("test pages are raw nodes"),
            }
        }
    }

    #[test]
    fn test_escapes_text_and_attrs() {
        let node: Node = Element::new("p")
            .attr("title", "a \"quoted\" <value>")
            .text("fish & <chips>")
            .into();
        let mut out = String::new();
        let mut hydrate = false;
        write_node(&node, &mut out, &mut hydrate).unwrap();

        assert_eq!(
            out,
            "<p title=\"a &quot;quoted&quot; &lt;value&gt;\">fish &amp; &lt;chips&gt;</p>"
        );
        assert!(!hydrate);
    }

    #[test]
    fn test_island_markup_and_hydration_flag() {
        let node: Node = Island::new("counter", json!({ "start": 3 }))
            .child(Node::text("loading"))
            .into();
        let mut out = String::new();
        let mut hydrate = false;
        write_node(&node, &mut out, &mut hydrate).unwrap();

        assert!(hydrate);
        assert!(out.starts_with("<div data-nori-island=\"counter\""));
        assert!(out.contains("data-nori-props=\"{&quot;start&quot;:3}\""));
        assert!(out.ends_with("loading</div>"));
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let node: Node = Element::new("br").into();
        let mut out = String::new();
        let mut hydrate = false;
        write_node(&node, &mut out, &mut hydrate).unwrap();

        assert_eq!(out, "<br>");
    }

    #[test]
    fn test_raw_nodes_pass_through() {
        let page = Page(Node::raw("<b>bold</b>"));
        let rendered = render_component(&page).unwrap();

        assert_eq!(rendered.html, "<b>bold</b>");
        assert!(!rendered.requires_hydration);
        assert!(rendered.title.is_none());
    }

    #[test]
    fn test_fragment_renders_children_in_order() {
        let node = Node::Fragment(vec![Node::text("one"), Node::text("two")]);
        let mut out = String::new();
        let mut hydrate = false;
        write_node(&node, &mut out, &mut hydrate).unwrap();

        assert_eq!(out, "onetwo");
    }
}
