//! Content tree: the input consumed by the plan builder.
//!
//! A [`Node`] is a primitive leaf, an ordered collection, a transparent
//! grouping, or an opaque renderable element. Elements carry a
//! [`ComponentRef`] identity; an element whose identity resolves to the
//! canonical typewriter implementation is treated as a nested stream and
//! gates its parent until it completes.

mod component;

pub use component::{
    CapabilityMarker, ComponentId, ComponentRef, STREAM_CAPABILITY, STREAM_COMPONENT_NAME,
};

use crate::options::StreamOptions;

/// A node in the content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Absent content. Produces nothing.
    Null,
    /// Boolean leaf. Produces nothing, like absent content.
    Bool(bool),
    /// Text leaf, revealed token by token.
    Text(String),
    /// Numeric leaf, revealed as its display representation.
    Number(f64),
    /// Ordered collection; children are flattened in order.
    List(Vec<Node>),
    /// Grouping with no observable wrapper; children are flattened in order.
    Fragment(Vec<Node>),
    /// Opaque renderable element.
    Element(Element),
}

impl Node {
    /// Text leaf from anything string-like.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Ordered collection of children.
    #[must_use]
    pub fn list(children: Vec<Node>) -> Self {
        Self::List(children)
    }

    /// Transparent grouping of children.
    #[must_use]
    pub fn fragment(children: Vec<Node>) -> Self {
        Self::Fragment(children)
    }

    /// Opaque element with the given identity and children.
    pub fn element(component: ComponentRef, children: Vec<Node>) -> Self {
        Self::Element(Element::new(component, children))
    }

    /// A nested typewriter element with default settings.
    #[must_use]
    pub fn stream(children: Vec<Node>) -> Self {
        Self::Element(Element::stream(children))
    }

    /// A nested typewriter element with explicit settings.
    #[must_use]
    pub fn stream_with(children: Vec<Node>, options: StreamOptions) -> Self {
        Self::Element(Element::stream(children).with_options(options))
    }

    /// The element payload, when this node is one.
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Self::Text(content.to_string())
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// An opaque renderable element.
///
/// The engine never looks inside an element's subtree unless the element
/// is recognized as a nested stream, in which case `children` is the
/// content tree the child instance reveals and `stream` holds its
/// per-instance settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Implementation identity, used for capability detection.
    pub component: ComponentRef,
    /// Subtree. Opaque for instant elements.
    pub children: Vec<Node>,
    /// Stream settings, honored when the element is a nested stream.
    pub stream: Option<StreamOptions>,
}

impl Element {
    /// Create an element with the given identity and children.
    pub fn new(component: ComponentRef, children: Vec<Node>) -> Self {
        Self {
            component,
            children,
            stream: None,
        }
    }

    /// Create an element referencing the canonical typewriter implementation.
    #[must_use]
    pub fn stream(children: Vec<Node>) -> Self {
        Self::new(ComponentRef::direct(ComponentId::stream()), children)
    }

    /// Attach per-instance stream settings.
    #[must_use]
    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.stream = Some(options);
        self
    }

    /// Whether this element is a nested typewriter instance.
    pub fn is_stream(&self) -> bool {
        self.component.is_stream()
    }
}
