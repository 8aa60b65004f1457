#![forbid(unsafe_code)]

//! Document tree model for truncation.
//!
//! A document is a single root [`Node`]: text leaves, atomic leaves and
//! containers with ordered children. Trees are immutable per revision;
//! truncation never edits a tree in place, it derives a fresh one from the
//! original on every candidate.
//!
//! Atomicity is a capability carried by construction: wrapping a subtree in
//! [`Node::atomic`] marks it indivisible, and the marker survives any amount
//! of re-wrapping because it is the enum variant itself rather than a name
//! or type-id comparison.
//!
//! # Example
//! ```
//! use clipmark_core::tree::Node;
//!
//! let doc = Node::container(
//!     "p",
//!     [
//!         Node::text("The quick brown fox "),
//!         Node::atomic(Node::text("[do not cut this]")),
//!         Node::text(" jumps over the lazy dog."),
//!     ],
//! );
//! assert_eq!(doc.child_count(), 3);
//! assert!(doc.to_plain_text().starts_with("The quick"));
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::tokenize::TokenizePolicy;

/// Forced layout mode attached to containers by the splitter.
///
/// The outermost container of a candidate is forced to `Block` so the
/// renderer reports a reliable line count, and its immediate container
/// children are forced to `InlineBlock` so a trailing marker can share
/// their last visual line. Deeper containers keep their authored mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Occupies its own horizontal band of lines.
    Block,
    /// Flows with surrounding inline content.
    Inline,
    /// Flows inline but lays out its content as a unit.
    InlineBlock,
}

/// Identity of a container: a primitive markup element the splitter may cut
/// into, or an externally-defined composite it must not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// A primitive markup element such as `p`, `span` or `strong`.
    Element(String),
    /// An opaque, externally rendered component. The validation pass rejects
    /// these anywhere outside an atomic wrapper.
    Component(String),
}

impl Tag {
    /// The tag or component name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Element(name) | Self::Component(name) => name,
        }
    }
}

/// A node of the document tree.
///
/// No node holds a parent reference; candidates are rebuilt top-down from
/// the retained original, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A run of text, opaque under the active tokenization policy.
    Text(String),
    /// An indivisible subtree: kept whole or dropped whole, never entered
    /// by the splitter.
    Atomic(Box<Node>),
    /// An element with ordered children. A container with no children is
    /// semantically empty and produces no measurable fragment.
    Container {
        tag: Tag,
        attrs: Vec<(String, String)>,
        display: Option<DisplayMode>,
        children: Vec<Node>,
    },
}

impl Node {
    /// A text leaf.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// A primitive element with the given children.
    #[must_use]
    pub fn container(tag: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::Container {
            tag: Tag::Element(tag.into()),
            attrs: Vec::new(),
            display: None,
            children: children.into_iter().collect(),
        }
    }

    /// An externally-defined composite component. Disallowed by the
    /// validation pass unless wrapped in [`Node::atomic`].
    #[must_use]
    pub fn component(name: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::Container {
            tag: Tag::Component(name.into()),
            attrs: Vec::new(),
            display: None,
            children: children.into_iter().collect(),
        }
    }

    /// Mark a subtree indivisible.
    #[must_use]
    pub fn atomic(inner: Node) -> Self {
        Self::Atomic(Box::new(inner))
    }

    /// Attach an attribute (builder style).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Container { attrs, .. } = &mut self {
            attrs.push((key.into(), value.into()));
        }
        self
    }

    /// Set an authored display mode (builder style).
    #[must_use]
    pub fn with_display(mut self, mode: DisplayMode) -> Self {
        if let Self::Container { display, .. } = &mut self {
            *display = Some(mode);
        }
        self
    }

    /// Whether this node is an atomic wrapper.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic(_))
    }

    /// Number of direct children (0 for leaves).
    #[must_use]
    pub fn child_count(&self) -> usize {
        match self {
            Self::Container { children, .. } => children.len(),
            _ => 0,
        }
    }

    /// Whether the node contributes no measurable content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(content) => content.is_empty(),
            Self::Atomic(inner) => inner.is_empty(),
            Self::Container { children, .. } => children.iter().all(Node::is_empty),
        }
    }

    /// Flatten the tree to its text content in document order.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(content) => out.push_str(content),
            Self::Atomic(inner) => inner.collect_text(out),
            Self::Container { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Count the atomic units of the tree under the given policy. An atomic
    /// wrapper counts as a single unit regardless of its content.
    #[must_use]
    pub fn unit_count(&self, policy: TokenizePolicy) -> usize {
        match self {
            Self::Text(content) => policy.unit_count(content),
            Self::Atomic(_) => 1,
            Self::Container { children, .. } => {
                children.iter().map(|c| c.unit_count(policy)).sum()
            }
        }
    }

    /// Grapheme-cluster count of the flattened content. Used for ordering
    /// checks in tests and smallest-candidate comparisons.
    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.to_plain_text().graphemes(true).count()
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_preserves_document_order() {
        let doc = Node::container(
            "p",
            [
                Node::text("one "),
                Node::container("em", [Node::text("two ")]),
                Node::atomic(Node::text("three")),
            ],
        );
        assert_eq!(doc.to_plain_text(), "one two three");
    }

    #[test]
    fn empty_container_is_empty() {
        let doc = Node::container("p", []);
        assert!(doc.is_empty());
        assert_eq!(doc.to_plain_text(), "");
    }

    #[test]
    fn nested_empty_text_is_empty() {
        let doc = Node::container("p", [Node::text(""), Node::container("em", [])]);
        assert!(doc.is_empty());
    }

    #[test]
    fn atomic_counts_as_one_unit() {
        let doc = Node::container(
            "p",
            [Node::text("abc"), Node::atomic(Node::text("defgh"))],
        );
        assert_eq!(doc.unit_count(TokenizePolicy::Characters), 4);
    }

    #[test]
    fn unit_count_words() {
        let doc = Node::text("the quick brown fox");
        assert_eq!(doc.unit_count(TokenizePolicy::Words), 4);
    }

    #[test]
    fn atomic_marker_survives_wrapping() {
        let inner = Node::atomic(Node::text("x"));
        let wrapped = Node::container("span", [Node::container("em", [inner])]);
        let Node::Container { children, .. } = &wrapped else {
            unreachable!()
        };
        let Node::Container { children: inner, .. } = &children[0] else {
            unreachable!()
        };
        assert!(inner[0].is_atomic());
    }

    #[test]
    fn with_attr_and_display() {
        let node = Node::container("p", [])
            .with_attr("class", "lead")
            .with_display(DisplayMode::Inline);
        let Node::Container { attrs, display, .. } = &node else {
            unreachable!()
        };
        assert_eq!(attrs[0].0, "class");
        assert_eq!(*display, Some(DisplayMode::Inline));
    }
}
