#![forbid(unsafe_code)]

//! Structural validation of a document revision.
//!
//! The splitter can only cut into primitive markup, text and atomic
//! leaves. An externally-defined composite anywhere in the tree makes the
//! whole revision untruncatable: partial truncation of opaque content would
//! be unsound, so the caller falls back to rendering the original.
//!
//! Atomic wrappers are exempt and not descended into — their content is
//! never split, so a composite inside one is harmless.

use crate::tree::{Node, Tag};

/// Rejection reason for a document revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// A composite component the splitter cannot safely cut into.
    DisallowedComponent {
        /// Name of the offending component.
        name: String,
    },
}

impl std::fmt::Display for ValidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DisallowedComponent { name } => write!(
                f,
                "composite component `{name}` cannot be truncated; replace it with \
                 primitive markup or wrap it in an atomic node"
            ),
        }
    }
}

impl std::error::Error for ValidateError {}

/// Confirm every node is a primitive element, a text leaf or an atomic
/// leaf. Runs before any measurement and again on every new original.
pub fn validate_tree(root: &Node) -> Result<(), ValidateError> {
    match root {
        Node::Text(_) | Node::Atomic(_) => Ok(()),
        Node::Container { tag, children, .. } => match tag {
            Tag::Component(name) => Err(ValidateError::DisallowedComponent { name: name.clone() }),
            Tag::Element(_) => children.iter().try_for_each(validate_tree),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tree_passes() {
        let doc = Node::container(
            "p",
            [
                Node::text("a"),
                Node::container("em", [Node::text("b")]),
                Node::atomic(Node::text("c")),
            ],
        );
        assert_eq!(validate_tree(&doc), Ok(()));
    }

    #[test]
    fn composite_is_named_in_the_error() {
        let doc = Node::container("p", [Node::component("UserBadge", [Node::text("x")])]);
        let err = validate_tree(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidateError::DisallowedComponent {
                name: "UserBadge".into()
            }
        );
        assert!(err.to_string().contains("UserBadge"));
    }

    #[test]
    fn composite_inside_atomic_is_allowed() {
        let doc = Node::container(
            "p",
            [Node::atomic(Node::component("Avatar", [Node::text("x")]))],
        );
        assert_eq!(validate_tree(&doc), Ok(()));
    }

    #[test]
    fn deeply_nested_composite_is_found() {
        let doc = Node::container(
            "div",
            [Node::container(
                "p",
                [Node::container("em", [Node::component("Chart", [])])],
            )],
        );
        assert!(validate_tree(&doc).is_err());
    }
}
