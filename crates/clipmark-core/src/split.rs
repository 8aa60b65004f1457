#![forbid(unsafe_code)]

//! Tree splitter: derive a truncated candidate from the original tree and a
//! path of binary split decisions.
//!
//! The split-path is the sole piece of state carried between fit attempts.
//! It is consumed depth-first in document order: at each branching point one
//! decision is taken, [`SplitDirection::Left`] keeps only the first half of
//! the material, [`SplitDirection::Right`] keeps the first half verbatim and
//! continues splitting inside the second half. The `Right` form is what lets
//! the search widen a candidate instead of only shrinking it.
//!
//! Splitting never mutates the original; every call rebuilds a fresh tree
//! top-down. When a decision remains but the material cannot be subdivided
//! (a policy-atomic text unit or an [`Node::Atomic`] leaf), the splitter
//! reports `end_found` — the exhaustion signal the search controller uses
//! for termination.

use smallvec::{SmallVec, smallvec};
use unicode_segmentation::UnicodeSegmentation;

use crate::tokenize::TokenizePolicy;
use crate::tree::{DisplayMode, Node};

/// One binary decision of the split-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Keep only the first half.
    Left,
    /// Keep the first half verbatim and continue into the second half.
    Right,
}

/// Ordered sequence of split decisions; its length is the search depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitPath(SmallVec<[SplitDirection; 16]>);

impl SplitPath {
    /// The initial path of a search: a single `Left`.
    #[must_use]
    pub fn start() -> Self {
        Self(smallvec![SplitDirection::Left])
    }

    /// Narrow: go one level deeper into the first half.
    pub fn push_left(&mut self) {
        self.0.push(SplitDirection::Left);
    }

    /// Widen from the last successful cut: replace the final decision with
    /// `Right, Left` — re-enter the second half and immediately probe its
    /// first half.
    pub fn grow(&mut self) {
        self.0.pop();
        self.0.push(SplitDirection::Right);
        self.0.push(SplitDirection::Left);
    }

    /// Number of decisions taken so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no decision has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SplitDirection] {
        &self.0
    }
}

/// Result of one splitter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    /// The derived candidate tree (marker not yet appended).
    pub node: Node,
    /// Whether the path ran into material that cannot be subdivided.
    pub end_found: bool,
}

/// Applies a [`SplitPath`] to a tree under a tokenization policy.
#[derive(Debug, Clone, Copy)]
pub struct TreeSplitter {
    policy: TokenizePolicy,
}

impl TreeSplitter {
    #[must_use]
    pub fn new(policy: TokenizePolicy) -> Self {
        Self { policy }
    }

    /// Derive a candidate from `root` by consuming `path` depth-first.
    #[must_use]
    pub fn split(&self, root: &Node, path: &SplitPath) -> SplitOutcome {
        let mut end_found = false;
        let node = self.split_node(root, path.as_slice(), 0, &mut end_found);
        SplitOutcome { node, end_found }
    }

    fn split_node(
        &self,
        node: &Node,
        path: &[SplitDirection],
        depth: usize,
        end_found: &mut bool,
    ) -> Node {
        match node {
            Node::Text(content) => Node::Text(self.split_text(content, path, end_found)),
            Node::Atomic(_) => {
                // Never descend. Reaching an atomic leaf with decisions left
                // is an exhaustion signal, not a shrink.
                if !path.is_empty() {
                    *end_found = true;
                }
                node.clone()
            }
            Node::Container {
                tag,
                attrs,
                display,
                children,
            } => Node::Container {
                tag: tag.clone(),
                attrs: attrs.clone(),
                display: forced_display(depth, *display),
                children: self.split_children(children, path, depth + 1, end_found),
            },
        }
    }

    fn split_text(&self, content: &str, path: &[SplitDirection], end_found: &mut bool) -> String {
        if path.is_empty() {
            return content.to_string();
        }
        if self.policy.is_atomic(content) {
            *end_found = true;
            return content.to_string();
        }
        if let Some(tokens) = self.policy.tokenize(content) {
            if tokens.len() < 2 {
                *end_found = true;
                return content.to_string();
            }
            // Tokens already carry their inter-token whitespace, so the
            // rejoin inserts no separators.
            return self.split_tokens(&tokens, path, end_found).concat();
        }
        let units: Vec<&str> = content.graphemes(true).collect();
        let pivot = units.len().div_ceil(2);
        let left: String = units[..pivot].concat();
        match path[0] {
            SplitDirection::Left => self.split_text(&left, &path[1..], end_found),
            SplitDirection::Right => {
                let right: String = units[pivot..].concat();
                left + &self.split_text(&right, &path[1..], end_found)
            }
        }
    }

    fn split_tokens(
        &self,
        tokens: &[String],
        path: &[SplitDirection],
        end_found: &mut bool,
    ) -> Vec<String> {
        if path.is_empty() {
            return tokens.to_vec();
        }
        if tokens.len() == 1 {
            // Singleton: descend into the token without consuming a decision.
            return vec![self.split_text(&tokens[0], path, end_found)];
        }
        let pivot = tokens.len().div_ceil(2);
        match path[0] {
            SplitDirection::Left => self.split_tokens(&tokens[..pivot], &path[1..], end_found),
            SplitDirection::Right => {
                let mut kept = tokens[..pivot].to_vec();
                kept.extend(self.split_tokens(&tokens[pivot..], &path[1..], end_found));
                kept
            }
        }
    }

    fn split_children(
        &self,
        children: &[Node],
        path: &[SplitDirection],
        depth: usize,
        end_found: &mut bool,
    ) -> Vec<Node> {
        if path.is_empty() || children.is_empty() {
            return children.to_vec();
        }
        if children.len() == 1 {
            // Singleton: descend into the element without consuming a decision.
            return vec![self.split_node(&children[0], path, depth, end_found)];
        }
        let pivot = children.len().div_ceil(2);
        match path[0] {
            SplitDirection::Left => self.split_children(&children[..pivot], &path[1..], depth, end_found),
            SplitDirection::Right => {
                let mut kept = children[..pivot].to_vec();
                kept.extend(self.split_children(&children[pivot..], &path[1..], depth, end_found));
                kept
            }
        }
    }
}

/// Display forcing per candidate depth: the outermost container is measured
/// as a block, its container children as inline-blocks so a trailing marker
/// shares their last line, anything deeper keeps its authored mode.
fn forced_display(depth: usize, authored: Option<DisplayMode>) -> Option<DisplayMode> {
    match depth {
        0 => Some(DisplayMode::Block),
        1 => Some(DisplayMode::InlineBlock),
        _ => authored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(dirs: &[SplitDirection]) -> SplitPath {
        SplitPath(dirs.iter().copied().collect())
    }

    use SplitDirection::{Left, Right};

    #[test]
    fn empty_path_returns_tree_unchanged() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let doc = Node::text("abcdef");
        let out = splitter.split(&doc, &SplitPath::default());
        assert_eq!(out.node, doc);
        assert!(!out.end_found);
    }

    #[test]
    fn left_keeps_ceiling_half() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let out = splitter.split(&Node::text("abcde"), &path(&[Left]));
        assert_eq!(out.node, Node::text("abc"));
        assert!(!out.end_found);
    }

    #[test]
    fn right_keeps_left_half_and_continues() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        // "abcde" -> keep "abc", split "de" with [Left] -> "d"
        let out = splitter.split(&Node::text("abcde"), &path(&[Right, Left]));
        assert_eq!(out.node, Node::text("abcd"));
    }

    #[test]
    fn single_grapheme_signals_end() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let out = splitter.split(&Node::text("a"), &path(&[Left]));
        assert_eq!(out.node, Node::text("a"));
        assert!(out.end_found);
    }

    #[test]
    fn atomic_leaf_signals_end_when_path_remains() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let doc = Node::atomic(Node::text("whole"));
        let out = splitter.split(&doc, &path(&[Left]));
        assert_eq!(out.node, doc);
        assert!(out.end_found);
    }

    #[test]
    fn atomic_is_kept_or_dropped_whole() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let doc = Node::container(
            "p",
            [
                Node::text("aa"),
                Node::atomic(Node::text("ATOM")),
                Node::text("bb"),
                Node::text("cc"),
            ],
        );
        // Left on 4 children keeps the first 2: text + whole atomic.
        let out = splitter.split(&doc, &path(&[Left]));
        let Node::Container { children, .. } = &out.node else {
            unreachable!()
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], Node::atomic(Node::text("ATOM")));
    }

    #[test]
    fn words_split_rejoins_verbatim() {
        let splitter = TreeSplitter::new(TokenizePolicy::Words);
        // tokens: ["one", " two", " three", " four"] -> Left keeps 2
        let out = splitter.split(&Node::text("one two three four"), &path(&[Left]));
        assert_eq!(out.node, Node::text("one two"));
    }

    #[test]
    fn words_right_then_left() {
        let splitter = TreeSplitter::new(TokenizePolicy::Words);
        // keep ["one", " two"], split [" three", " four"] with [Left]
        let out = splitter.split(&Node::text("one two three four"), &path(&[Right, Left]));
        assert_eq!(out.node, Node::text("one two three"));
    }

    #[test]
    fn words_single_word_is_end() {
        let splitter = TreeSplitter::new(TokenizePolicy::Words);
        let out = splitter.split(&Node::text("unsplittable"), &path(&[Left]));
        assert_eq!(out.node, Node::text("unsplittable"));
        assert!(out.end_found);
    }

    #[test]
    fn singleton_child_descends_without_consuming() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let doc = Node::container("p", [Node::text("abcd")]);
        let out = splitter.split(&doc, &path(&[Left]));
        // The decision reaches the text, not the singleton child list.
        assert_eq!(out.node.to_plain_text(), "ab");
    }

    #[test]
    fn display_forced_by_depth() {
        let splitter = TreeSplitter::new(TokenizePolicy::Characters);
        let doc = Node::container(
            "div",
            [Node::container(
                "p",
                [Node::container("em", [Node::text("x")]).with_display(DisplayMode::Inline)],
            )],
        );
        let out = splitter.split(&doc, &SplitPath::default());
        let Node::Container {
            display, children, ..
        } = &out.node
        else {
            unreachable!()
        };
        assert_eq!(*display, Some(DisplayMode::Block));
        let Node::Container {
            display, children, ..
        } = &children[0]
        else {
            unreachable!()
        };
        assert_eq!(*display, Some(DisplayMode::InlineBlock));
        let Node::Container { display, .. } = &children[0] else {
            unreachable!()
        };
        // Depth 2 keeps the authored mode.
        assert_eq!(*display, Some(DisplayMode::Inline));
    }

    #[test]
    fn grow_replaces_last_decision() {
        let mut p = SplitPath::start();
        p.push_left();
        p.grow();
        assert_eq!(p.as_slice(), &[Left, Right, Left]);
    }

    #[test]
    fn path_grows_by_net_one_per_mutation() {
        let mut p = SplitPath::start();
        assert_eq!(p.len(), 1);
        p.grow();
        assert_eq!(p.len(), 2);
        p.push_left();
        assert_eq!(p.len(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_path() -> impl Strategy<Value = SplitPath> {
        proptest::collection::vec(
            prop_oneof![Just(SplitDirection::Left), Just(SplitDirection::Right)],
            0..12,
        )
        .prop_map(|dirs| SplitPath(dirs.into_iter().collect()))
    }

    proptest! {
        // Document-order preservation: a candidate's flattened content is a
        // prefix of the original's under the characters policy.
        #[test]
        fn candidate_is_a_prefix(s in "[a-z]{1,40}", path in arbitrary_path()) {
            let splitter = TreeSplitter::new(TokenizePolicy::Characters);
            let out = splitter.split(&Node::text(s.clone()), &path);
            let got = out.node.to_plain_text();
            prop_assert!(s.starts_with(&got), "{got:?} not a prefix of {s:?}");
            prop_assert!(!got.is_empty());
        }

        // Atomic inviolability: the atomic's content is all-or-nothing in
        // any candidate.
        #[test]
        fn atomic_all_or_nothing(path in arbitrary_path()) {
            let doc = Node::container(
                "p",
                [
                    Node::text("aaaa"),
                    Node::atomic(Node::text("ATOM")),
                    Node::text("bbbb"),
                ],
            );
            let splitter = TreeSplitter::new(TokenizePolicy::Characters);
            let out = splitter.split(&doc, &path);
            let text = out.node.to_plain_text();
            let occurrences = text.matches("ATOM").count();
            prop_assert!(occurrences <= 1);
            prop_assert!(!text.contains("ATO") || text.contains("ATOM"));
        }

        // Word splits never invent or reorder characters.
        #[test]
        fn words_candidate_is_a_prefix(s in "[a-z ]{1,40}", path in arbitrary_path()) {
            prop_assume!(s.chars().any(|c| c != ' '));
            let splitter = TreeSplitter::new(TokenizePolicy::Words);
            let out = splitter.split(&Node::text(s.clone()), &path);
            let got = out.node.to_plain_text();
            prop_assert!(s.starts_with(&got), "{got:?} not a prefix of {s:?}");
        }
    }
}
