#![forbid(unsafe_code)]

//! Line-budget truncation for markup trees.
//!
//! Given a tree of text and nested elements and an external layout engine
//! that can measure how many lines a candidate occupies, this crate finds
//! the maximal document-order prefix that still fits a line budget and
//! appends a caller-supplied marker at the cut point. The fit search is a
//! binary search over split positions, not a linear scan: each iteration
//! derives one candidate tree from the retained original and consults the
//! engine once.
//!
//! The crate never computes line breaks itself. Rendering and measurement
//! live behind the [`oracle::LayoutEngine`] trait; the core only compares
//! reported line counts to the budget.
//!
//! - [`tree`] - the document model (text, atomic and container nodes)
//! - [`tokenize`] - what the smallest indivisible unit of text is
//! - [`split`] - candidate derivation along a path of binary decisions
//! - [`oracle`] - the measurement contract the renderer satisfies
//! - [`search`] - the re-entrant grow/shrink state machine
//! - [`validate`] - structural admission check per document revision
//! - [`lifecycle`] - reset-and-restart on new input or container resize
//!
//! # Example
//!
//! Driving the search by hand with a fake one-line-per-ten-units oracle:
//!
//! ```
//! use clipmark_core::{Node, Step, TruncateOptions, TruncateSearch};
//!
//! let doc = Node::container("p", [Node::text("the quick brown fox jumps")]);
//! let opts = TruncateOptions::new().max_lines(1).marker_text("...");
//! let (mut search, mut step) = TruncateSearch::begin(doc, &opts);
//! let outcome = loop {
//!     match step {
//!         Step::Render(candidate) => {
//!             let lines = candidate.grapheme_count().div_ceil(10).max(1) as i32;
//!             step = search.on_measured(lines);
//!         }
//!         Step::Done(outcome) => break outcome,
//!     }
//! };
//! assert!(outcome.truncated);
//! assert!(outcome.tree.to_plain_text().ends_with("..."));
//! ```

pub mod lifecycle;
pub mod oracle;
pub mod search;
pub mod split;
pub mod tokenize;
pub mod tree;
pub mod validate;

pub use lifecycle::Truncator;
pub use oracle::{Extent, LayoutEngine, ResizeSubscription, lines_for};
pub use search::{Marker, Outcome, Step, TruncateOptions, TruncateSearch};
pub use split::{SplitDirection, SplitOutcome, SplitPath, TreeSplitter};
pub use tokenize::TokenizePolicy;
pub use tree::{DisplayMode, Node, Tag};
pub use validate::{ValidateError, validate_tree};
