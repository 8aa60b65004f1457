#![forbid(unsafe_code)]

//! Deterministic layout harness for clipmark.
//!
//! The core delegates all rendering and measurement to an external layout
//! engine; this crate provides [`TextSurface`], a fixed-width in-process
//! stand-in with Unicode-correct cell widths, so searches can be driven end
//! to end in tests and benches without a renderer.
//!
//! # Example
//! ```
//! use clipmark_core::{Node, TruncateOptions, Truncator};
//! use clipmark_harness::TextSurface;
//!
//! let opts = TruncateOptions::new().max_lines(1).marker_text("...");
//! let mut truncator = Truncator::new(TextSurface::new(10), opts);
//! truncator.set_source(Node::container("p", [Node::text("hello wide world")]));
//! let text = truncator.result().unwrap().to_plain_text();
//! assert!(text.ends_with("..."));
//! ```

pub mod surface;
pub mod wrap;

pub use surface::{DEFAULT_LINE_UNIT, TextSurface};
pub use wrap::line_count;
