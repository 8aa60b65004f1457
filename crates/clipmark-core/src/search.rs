#![forbid(unsafe_code)]

//! Binary-search controller for the maximal fitting prefix.
//!
//! The controller is re-entrant: each step emits a candidate tree to be
//! rendered externally, then suspends until the measurement for that
//! candidate arrives. One split plus one measurement per iteration, in
//! strict alternation — the core never measures anything itself.
//!
//! The state machine is `FullCheck -> Searching -> Finished`: the
//! unmodified original is measured first; if it overflows, candidates
//! are derived along an evolving [`SplitPath`]. A fitting candidate is
//! recorded and the path widened (`grow`); an overflowing one narrows the
//! path (`push_left`). When the splitter reports unsplittable material a
//! second consecutive time, the search finalizes with the best recorded
//! candidate.
//!
//! # Example
//! ```
//! use clipmark_core::search::{Step, TruncateOptions, TruncateSearch};
//! use clipmark_core::tree::Node;
//!
//! let opts = TruncateOptions::new();
//! let doc = Node::container("p", [Node::text("hi")]);
//! let (mut search, mut step) = TruncateSearch::begin(doc.clone(), &opts);
//! let outcome = loop {
//!     match step {
//!         // Pretend everything renders on one line.
//!         Step::Render(_) => step = search.on_measured(1),
//!         Step::Done(outcome) => break outcome,
//!     }
//! };
//! assert!(!outcome.truncated);
//! assert_eq!(outcome.tree, doc);
//! ```

use std::fmt;

use crate::split::{SplitPath, TreeSplitter};
use crate::tokenize::TokenizePolicy;
use crate::tree::{DisplayMode, Node};

/// The truncation marker inserted at the cut point.
pub enum Marker {
    /// A literal string.
    Text(String),
    /// A pre-built node.
    Node(Node),
    /// Computed per candidate: the function receives the truncated tree
    /// (marker not yet appended) and returns the marker node.
    With(Box<dyn Fn(&Node) -> Node>),
}

impl Marker {
    /// The marker node for a given candidate.
    #[must_use]
    pub fn resolve(&self, candidate: &Node) -> Node {
        match self {
            Self::Text(text) => Node::text(text.clone()),
            Self::Node(node) => node.clone(),
            Self::With(compute) => compute(candidate),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::Text("...".to_string())
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Options for a truncation pass.
#[derive(Debug)]
pub struct TruncateOptions {
    /// Line budget; at least 1.
    pub max_lines: usize,
    /// Marker appended to every candidate.
    pub marker: Marker,
    /// Height of one rendered line; `None` derives it from the layout
    /// engine once per document revision.
    pub line_unit: Option<f32>,
    /// Active tokenization policy.
    pub policy: TokenizePolicy,
}

impl TruncateOptions {
    /// Defaults: one line, `"..."` marker, engine-derived line unit,
    /// character policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_lines: 1,
            marker: Marker::default(),
            line_unit: None,
            policy: TokenizePolicy::default(),
        }
    }

    /// Set the line budget (clamped to at least 1).
    #[must_use]
    pub fn max_lines(mut self, lines: usize) -> Self {
        self.max_lines = lines.max(1);
        self
    }

    /// Set the marker.
    #[must_use]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    /// Set a literal string marker.
    #[must_use]
    pub fn marker_text(self, text: impl Into<String>) -> Self {
        self.marker(Marker::Text(text.into()))
    }

    /// Set a computed marker.
    #[must_use]
    pub fn marker_with(self, compute: impl Fn(&Node) -> Node + 'static) -> Self {
        self.marker(Marker::With(Box::new(compute)))
    }

    /// Fix the line unit instead of deriving it from the engine.
    #[must_use]
    pub fn line_unit(mut self, unit: f32) -> Self {
        self.line_unit = Some(unit);
        self
    }

    /// Set the tokenization policy.
    #[must_use]
    pub fn policy(mut self, policy: TokenizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the tokenization policy by configured name, falling back to
    /// characters (with a warning) for unknown names.
    #[must_use]
    pub fn policy_name(self, name: &str) -> Self {
        self.policy(TokenizePolicy::from_name(name))
    }
}

impl Default for TruncateOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The tree to render.
    pub tree: Node,
    /// Whether content was cut (drives the completion callback).
    pub truncated: bool,
}

/// What the driver must do next.
#[derive(Debug)]
pub enum Step {
    /// Render this candidate, measure it, and feed the line count back via
    /// [`TruncateSearch::on_measured`].
    Render(Node),
    /// The search is complete.
    Done(Outcome),
}

#[derive(Debug)]
enum Phase {
    /// Awaiting the measurement of the unmodified original.
    FullCheck,
    /// Awaiting the measurement of the current candidate.
    Searching,
    /// Terminal; the outcome is cached for idempotent re-queries.
    Finished(Outcome),
}

/// One in-flight truncation search over a retained original tree.
#[derive(Debug)]
pub struct TruncateSearch<'a> {
    original: Node,
    original_text: String,
    opts: &'a TruncateOptions,
    splitter: TreeSplitter,
    path: SplitPath,
    phase: Phase,
    /// Marker-appended candidate and its content, for the latest fit.
    latest_that_fits: Option<(Node, String)>,
    /// The candidate currently awaiting measurement.
    current: Option<(Node, String)>,
    end_streak: u8,
    fit_checks: usize,
}

impl<'a> TruncateSearch<'a> {
    /// Start a search. The first emitted step renders the unmodified
    /// original so the full-fit case costs exactly one measurement.
    pub fn begin(original: Node, opts: &'a TruncateOptions) -> (Self, Step) {
        let original_text = original.to_plain_text();
        let search = Self {
            original,
            original_text,
            opts,
            splitter: TreeSplitter::new(opts.policy),
            path: SplitPath::default(),
            phase: Phase::FullCheck,
            latest_that_fits: None,
            current: None,
            end_streak: 0,
            fit_checks: 0,
        };
        let step = Step::Render(search.original.clone());
        (search, step)
    }

    /// Feed back the measured line count for the most recently emitted
    /// candidate and advance the state machine.
    pub fn on_measured(&mut self, lines: i32) -> Step {
        if let Phase::Finished(outcome) = &self.phase {
            return Step::Done(outcome.clone());
        }
        self.fit_checks += 1;
        let fits = self.fits(lines);
        match self.phase {
            Phase::FullCheck => {
                if fits {
                    let outcome = Outcome {
                        tree: self.original.clone(),
                        truncated: false,
                    };
                    self.finish(outcome)
                } else {
                    self.phase = Phase::Searching;
                    self.path = SplitPath::start();
                    self.next_candidate()
                }
            }
            Phase::Searching => {
                if fits {
                    self.latest_that_fits = self.current.clone();
                    self.path.grow();
                } else {
                    self.path.push_left();
                }
                self.next_candidate()
            }
            Phase::Finished(_) => unreachable!("handled above"),
        }
    }

    /// Number of measurements consumed so far (the full check included).
    #[must_use]
    pub fn fit_checks(&self) -> usize {
        self.fit_checks
    }

    fn fits(&self, lines: i32) -> bool {
        if lines <= 0 {
            tracing::warn!(lines, "non-positive rendered line count, treating as overflow");
            return false;
        }
        lines as usize <= self.opts.max_lines
    }

    fn next_candidate(&mut self) -> Step {
        let split = self.splitter.split(&self.original, &self.path);
        if split.end_found {
            self.end_streak += 1;
        } else {
            self.end_streak = 0;
        }
        // One isolated exhaustion is tolerated: the candidate is still
        // rendered and measured, so a final enlarging probe can land. The
        // second consecutive exhaustion terminates.
        if self.end_streak >= 2 {
            return self.finalize();
        }
        let content = split.node.to_plain_text();
        let candidate = append_marker(split.node, &self.opts.marker);
        self.current = Some((candidate.clone(), content));
        tracing::trace!(depth = self.path.len(), "probing candidate");
        Step::Render(candidate)
    }

    fn finalize(&mut self) -> Step {
        // Best fit if one was ever recorded, else the smallest candidate
        // tried (candidates only shrink while nothing fits).
        let (tree, content) = self
            .latest_that_fits
            .clone()
            .or_else(|| self.current.clone())
            .unwrap_or_else(|| (self.original.clone(), self.original_text.clone()));
        let outcome = if content == self.original_text {
            // Marker-omission edge case: the truncated content is the full
            // original, unit for unit (a forced inline-block layout change
            // re-flowed it onto fewer lines). The marker is dropped and the
            // content treated as fitting. Deliberate trade-off.
            Outcome {
                tree: self.original.clone(),
                truncated: false,
            }
        } else {
            Outcome {
                tree,
                truncated: true,
            }
        };
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        self.phase = Phase::Finished(outcome.clone());
        Step::Done(outcome)
    }
}

/// Append the marker as the last child of the candidate root. A leaf root
/// becomes the single child of an implicit block container so the marker
/// has a sibling position.
fn append_marker(candidate: Node, marker: &Marker) -> Node {
    let marker_node = marker.resolve(&candidate);
    match candidate {
        Node::Container {
            tag,
            attrs,
            display,
            mut children,
        } => {
            children.push(marker_node);
            Node::Container {
                tag,
                attrs,
                display,
                children,
            }
        }
        leaf => Node::container("span", [leaf, marker_node]).with_display(DisplayMode::Block),
    }
}
