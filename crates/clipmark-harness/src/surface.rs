#![forbid(unsafe_code)]

//! A fixed-width text surface implementing the layout-engine contract.
//!
//! Stands in for the external renderer during tests and benches: a
//! candidate tree is flattened to inline runs separated by block
//! boundaries, each run is wrapped at the surface width, and the rendered
//! extent is `lines * line_unit`. Fully deterministic, no terminal, no
//! timing.

use clipmark_core::oracle::{Extent, LayoutEngine, ResizeSubscription};
use clipmark_core::tree::{DisplayMode, Node};

use crate::wrap::line_count;

/// Default line unit, loosely a 16px line height.
pub const DEFAULT_LINE_UNIT: f32 = 16.0;

type ResizeCallback = Box<dyn FnMut()>;

/// Deterministic in-process layout engine.
pub struct TextSurface {
    width: usize,
    line_unit: f32,
    attached: bool,
    current: Option<Node>,
    apply_count: usize,
    subscribers: Vec<(u64, ResizeCallback)>,
    next_subscription: u64,
}

impl TextSurface {
    /// A surface `width` cells wide.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            line_unit: DEFAULT_LINE_UNIT,
            attached: false,
            current: None,
            apply_count: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Override the line unit (builder style).
    #[must_use]
    pub fn line_unit(mut self, unit: f32) -> Self {
        self.line_unit = unit;
        self
    }

    /// Current surface width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Change the surface width and notify resize subscribers.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
        for (_, callback) in &mut self.subscribers {
            callback();
        }
    }

    /// Lines the currently applied tree occupies.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.current
            .as_ref()
            .map_or(0, |node| layout_lines(node, self.width))
    }

    /// Flattened text of the currently applied tree.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(String::new, Node::to_plain_text)
    }

    /// Number of `apply` calls so far; one per search step.
    #[must_use]
    pub fn apply_count(&self) -> usize {
        self.apply_count
    }
}

impl LayoutEngine for TextSurface {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
        self.current = None;
    }

    fn apply(&mut self, candidate: &Node) {
        self.apply_count += 1;
        tracing::trace!(step = self.apply_count, "candidate applied");
        self.current = Some(candidate.clone());
    }

    fn line_metric(&self) -> f32 {
        self.line_unit
    }

    fn rendered_extent(&self) -> Extent {
        if !self.attached {
            // Not mounted: report nothing laid out, the core treats this as
            // a measurement anomaly.
            return Extent::default();
        }
        Extent {
            height: self.lines() as f32 * self.line_unit,
        }
    }

    fn on_resize(&mut self, callback: Box<dyn FnMut()>) -> ResizeSubscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, callback));
        ResizeSubscription(id)
    }

    fn cancel_resize(&mut self, subscription: ResizeSubscription) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }
}

/// Total lines of a tree: inline content accumulates into runs, block
/// containers break runs, each run wraps independently.
fn layout_lines(root: &Node, width: usize) -> usize {
    let mut runs = Vec::new();
    let mut current = String::new();
    collect_runs(root, true, &mut runs, &mut current);
    flush(&mut runs, &mut current);
    runs.iter().map(|run| line_count(run, width)).sum()
}

fn collect_runs(node: &Node, is_root: bool, runs: &mut Vec<String>, current: &mut String) {
    match node {
        Node::Text(content) => current.push_str(content),
        // Atomic content flows inline; atomicity constrains splitting, not
        // layout.
        Node::Atomic(inner) => collect_runs(inner, false, runs, current),
        Node::Container {
            display, children, ..
        } => {
            let block = is_root || *display == Some(DisplayMode::Block);
            if block {
                flush(runs, current);
            }
            for child in children {
                collect_runs(child, false, runs, current);
            }
            if block {
                flush(runs, current);
            }
        }
    }
}

fn flush(runs: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        runs.push(std::mem::take(current));
    }
}
