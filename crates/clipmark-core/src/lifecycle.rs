#![forbid(unsafe_code)]

//! Lifecycle adapter: reacts to structural changes by resetting and
//! restarting the search.
//!
//! Two event kinds exist — a new input document ([`Truncator::set_source`])
//! and a container geometry change ([`Truncator::resize`]). Both discard
//! every piece of search state (split-path, best fit, exhaustion flags, the
//! cached line metric) before starting a fresh pass, so measurements from a
//! cancelled search are never applied. Only one search is ever in flight.
//!
//! The adapter subscribes to the engine's resize notifications; because the
//! engine may fire them while the adapter is borrowed elsewhere, the
//! notification only latches a flag and the embedder drains it with
//! [`Truncator::pump`].

use std::cell::Cell;
use std::rc::Rc;

use crate::oracle::{LayoutEngine, ResizeSubscription, lines_for};
use crate::search::{Step, TruncateOptions, TruncateSearch};
use crate::tree::Node;
use crate::validate::validate_tree;

/// Owns the layout engine and drives one truncation pass per lifecycle
/// event.
pub struct Truncator<E: LayoutEngine> {
    engine: E,
    options: TruncateOptions,
    original: Option<Node>,
    result: Option<Node>,
    on_complete: Option<Box<dyn FnMut(bool)>>,
    resize_pending: Rc<Cell<bool>>,
    resize_subscription: ResizeSubscription,
}

impl<E: LayoutEngine> Truncator<E> {
    /// Attach to the engine and subscribe to resize notifications.
    #[must_use]
    pub fn new(mut engine: E, options: TruncateOptions) -> Self {
        engine.attach();
        let resize_pending = Rc::new(Cell::new(false));
        let flag = Rc::clone(&resize_pending);
        let resize_subscription = engine.on_resize(Box::new(move || flag.set(true)));
        Self {
            engine,
            options,
            original: None,
            result: None,
            on_complete: None,
            resize_pending,
            resize_subscription,
        }
    }

    /// Register the completion callback, invoked exactly once per completed
    /// search with `was_truncated`.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Install a new input document and run a fresh search.
    ///
    /// The previous original (and any search over it) is discarded
    /// wholesale; there is no incremental diffing between revisions.
    pub fn set_source(&mut self, root: Node) {
        self.original = Some(root);
        self.run();
    }

    /// React to a container geometry change: full reset, re-measure the
    /// retained original from scratch.
    pub fn resize(&mut self) {
        self.resize_pending.set(false);
        self.run();
    }

    /// Drain a pending resize notification, if any. Returns whether a new
    /// pass ran.
    pub fn pump(&mut self) -> bool {
        if self.resize_pending.get() {
            self.resize();
            true
        } else {
            false
        }
    }

    /// The tree emitted by the last completed pass.
    #[must_use]
    pub fn result(&self) -> Option<&Node> {
        self.result.as_ref()
    }

    /// Access the owned engine (tests and embedders).
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the owned engine. A geometry change made through
    /// here still requires [`Truncator::resize`] or [`Truncator::pump`] to
    /// take effect.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn run(&mut self) {
        let Some(original) = self.original.clone() else {
            return;
        };
        if let Err(err) = validate_tree(&original) {
            tracing::warn!(%err, "tree failed validation, rendering the original untruncated");
            self.engine.apply(&original);
            self.result = Some(original);
            return;
        }
        // The line metric is derived once per revision and cached for the
        // duration of this search.
        let line_unit = self
            .options
            .line_unit
            .unwrap_or_else(|| self.engine.line_metric());
        let (mut search, mut step) = TruncateSearch::begin(original, &self.options);
        let outcome = loop {
            match step {
                Step::Render(candidate) => {
                    self.engine.apply(&candidate);
                    let lines = lines_for(self.engine.rendered_extent(), line_unit);
                    step = search.on_measured(lines);
                }
                Step::Done(outcome) => break outcome,
            }
        };
        self.engine.apply(&outcome.tree);
        self.result = Some(outcome.tree);
        if let Some(callback) = &mut self.on_complete {
            callback(outcome.truncated);
        }
    }
}

impl<E: LayoutEngine> Drop for Truncator<E> {
    fn drop(&mut self) {
        self.engine.cancel_resize(self.resize_subscription);
        self.engine.detach();
    }
}
