#![forbid(unsafe_code)]

//! Fit-oracle protocol: the contract the external renderer satisfies.
//!
//! The core never reasons about pixels or fonts. It hands a candidate tree
//! to a [`LayoutEngine`], lets the engine lay it out, and reads back a
//! rendered extent which it converts to a line count against a cached
//! per-revision line metric. The engine is the single measurement
//! authority; the core only compares line counts to the budget.

use crate::tree::Node;

/// Rendered geometry reported by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    /// Total rendered height, in the engine's units (pixels, cells, ...).
    pub height: f32,
}

/// Handle returned by [`LayoutEngine::on_resize`]; pass it back to
/// [`LayoutEngine::cancel_resize`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSubscription(pub u64);

/// The renderer/layout collaborator consumed by the lifecycle adapter.
///
/// Implementations own their render target. `apply` installs a candidate so
/// that subsequent `rendered_extent` calls reflect it; the core guarantees
/// a strict apply-then-measure alternation, one of each per search step.
pub trait LayoutEngine {
    /// Bind to the render target. Measurements before `attach` (or after
    /// `detach`) report a zero extent, which the core treats as a
    /// measurement anomaly rather than a fit.
    fn attach(&mut self);

    /// Release the render target.
    fn detach(&mut self);

    /// Install a candidate tree and lay it out.
    fn apply(&mut self, candidate: &Node);

    /// Height of a single rendered line, in the same units as
    /// [`LayoutEngine::rendered_extent`].
    fn line_metric(&self) -> f32;

    /// Extent of the currently applied tree.
    fn rendered_extent(&self) -> Extent;

    /// Register a callback invoked when the container geometry changes.
    fn on_resize(&mut self, callback: Box<dyn FnMut()>) -> ResizeSubscription;

    /// Drop a resize subscription.
    fn cancel_resize(&mut self, subscription: ResizeSubscription);
}

/// Convert a rendered extent to whole lines: `round(height / line_unit)`.
///
/// A non-positive result means the target was not visible or laid out at
/// measurement time; the caller must treat it as "does not fit" to avoid
/// false convergence. A degenerate line unit yields zero lines and the same
/// treatment.
#[must_use]
pub fn lines_for(extent: Extent, line_unit: f32) -> i32 {
    if line_unit <= 0.0 {
        tracing::warn!(%line_unit, "non-positive line metric, reporting zero lines");
        return 0;
    }
    (extent.height / line_unit).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_line() {
        assert_eq!(lines_for(Extent { height: 31.8 }, 16.0), 2);
        assert_eq!(lines_for(Extent { height: 16.4 }, 16.0), 1);
        assert_eq!(lines_for(Extent { height: 0.0 }, 16.0), 0);
    }

    #[test]
    fn degenerate_line_unit_reports_zero() {
        assert_eq!(lines_for(Extent { height: 100.0 }, 0.0), 0);
        assert_eq!(lines_for(Extent { height: 100.0 }, -4.0), 0);
    }
}
