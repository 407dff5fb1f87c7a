//! Visible range computation.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::{ViewportError, check_dimension, check_item_size};

/// Inclusive range of item indices to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VisibleRange {
    /// First index to render.
    pub start: usize,
    /// Last index to render (inclusive).
    pub end: usize,
}

impl VisibleRange {
    /// Create a range; `start` must not exceed `end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of items in the range.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether `index` falls inside the range.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// The indices as a standard range.
    #[must_use]
    pub const fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for VisibleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Compute the items intersecting the viewport, widened by `overscan` rows on
/// each side and clamped to the list.
///
/// An item is visible when any part of it lies in
/// `[scroll_top, scroll_top + viewport_height)`. Negative scroll offsets are
/// treated as 0 and offsets past the end keep the last item in range.
/// Returns `None` for an empty list.
///
/// # Errors
///
/// Returns an error if `item_height` is not a positive finite number, or if
/// `viewport_height` or `scroll_top` is not finite (or the height negative).
pub fn visible_range(
    scroll_top: f64,
    viewport_height: f64,
    item_height: f64,
    item_count: usize,
    overscan: usize,
) -> Result<Option<VisibleRange>, ViewportError> {
    check_item_size(item_height)?;
    check_dimension("viewport_height", viewport_height)?;
    if !scroll_top.is_finite() {
        return Err(ViewportError::InvalidScrollOffset(scroll_top));
    }
    Ok(window(scroll_top, viewport_height, item_height, item_count, overscan))
}

/// Range computation over already validated inputs.
pub(crate) fn window(
    scroll_top: f64,
    viewport_height: f64,
    item_height: f64,
    item_count: usize,
    overscan: usize,
) -> Option<VisibleRange> {
    let last = item_count.checked_sub(1)?;

    let top = scroll_top.max(0.0);
    let first_visible = to_index((top / item_height).floor()).min(last);
    // Last item whose top edge is strictly above the viewport bottom.
    let last_visible = to_index(((top + viewport_height) / item_height).ceil())
        .saturating_sub(1)
        .clamp(first_visible, last);

    Some(VisibleRange::new(
        first_visible.saturating_sub(overscan),
        last_visible.saturating_add(overscan).min(last),
    ))
}

/// Convert a non-negative whole number of items to an index, saturating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_index(items: f64) -> usize {
    items.max(0.0) as usize
}
