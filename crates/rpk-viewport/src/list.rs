//! Scroll-tracking state for a list of equally sized rows.

use serde::{Deserialize, Serialize};

use crate::range::window;
use crate::{DEFAULT_OVERSCAN, ViewportError, VisibleRange, check_dimension, check_item_size};

/// Where a scrolled-to item should land in the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Item top at the viewport top.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item bottom at the viewport bottom.
    End,
    /// Scroll as little as possible to make the item fully visible.
    #[default]
    Auto,
}

/// A rendered row and where it sits inside the full-height spacer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VirtualItem {
    /// Row index in the full list.
    pub index: usize,
    /// Distance from the top of the spacer.
    pub offset: f64,
    /// Row height in pixels.
    pub size: f64,
}

/// Windowed list of `item_count` rows, each `item_size` tall.
///
/// Tracks the scroll offset and keeps the visible range current as it
/// changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSizeList {
    item_count: usize,
    item_size: f64,
    viewport_height: f64,
    overscan: usize,
    scroll_offset: f64,
    range: Option<VisibleRange>,
}

impl FixedSizeList {
    /// Create a list scrolled to the top, with the default overscan.
    ///
    /// # Errors
    ///
    /// Returns an error if `item_size` is not a positive finite number or
    /// `viewport_height` is negative or not finite.
    pub fn new(
        item_count: usize,
        item_size: f64,
        viewport_height: f64,
    ) -> Result<Self, ViewportError> {
        check_item_size(item_size)?;
        check_dimension("viewport_height", viewport_height)?;

        let mut list = Self {
            item_count,
            item_size,
            viewport_height,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0.0,
            range: None,
        };
        list.refresh();
        Ok(list)
    }

    /// Set how many rows to render beyond each viewport edge.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self.refresh();
        self
    }

    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    #[must_use]
    pub const fn item_size(&self) -> f64 {
        self.item_size
    }

    #[must_use]
    pub const fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    #[must_use]
    pub const fn overscan(&self) -> usize {
        self.overscan
    }

    /// Current scroll offset, always within `[0, max_scroll_offset()]`.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Rows to render, or `None` for an empty list.
    #[must_use]
    pub const fn visible_range(&self) -> Option<VisibleRange> {
        self.range
    }

    /// Height of the spacer holding every row.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_height(&self) -> f64 {
        self.item_count as f64 * self.item_size
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_height() - self.viewport_height).max(0.0)
    }

    /// Layout of row `index`, if it exists.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        (index < self.item_count).then(|| self.layout(index))
    }

    /// Layout of every row in the visible range, top to bottom.
    pub fn items(&self) -> impl Iterator<Item = VirtualItem> + '_ {
        self.range
            .into_iter()
            .flat_map(|range| range.indices())
            .map(|index| self.layout(index))
    }

    /// Scroll to `offset`, clamped to the list. Returns whether the visible
    /// range changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is not finite.
    pub fn set_scroll_offset(&mut self, offset: f64) -> Result<bool, ViewportError> {
        if !offset.is_finite() {
            return Err(ViewportError::InvalidScrollOffset(offset));
        }
        self.scroll_offset = offset.clamp(0.0, self.max_scroll_offset());
        Ok(self.refresh())
    }

    /// Resize the viewport. Returns whether the visible range changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `height` is negative or not finite.
    pub fn set_viewport_height(&mut self, height: f64) -> Result<bool, ViewportError> {
        check_dimension("viewport_height", height)?;
        self.viewport_height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        Ok(self.refresh())
    }

    /// Change the number of rows. Returns whether the visible range changed.
    pub fn set_item_count(&mut self, item_count: usize) -> bool {
        self.item_count = item_count;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        self.refresh()
    }

    /// Scroll offset that brings row `index` into view with `align`.
    ///
    /// Indices past the end are treated as the last row.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_offset_for(&self, index: usize, align: Align) -> f64 {
        let Some(last) = self.item_count.checked_sub(1) else {
            return 0.0;
        };
        let item_top = index.min(last) as f64 * self.item_size;
        let last_item_offset = self.max_scroll_offset();
        let max_offset = last_item_offset.min(item_top);
        let min_offset = (item_top - self.viewport_height + self.item_size).max(0.0);

        match align {
            Align::Start => max_offset,
            Align::End => min_offset,
            Align::Center => {
                let middle = (min_offset + (max_offset - min_offset) / 2.0).round();
                if middle < (self.viewport_height / 2.0).ceil() {
                    0.0
                } else if middle > last_item_offset + (self.viewport_height / 2.0).floor() {
                    last_item_offset
                } else {
                    middle
                }
            }
            Align::Auto => {
                if self.scroll_offset < min_offset {
                    min_offset
                } else if self.scroll_offset > max_offset {
                    max_offset
                } else {
                    self.scroll_offset
                }
            }
        }
    }

    /// Scroll row `index` into view. Returns whether the visible range
    /// changed.
    pub fn scroll_to_item(&mut self, index: usize, align: Align) -> bool {
        self.scroll_offset = self.scroll_offset_for(index, align);
        self.refresh()
    }

    #[allow(clippy::cast_precision_loss)]
    fn layout(&self, index: usize) -> VirtualItem {
        VirtualItem {
            index,
            offset: index as f64 * self.item_size,
            size: self.item_size,
        }
    }

    fn refresh(&mut self) -> bool {
        let next = window(
            self.scroll_offset,
            self.viewport_height,
            self.item_size,
            self.item_count,
            self.overscan,
        );
        if next == self.range {
            return false;
        }
        tracing::trace!(
            scroll_offset = self.scroll_offset,
            range = ?next,
            "Visible range changed"
        );
        self.range = next;
        true
    }
}
