//! RPK Viewport - Windowing math for fixed-size virtualized lists
//!
//! A virtualized list renders only the rows that intersect the scroll
//! viewport, plus a few overscan rows on either side, and positions each one
//! at `index * item_size` inside a spacer as tall as the whole list.
//!
//! - [`visible_range`]: the stateless range computation
//! - [`FixedSizeList`]: scroll-tracking list state with item layout and
//!   scroll-to-item offsets
//!
//! # Example
//!
//! ```rust
//! use rpk_viewport::{VisibleRange, visible_range};
//!
//! let range = visible_range(3600.0, 600.0, 180.0, 10_000, 2).unwrap();
//! assert_eq!(range, Some(VisibleRange::new(18, 25)));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod list;
mod range;

pub use list::*;
pub use range::*;

/// Default number of rows rendered beyond each viewport edge.
pub const DEFAULT_OVERSCAN: usize = 2;

/// Viewport error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// Item size is zero, negative or not finite.
    #[error("Item size must be finite and > 0, got {0}")]
    InvalidItemSize(f64),

    /// A length is negative or not finite.
    #[error("{name} must be finite and >= 0, got {value}")]
    InvalidDimension {
        /// Which input was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Scroll offset is not a finite number.
    #[error("Scroll offset must be finite, got {0}")]
    InvalidScrollOffset(f64),
}

pub(crate) fn check_item_size(item_size: f64) -> Result<(), ViewportError> {
    if item_size.is_finite() && item_size > 0.0 {
        Ok(())
    } else {
        Err(ViewportError::InvalidItemSize(item_size))
    }
}

pub(crate) fn check_dimension(name: &'static str, value: f64) -> Result<(), ViewportError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ViewportError::InvalidDimension { name, value })
    }
}
