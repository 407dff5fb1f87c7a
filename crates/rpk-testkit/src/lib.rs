//! RPK Test Kit - Testing utilities for rate-limited callbacks
//!
//! This crate provides the shared pieces the workspace tests are built from:
//!
//! - [`CallRecorder`] - Callbacks that record every execution and its instant
//! - [`Timeline`] / [`replay`] - Call schedules driven through virtual time
//! - Assertion helpers for execution order and timing
//! - Tracing configuration and capture for test output
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use rpk_ratelimit::{debounce, RateLimitedFunction};
//! use rpk_testkit::{CallRecorder, Timeline, assert_invoked_with, replay};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_burst() {
//!     rpk_testkit::init_test_tracing();
//!
//!     let recorder = CallRecorder::new();
//!     let debounced = debounce(recorder.callback(), Duration::from_millis(100)).unwrap();
//!
//!     replay(&Timeline::burst(0, 5, 10), |i| debounced.invoke(i).unwrap()).await;
//!     tokio::time::sleep(Duration::from_millis(200)).await;
//!
//!     assert_invoked_with(&recorder, &[4]);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod assertions;
pub mod fixtures;
mod recorder;
mod tracing_config;

pub use assertions::*;
pub use fixtures::{Timeline, replay};
pub use recorder::*;
pub use tracing_config::*;
