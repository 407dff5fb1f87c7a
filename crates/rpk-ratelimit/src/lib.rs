//! RPK Rate Limit - Debounce and throttle wrappers for high-frequency callbacks
//!
//! This crate gates how often an expensive or side-effecting callback runs in
//! response to bursts of events (keystrokes, pointer movement, scroll or render
//! notifications):
//!
//! - **Debounce**: run once the caller has been quiet for `wait`
//! - **Throttle**: run at most once per `wait` window
//! - **Control surface**: `cancel()` and `flush()` shared by both wrappers
//!
//! Leading-edge executions happen synchronously inside `invoke`; trailing-edge
//! executions are scheduled on the tokio runtime that was current when the
//! wrapper was built.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use rpk_ratelimit::{debounce, RateLimitedFunction};
//!
//! let search = debounce(
//!     |query: String| -> Result<(), std::convert::Infallible> {
//!         tracing::info!(%query, "searching");
//!         Ok(())
//!     },
//!     Duration::from_millis(500),
//! )?;
//!
//! // Only the last keystroke of the burst reaches the callback.
//! for query in ["r", "ru", "rus", "rust"] {
//!     search.invoke(query.to_string())?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod control;
mod debounce;
mod options;
mod throttle;
mod timer;

pub use control::ErrorHook;
pub use debounce::*;
pub use options::*;
pub use throttle::*;

use std::time::Duration;

/// Common control surface of rate-limited wrappers.
///
/// Wrappers are cheap to clone; clones share the same pending state. Dropping
/// the last clone disposes the wrapper and discards anything still scheduled.
pub trait RateLimitedFunction<A>: Send + Sync {
    /// Error returned by the wrapped callback.
    type Error;

    /// Call the wrapper with `args`.
    ///
    /// Returns what happened to this call. Errors only surface here when the
    /// callback ran synchronously (leading edge or a forced `max_wait` run).
    ///
    /// # Errors
    ///
    /// Returns the callback's error if it executed synchronously and failed.
    fn invoke(&self, args: A) -> Result<Invocation, Self::Error>;

    /// Discard any pending invocation without running the callback.
    ///
    /// Idempotent; calling it with nothing pending is a no-op.
    fn cancel(&self);

    /// Run a pending trailing invocation right now.
    ///
    /// Returns `true` if the callback executed.
    ///
    /// # Errors
    ///
    /// Returns the callback's error if the flushed execution failed.
    fn flush(&self) -> Result<bool, Self::Error>;

    /// Whether a scheduled invocation is outstanding.
    fn is_pending(&self) -> bool;

    /// Get the current state as a snapshot.
    fn state(&self) -> RateLimitState;
}

/// Outcome of a single `invoke` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Invocation {
    /// The callback ran synchronously with these arguments.
    Executed,

    /// The arguments were recorded for a trailing execution.
    Scheduled,

    /// The arguments were dropped; they will never reach the callback.
    Suppressed,
}

/// Wrapper phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing scheduled.
    Idle,

    /// A timer is armed.
    Pending,
}

/// Rate-limited wrapper state snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RateLimitState {
    /// Current phase.
    pub phase: Phase,

    /// Whether arguments are waiting for a trailing execution.
    pub has_pending_args: bool,

    /// Time until the armed timer fires.
    pub fires_in: Option<Duration>,

    /// Total calls received through `invoke`.
    pub calls: u64,

    /// Total executions of the wrapped callback.
    pub executions: u64,

    /// Calls whose arguments were dropped without ever executing.
    pub suppressed: u64,
}

/// Rate limit error.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Invalid configuration.
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),

    /// Wrapper was built outside of a tokio runtime.
    #[error("No tokio runtime available to schedule deferred invocations")]
    NoRuntime,
}

/// Serializable configuration for rate-limited wrappers.
///
/// Durations are signed milliseconds so that files carrying negative values
/// are rejected with a configuration error instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RateLimitConfig {
    /// Wait window in milliseconds.
    pub wait_ms: i64,

    /// Execute on the leading edge (wrapper default when unset).
    #[serde(default)]
    pub leading: Option<bool>,

    /// Execute on the trailing edge (wrapper default when unset).
    #[serde(default)]
    pub trailing: Option<bool>,

    /// Longest a debounce burst may defer execution.
    #[serde(default)]
    pub max_wait_ms: Option<i64>,
}

impl RateLimitConfig {
    /// Create a new configuration with wrapper defaults for the edges.
    #[must_use]
    pub const fn new(wait_ms: i64) -> Self {
        Self {
            wait_ms,
            leading: None,
            trailing: None,
            max_wait_ms: None,
        }
    }

    /// Set the leading edge flag.
    #[must_use]
    pub const fn with_leading(mut self, leading: bool) -> Self {
        self.leading = Some(leading);
        self
    }

    /// Set the trailing edge flag.
    #[must_use]
    pub const fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = Some(trailing);
        self
    }

    /// Set the maximum debounce deferral.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait_ms: i64) -> Self {
        self.max_wait_ms = Some(max_wait_ms);
        self
    }

    /// Common preset: search input debounce (500ms).
    #[must_use]
    pub const fn search_input() -> Self {
        Self::new(500)
    }

    /// Common preset: pointer tracking throttle (16ms, roughly one frame at 60fps).
    #[must_use]
    pub const fn pointer_tracking() -> Self {
        Self::new(16)
    }

    /// Validate into debounce options.
    ///
    /// # Errors
    ///
    /// Returns an error for negative durations, durations above [`MAX_WAIT`],
    /// `max_wait_ms < wait_ms`, or when both edges are disabled.
    pub fn debounce_options(&self) -> Result<DebounceOptions, RateLimitError> {
        let mut options = DebounceOptions::new(millis("wait_ms", self.wait_ms)?);
        if let Some(leading) = self.leading {
            options = options.with_leading(leading);
        }
        if let Some(trailing) = self.trailing {
            options = options.with_trailing(trailing);
        }
        if let Some(max_wait_ms) = self.max_wait_ms {
            options = options.with_max_wait(millis("max_wait_ms", max_wait_ms)?);
        }
        options.validate()?;
        Ok(options)
    }

    /// Validate into throttle options.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative or oversized wait, when `max_wait_ms`
    /// is set, or when both edges are disabled.
    pub fn throttle_options(&self) -> Result<ThrottleOptions, RateLimitError> {
        if self.max_wait_ms.is_some() {
            return Err(RateLimitError::InvalidConfig(
                "max_wait_ms only applies to debounce".into(),
            ));
        }
        let mut options = ThrottleOptions::new(millis("wait_ms", self.wait_ms)?);
        if let Some(leading) = self.leading {
            options = options.with_leading(leading);
        }
        if let Some(trailing) = self.trailing {
            options = options.with_trailing(trailing);
        }
        options.validate()?;
        Ok(options)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::search_input()
    }
}

fn millis(field: &str, value: i64) -> Result<Duration, RateLimitError> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| RateLimitError::InvalidConfig(format!("{field} must be >= 0, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_follow_wrapper_defaults() {
        let debounce = RateLimitConfig::new(250).debounce_options().unwrap();
        assert_eq!(debounce.wait, Duration::from_millis(250));
        assert!(!debounce.leading);
        assert!(debounce.trailing);
        assert_eq!(debounce.max_wait, None);

        let throttle = RateLimitConfig::new(250).throttle_options().unwrap();
        assert!(throttle.leading);
        assert!(throttle.trailing);
    }

    #[test]
    fn config_rejects_negative_wait() {
        let err = RateLimitConfig::new(-1).debounce_options().unwrap_err();
        assert!(err.to_string().contains("wait_ms must be >= 0"));

        let err = RateLimitConfig::new(-5).throttle_options().unwrap_err();
        assert!(err.to_string().contains("wait_ms must be >= 0"));
    }

    #[test]
    fn config_rejects_max_wait_below_wait() {
        let err = RateLimitConfig::new(100)
            .with_max_wait(50)
            .debounce_options()
            .unwrap_err();
        assert!(matches!(err, RateLimitError::InvalidConfig(_)));

        let err = RateLimitConfig::new(100)
            .with_max_wait(-1)
            .debounce_options()
            .unwrap_err();
        assert!(err.to_string().contains("max_wait_ms"));
    }

    #[test]
    fn config_rejects_max_wait_for_throttle() {
        let err = RateLimitConfig::new(100)
            .with_max_wait(200)
            .throttle_options()
            .unwrap_err();
        assert!(err.to_string().contains("only applies to debounce"));
    }

    #[test]
    fn config_rejects_throttle_without_edges() {
        let err = RateLimitConfig::new(100)
            .with_leading(false)
            .with_trailing(false)
            .throttle_options()
            .unwrap_err();
        assert!(err.to_string().contains("leading or trailing"));
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: RateLimitConfig = toml::from_str(
            r"
            wait_ms = 300
            leading = true
            max_wait_ms = 1000
            ",
        )
        .unwrap();

        assert_eq!(cfg, RateLimitConfig::new(300).with_leading(true).with_max_wait(1000));
        let options = cfg.debounce_options().unwrap();
        assert_eq!(options.max_wait, Some(Duration::from_secs(1)));
    }

    #[test]
    fn presets() {
        assert_eq!(RateLimitConfig::default(), RateLimitConfig::search_input());
        assert_eq!(RateLimitConfig::pointer_tracking().wait_ms, 16);
    }
}
