//! Typed wrapper options.

use std::time::Duration;

use crate::RateLimitError;

/// Longest accepted `wait` or `max_wait`. Deadlines are computed as
/// `Instant + wait`, which must stay representable.
pub const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Options for a [`Debounced`](crate::Debounced) wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Quiet period required before the trailing execution.
    pub wait: Duration,

    /// Execute on the first call of a burst.
    pub leading: bool,

    /// Execute with the last arguments once the burst settles.
    pub trailing: bool,

    /// Longest a burst may defer execution.
    pub max_wait: Option<Duration>,
}

impl DebounceOptions {
    /// Create trailing-only options.
    #[must_use]
    pub const fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }

    /// Enable or disable the leading edge.
    #[must_use]
    pub const fn with_leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Enable or disable the trailing edge.
    #[must_use]
    pub const fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Cap how long a continuous burst can defer execution.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Check the option combination.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration exceeds [`MAX_WAIT`], `max_wait < wait`,
    /// or both edges are disabled.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        check_wait("wait", self.wait)?;
        if let Some(max_wait) = self.max_wait {
            check_wait("max_wait", max_wait)?;
            if max_wait < self.wait {
                return Err(RateLimitError::InvalidConfig(format!(
                    "max_wait ({max_wait:?}) must be >= wait ({:?})",
                    self.wait
                )));
            }
        }
        check_edges(self.leading, self.trailing)
    }
}

/// Options for a [`Throttled`](crate::Throttled) wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOptions {
    /// Window length; at most one execution per window.
    pub wait: Duration,

    /// Execute on the first call of a window.
    pub leading: bool,

    /// Execute with the latest arguments when the window closes.
    pub trailing: bool,
}

impl ThrottleOptions {
    /// Create leading + trailing options.
    #[must_use]
    pub const fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: true,
            trailing: true,
        }
    }

    /// Enable or disable the leading edge.
    #[must_use]
    pub const fn with_leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Enable or disable the trailing edge.
    #[must_use]
    pub const fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Check the option combination.
    ///
    /// # Errors
    ///
    /// Returns an error if `wait` exceeds [`MAX_WAIT`] or both edges are
    /// disabled.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        check_wait("wait", self.wait)?;
        check_edges(self.leading, self.trailing)
    }
}

fn check_wait(field: &str, value: Duration) -> Result<(), RateLimitError> {
    if value > MAX_WAIT {
        return Err(RateLimitError::InvalidConfig(format!(
            "{field} ({value:?}) must be <= {MAX_WAIT:?}"
        )));
    }
    Ok(())
}

fn check_edges(leading: bool, trailing: bool) -> Result<(), RateLimitError> {
    if leading || trailing {
        Ok(())
    } else {
        Err(RateLimitError::InvalidConfig(
            "at least one of leading or trailing must be enabled".into(),
        ))
    }
}
