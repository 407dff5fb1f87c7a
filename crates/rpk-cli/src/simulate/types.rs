//! Simulation report types for machine-readable JSON output.

use chrono::{DateTime, Utc};
use rpk_ratelimit::{Invocation, RateLimitConfig, RateLimitState};
use serde::Serialize;

/// Which wrapper a simulation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LimiterKind {
    Debounce,
    Throttle,
}

impl LimiterKind {
    /// Preset used when neither flags nor a scenario file set the wait.
    pub const fn preset(self) -> RateLimitConfig {
        match self {
            Self::Debounce => RateLimitConfig::search_input(),
            Self::Throttle => RateLimitConfig::pointer_tracking(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Debounce => "debounce",
            Self::Throttle => "throttle",
        }
    }
}

/// Complete simulation report.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Schema version for forward/backward compatibility.
    pub schema_version: String,

    /// Timestamp when the report was generated.
    pub generated_at: DateTime<Utc>,

    pub limiter: LimiterKind,

    /// Effective configuration after merging file and flags.
    pub config: RateLimitConfig,

    /// Every call delivered, in delivery order.
    pub calls: Vec<CallRecord>,

    /// Executions of the bare callback (one per call).
    pub raw_executions: usize,

    /// Executions of the wrapped callback.
    pub executions: Vec<ExecutionRecord>,

    /// Wrapper state after the replay settled.
    pub final_state: RateLimitState,
}

impl SimulationReport {
    /// Create a report stamped with the current time.
    #[must_use]
    pub fn new(
        limiter: LimiterKind,
        config: RateLimitConfig,
        calls: Vec<CallRecord>,
        executions: Vec<ExecutionRecord>,
        final_state: RateLimitState,
    ) -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
            generated_at: Utc::now(),
            limiter,
            config,
            raw_executions: calls.len(),
            calls,
            executions,
            final_state,
        }
    }

    /// Executions the limiter avoided.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.raw_executions.saturating_sub(self.executions.len())
    }
}

/// One delivered call.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    /// Position in the timeline.
    pub index: usize,

    /// Scheduled offset from the start of the replay.
    pub at_ms: u64,

    /// What the wrapper did with the call.
    pub outcome: Invocation,
}

/// One execution of the wrapped callback.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    /// Index of the call whose arguments were used.
    pub call_index: usize,

    /// Measured offset from the start of the replay.
    pub at_ms: u64,
}
