//! Scenario files: a limiter configuration plus a call timeline.
//!
//! ```toml
//! calls_at_ms = [0, 10, 20, 300]
//!
//! [limiter]
//! wait_ms = 100
//! leading = true
//! ```

use std::path::Path;

use anyhow::Context;
use rpk_ratelimit::RateLimitConfig;
use serde::Deserialize;

/// Parsed scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Limiter settings; flags override individual fields.
    #[serde(default)]
    pub limiter: Option<RateLimitConfig>,

    /// Call offsets in milliseconds.
    #[serde(default)]
    pub calls_at_ms: Vec<u64>,
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
