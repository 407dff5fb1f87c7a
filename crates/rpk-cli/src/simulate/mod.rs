//! `rpk simulate`: replay a call timeline through a debounce or throttle.
//!
//! Calls are delivered in real time on a current-thread tokio runtime. Each
//! call would run the bare callback once; the report compares that with what
//! the wrapped callback actually executed.

mod scenario;
mod types;

pub use scenario::Scenario;
pub use types::{CallRecord, ExecutionRecord, LimiterKind, SimulationReport};

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Args;
use parking_lot::Mutex;
use rpk_ratelimit::{
    Debounced, Invocation, RateLimitConfig, RateLimitState, RateLimitedFunction, Throttled,
};
use tokio::time::{Instant, sleep, sleep_until};

use crate::OutputFormat;

/// How often to check whether a trailing execution is still outstanding.
const SETTLE_POLL: Duration = Duration::from_millis(5);

/// Arguments for the `rpk simulate` command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Limiter to drive.
    #[arg(value_enum)]
    limiter: LimiterKind,

    /// Call offsets in milliseconds (e.g. 0,10,20,300).
    #[arg(long, value_delimiter = ',')]
    at: Vec<u64>,

    /// Wait window in milliseconds.
    #[arg(long, allow_negative_numbers = true)]
    wait_ms: Option<i64>,

    /// Execute on the leading edge.
    #[arg(long, conflicts_with = "no_leading")]
    leading: bool,

    /// Do not execute on the leading edge.
    #[arg(long)]
    no_leading: bool,

    /// Do not execute on the trailing edge.
    #[arg(long)]
    no_trailing: bool,

    /// Longest a debounce burst may defer execution, in milliseconds.
    #[arg(long, allow_negative_numbers = true)]
    max_wait_ms: Option<i64>,

    /// Scenario file (TOML) with a `[limiter]` table and `calls_at_ms`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flush the pending invocation right after the last call instead of
    /// waiting for it.
    #[arg(long)]
    flush: bool,

    /// Output format: json (machine-readable) or human (pretty-printed).
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

impl SimulateArgs {
    /// Apply command-line flags over a base configuration.
    fn apply_overrides(&self, mut config: RateLimitConfig) -> RateLimitConfig {
        if let Some(wait_ms) = self.wait_ms {
            config.wait_ms = wait_ms;
        }
        if self.leading {
            config = config.with_leading(true);
        }
        if self.no_leading {
            config = config.with_leading(false);
        }
        if self.no_trailing {
            config = config.with_trailing(false);
        }
        if let Some(max_wait_ms) = self.max_wait_ms {
            config = config.with_max_wait(max_wait_ms);
        }
        config
    }
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let scenario = args
        .config
        .as_deref()
        .map(Scenario::load)
        .transpose()?
        .unwrap_or_default();

    let config = args.apply_overrides(scenario.limiter.unwrap_or_else(|| args.limiter.preset()));
    let mut calls_at = if args.at.is_empty() {
        scenario.calls_at_ms
    } else {
        args.at.clone()
    };
    if calls_at.is_empty() {
        bail!("no calls to replay: pass --at or set calls_at_ms in --config");
    }
    calls_at.sort_unstable();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    let report = runtime.block_on(simulate(args.limiter, config, &calls_at, args.flush))?;

    tracing::info!(
        limiter = args.limiter.name(),
        calls = report.raw_executions,
        executions = report.executions.len(),
        saved = report.saved(),
        "Replay finished"
    );

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => {
            print_human_report(&report);
        }
    }

    Ok(())
}

async fn simulate(
    kind: LimiterKind,
    config: RateLimitConfig,
    calls_at: &[u64],
    flush: bool,
) -> anyhow::Result<SimulationReport> {
    let start = Instant::now();
    let executions = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&executions);
    let callback = move |call_index: usize| -> Result<(), Infallible> {
        sink.lock().push(ExecutionRecord {
            call_index,
            at_ms: elapsed_ms(start),
        });
        Ok(())
    };

    let (calls, final_state) = match kind {
        LimiterKind::Debounce => {
            let wrapper = Debounced::new(callback, config.debounce_options()?)?;
            drive(&wrapper, start, calls_at, flush).await
        }
        LimiterKind::Throttle => {
            let wrapper = Throttled::new(callback, config.throttle_options()?)?;
            drive(&wrapper, start, calls_at, flush).await
        }
    };

    let executions = executions.lock().clone();
    Ok(SimulationReport::new(
        kind,
        config,
        calls,
        executions,
        final_state,
    ))
}

/// Deliver every call on schedule, then let the wrapper settle.
async fn drive<W>(
    wrapper: &W,
    start: Instant,
    calls_at: &[u64],
    flush: bool,
) -> (Vec<CallRecord>, RateLimitState)
where
    W: RateLimitedFunction<usize, Error = Infallible>,
{
    let mut calls = Vec::with_capacity(calls_at.len());
    for (index, at_ms) in calls_at.iter().copied().enumerate() {
        sleep_until(start + Duration::from_millis(at_ms)).await;
        let outcome = infallible(wrapper.invoke(index));
        tracing::debug!(index, at_ms, ?outcome, "Call delivered");
        calls.push(CallRecord {
            index,
            at_ms,
            outcome,
        });
    }

    if flush {
        infallible(wrapper.flush());
    } else {
        while wrapper.is_pending() {
            sleep(SETTLE_POLL).await;
        }
    }

    (calls, wrapper.state())
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

const fn outcome_label(outcome: Invocation) -> &'static str {
    match outcome {
        Invocation::Executed => "executed",
        Invocation::Scheduled => "scheduled",
        Invocation::Suppressed => "suppressed",
    }
}

fn edge_label(edge: Option<bool>) -> &'static str {
    match edge {
        Some(true) => "on",
        Some(false) => "off",
        None => "default",
    }
}

fn print_human_report(report: &SimulationReport) {
    println!("RPK Simulation Report");
    println!("=====================");
    println!();
    println!("Limiter:  {}", report.limiter.name());
    println!("  Wait:      {} ms", report.config.wait_ms);
    println!("  Leading:   {}", edge_label(report.config.leading));
    println!("  Trailing:  {}", edge_label(report.config.trailing));
    if let Some(max_wait_ms) = report.config.max_wait_ms {
        println!("  Max wait:  {max_wait_ms} ms");
    }
    println!();
    println!("Calls:              {}", report.calls.len());
    println!("Without limiter:    {} executions", report.raw_executions);
    println!(
        "With limiter:       {} executions ({} saved)",
        report.executions.len(),
        report.saved()
    );
    println!();

    println!("Timeline:");
    for call in &report.calls {
        println!(
            "  +{:>6} ms  call #{:<4} {}",
            call.at_ms,
            call.index,
            outcome_label(call.outcome)
        );
    }
    println!();

    println!("Executions:");
    for execution in &report.executions {
        println!(
            "  +{:>6} ms  args of call #{}",
            execution.at_ms, execution.call_index
        );
    }
}
