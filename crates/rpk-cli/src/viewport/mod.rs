//! `rpk viewport`: compute the rendered window of a fixed-size list.

use clap::{Args, ValueEnum};
use rpk_viewport::{Align, DEFAULT_OVERSCAN, FixedSizeList, VirtualItem, VisibleRange};
use serde::Serialize;

use crate::OutputFormat;

/// Arguments for the `rpk viewport` command.
#[derive(Args)]
pub struct ViewportArgs {
    /// Scroll offset of the container, in pixels.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    scroll_top: f64,

    /// Visible height of the container, in pixels.
    #[arg(long)]
    viewport_height: f64,

    /// Height of every row, in pixels.
    #[arg(long)]
    item_height: f64,

    /// Number of rows in the list.
    #[arg(long)]
    item_count: usize,

    /// Rows rendered beyond each viewport edge.
    #[arg(long, default_value_t = DEFAULT_OVERSCAN)]
    overscan: usize,

    /// Scroll so this row is in view instead of using --scroll-top.
    #[arg(long)]
    scroll_to: Option<usize>,

    /// Where the --scroll-to row should land.
    #[arg(long, default_value = "auto")]
    align: AlignArg,

    /// Include the layout of each rendered row.
    #[arg(long)]
    items: bool,

    /// Output format: json (machine-readable) or human (pretty-printed).
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlignArg {
    Start,
    Center,
    End,
    Auto,
}

impl From<AlignArg> for Align {
    fn from(value: AlignArg) -> Self {
        match value {
            AlignArg::Start => Self::Start,
            AlignArg::Center => Self::Center,
            AlignArg::End => Self::End,
            AlignArg::Auto => Self::Auto,
        }
    }
}

/// Viewport computation result.
#[derive(Debug, Clone, Serialize)]
pub struct ViewportReport {
    /// Scroll offset after clamping to the list.
    pub scroll_offset: f64,

    /// Rows to render; absent for an empty list.
    pub range: Option<VisibleRange>,

    /// Number of rows rendered.
    pub rendered: usize,

    /// Number of rows in the full list.
    pub item_count: usize,

    /// Height of the full-list spacer.
    pub total_height: f64,

    /// Layout of each rendered row, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<VirtualItem>>,
}

impl ViewportReport {
    fn from_list(list: &FixedSizeList, with_items: bool) -> Self {
        let range = list.visible_range();
        Self {
            scroll_offset: list.scroll_offset(),
            range,
            rendered: range.map_or(0, |r| r.count()),
            item_count: list.item_count(),
            total_height: list.total_height(),
            items: with_items.then(|| list.items().collect()),
        }
    }
}

/// Run the viewport command.
pub fn run(args: &ViewportArgs) -> anyhow::Result<()> {
    let report = compute(args)?;

    tracing::debug!(
        range = ?report.range,
        rendered = report.rendered,
        "Viewport computed"
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

fn compute(args: &ViewportArgs) -> anyhow::Result<ViewportReport> {
    let mut list = FixedSizeList::new(args.item_count, args.item_height, args.viewport_height)?
        .with_overscan(args.overscan);

    match args.scroll_to {
        Some(index) => {
            list.scroll_to_item(index, args.align.into());
        }
        None => {
            list.set_scroll_offset(args.scroll_top)?;
        }
    }

    Ok(ViewportReport::from_list(&list, args.items))
}

fn print_human_report(report: &ViewportReport) {
    println!("RPK Viewport Report");
    println!("===================");
    println!();
    println!("Scroll offset:  {:.1} px", report.scroll_offset);
    println!("Total height:   {:.1} px", report.total_height);
    match report.range {
        Some(range) => println!(
            "Visible range:  {range} ({} of {} rows rendered)",
            report.rendered, report.item_count
        ),
        None => println!("Visible range:  none (empty list)"),
    }

    if let Some(items) = &report.items {
        println!();
        println!("Rows:");
        for item in items {
            println!(
                "  #{:<6} top {:>10.1} px  height {:.1} px",
                item.index, item.offset, item.size
            );
        }
    }
}
