//! `optimize` command: run the optimizer over a local file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;

use crate::ingest::parse_upload;
use crate::optimizer::{BidOptimizer, BidPolicy, OptimizationConfig};
use crate::report::OptimizationReport;

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// JSON file with the targets to optimize
    pub file: PathBuf,

    /// Target ACOS in percent (e.g. 30)
    #[arg(long)]
    pub target_acos: Decimal,

    /// Raise bids on promising zero-sale targets
    #[arg(long)]
    pub increase_spend: bool,

    /// Average order value used to spot promising targets
    #[arg(long)]
    pub aov: Option<Decimal>,

    /// Where to write the report (defaults next to the input file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Optimize the file and write the report. Returns the report and its path.
pub fn optimize_file(
    args: &OptimizeArgs,
    policy: BidPolicy,
) -> anyhow::Result<(OptimizationReport, PathBuf)> {
    let optimizer = BidOptimizer::with_policy(policy)?;
    let config = OptimizationConfig::from_percent(args.target_acos, args.increase_spend)?
        .with_optional_average_order_value(args.aov)?;

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let upload = parse_upload(&bytes)?;
    let batch =
        optimizer.optimize_batch_with_aov(&upload.targets, &config, &upload.aov_by_product)?;
    let report = OptimizationReport::new(config, batch);

    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(&args.file, &report),
    };
    std::fs::write(&output, report.to_json()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        download_id = %report.download_id,
        path = %output.display(),
        "Wrote report"
    );

    Ok((report, output))
}

fn default_output(input: &Path, report: &OptimizationReport) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(report.file_name())
}

/// Run the optimize command and print a summary.
pub fn run_optimize_command(args: OptimizeArgs, policy: BidPolicy) -> anyhow::Result<()> {
    let (report, output) = optimize_file(&args, policy)?;
    let summary = &report.summary;

    println!("Optimized {} targets", summary.total_count);
    println!("  Bid updates:        {}", summary.updates_recommended_count);
    println!("  Increases:          {}", summary.increased_count);
    println!("  Decreases:          {}", summary.decreased_count);
    println!("  Promising targets:  {}", summary.promising_count);
    println!("  Average bid change: {}", summary.average_bid_change);
    println!();
    println!("Report written to {}", output.display());

    Ok(())
}
