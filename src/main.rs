//! Salespulse: sales analytics pipeline
//!
//! Loads a sales CSV, filters it, runs every analysis and prints or exports
//! the report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use salespulse::{build_report, load_sales_file, report, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run_pipeline(&args)
}

/// Run the full analytics pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let now = args.reference_time()?;
    let options = args.analysis_options(now)?;

    // Step 1: Load and validate data
    log::info!("Loading sales data from {}", args.input);
    let ingest = load_sales_file(&args.input)?;
    log::info!(
        "Loaded {} valid rows of {} ({:.2}% valid)",
        ingest.stats.valid_rows,
        ingest.stats.total_rows,
        ingest.stats.validation_rate
    );

    // Step 2: Apply filters and derive the prior period
    let filter = args.record_filter();
    let current = filter.apply(&ingest.records, now);
    let previous = filter.apply_previous(&ingest.records, now);
    log::info!(
        "Analyzing {} records ({} in prior period, range {})",
        current.len(),
        previous.len(),
        filter.date_range
    );
    if current.is_empty() {
        log::warn!("No records match the selected filters");
    }

    // Step 3: Compute analytics
    let analysis_start = Instant::now();
    let report = build_report(&current, &previous, ingest.stats.clone(), &options);
    log::debug!(
        "Analytics computed in {:.2}ms",
        analysis_start.elapsed().as_secs_f64() * 1000.0
    );

    report::print_summary(&report);

    // Step 4: Export
    if let Some(path) = &args.json {
        report::write_json(&report, path)?;
        println!("\n✓ Report saved to: {}", path);
    }
    if let Some(path) = &args.trends_csv {
        report::write_trends_csv(&report.trends, path)?;
        println!("✓ Trends saved to: {}", path);
    }

    log::info!(
        "Pipeline complete in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
