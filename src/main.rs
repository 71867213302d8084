use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clotho::calendar;
use clotho::engine::{RngSampler, RunParams, SimulationEngine};
use clotho::index::DistributionIndex;
use clotho::loader;
use clotho::output::{self, RunMetadata, TerminalSummary};
use clotho::window::{VolatilityWindow, VOLATILITY_WINDOW};

#[derive(Parser)]
#[command(name = "clotho")]
#[command(about = "Project price distributions to option expiry from tagged historical returns")]
struct Cli {
    /// Path to the tagged-returns CSV
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Ticker symbol attached to every output row
    #[arg(short = 't', long)]
    ticker: String,

    /// Expiry date (YYYY-MM-DD); defaults to the monthly option
    /// expiration two months out
    #[arg(short = 'x', long)]
    expiry: Option<NaiveDate>,

    /// Number of projections to run
    #[arg(short = 'g', long, default_value = "500")]
    generations: u32,

    /// Business days ahead to project; defaults to the business-day
    /// count between today and the expiry date
    #[arg(short = 'd', long)]
    days: Option<u32>,

    /// Directory for generated files
    #[arg(short = 'o', long, default_value = "output")]
    output_dir: PathBuf,

    /// Seed for the return sampler (omit for entropy)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let today = Utc::now().date_naive();
    let expiry = cli.expiry.unwrap_or_else(|| calendar::following_month_expiry(today));
    let days_ahead = cli
        .days
        .unwrap_or_else(|| calendar::business_days_between(today, expiry));
    if cli.generations == 0 {
        bail!("generations must be at least 1");
    }

    info!(ticker = %cli.ticker, %expiry, days_ahead, generations = cli.generations, "starting projection");

    let history = loader::load_history_from_path(&cli.file)
        .with_context(|| format!("failed to load history from {}", cli.file.display()))?;

    let index = DistributionIndex::build(&history)?;
    info!(
        patterns = index.pattern_count(),
        samples = index.sample_count(),
        width = index.pattern_width(),
        "distribution index built"
    );

    // Seed state: the last observed pattern and price, and the trailing
    // realized returns for the volatility window.
    let last = history.last().expect("history validated non-empty");
    let start_pattern = last.tag_pattern.clone();
    let start_price = last.adj_close;
    let returns: Vec<f64> = history.iter().map(|o| o.ret).collect();
    let start_window = VolatilityWindow::from_trailing(VOLATILITY_WINDOW, &returns);

    let engine = SimulationEngine::new(&index, start_pattern, start_price, start_window)?;
    let params = RunParams {
        generations: cli.generations,
        days_ahead,
    };

    let mut sampler = match cli.seed {
        Some(seed) => RngSampler::seeded(seed),
        None => RngSampler::from_entropy(),
    };
    let steps = engine.run(params, &mut sampler)?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;

    let meta = RunMetadata::new(&cli.ticker, expiry);
    let csv_path = cli
        .output_dir
        .join(format!("{}_projected_returns.csv", cli.ticker));
    output::write_projection_to_path(&csv_path, &steps, &meta)?;
    info!(path = %csv_path.display(), rows = steps.len(), "projection written");

    if let Some(summary) =
        TerminalSummary::from_steps(&steps, &meta, start_price, cli.generations, days_ahead)
    {
        let json_path = cli.output_dir.join(format!("{}_summary.json", cli.ticker));
        output::export_summary_to_json(&summary, &json_path)?;
        info!(path = %json_path.display(), "summary written");

        println!("{}", output::generate_report(&summary));
    } else {
        info!("no days to project; skipping summary");
    }

    Ok(())
}
