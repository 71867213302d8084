use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::models::Step;

/// Run-level metadata attached uniformly to every projected row.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub expiry_date: NaiveDate,
}

impl RunMetadata {
    pub fn new(ticker: &str, expiry_date: NaiveDate) -> Self {
        Self {
            timestamp: Utc::now(),
            ticker: ticker.to_string(),
            expiry_date,
        }
    }
}

/// Write the projected steps as headerless CSV.
/// Field order: `generation, day, tag_pattern, ret, price, timestamp, ticker, expiry_date`.
pub fn write_projection<W: Write>(writer: W, steps: &[Step], meta: &RunMetadata) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let timestamp = meta.timestamp.to_rfc3339();
    let expiry = meta.expiry_date.to_string();

    for step in steps {
        wtr.write_record(&[
            step.generation.to_string(),
            step.day.to_string(),
            step.pattern.to_string(),
            step.ret.to_string(),
            step.price.to_string(),
            timestamp.clone(),
            meta.ticker.clone(),
            expiry.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_projection_to_path(path: &Path, steps: &[Step], meta: &RunMetadata) -> Result<()> {
    let file = File::create(path)?;
    write_projection(file, steps, meta)
}

/// Order statistics of the simulated terminal-price distribution.
#[derive(Debug, Clone, Serialize)]
pub struct TerminalSummary {
    pub ticker: String,
    pub expiry_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub generations: u32,
    pub days_ahead: u32,
    pub start_price: f64,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    /// Fraction of paths finishing above the starting price.
    pub p_above_start: f64,
}

impl TerminalSummary {
    /// Summarize the terminal price of each generation. Returns `None`
    /// when the projection is empty (zero days ahead).
    pub fn from_steps(
        steps: &[Step],
        meta: &RunMetadata,
        start_price: f64,
        generations: u32,
        days_ahead: u32,
    ) -> Option<Self> {
        if steps.is_empty() || days_ahead == 0 {
            return None;
        }

        // Steps are generation-major, day-minor: the terminal price of
        // each generation is the last step of its block.
        let terminal: Vec<f64> = steps
            .chunks(days_ahead as usize)
            .map(|path| path.last().map(|s| s.price).unwrap_or(start_price))
            .collect();

        let paths = terminal.len();
        let above = terminal.iter().filter(|&&p| p > start_price).count();
        let mean = terminal.iter().mean();
        let min = terminal.iter().copied().fold(f64::INFINITY, f64::min);
        let max = terminal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut data = Data::new(terminal);

        Some(Self {
            ticker: meta.ticker.clone(),
            expiry_date: meta.expiry_date,
            generated_at: meta.timestamp,
            generations,
            days_ahead,
            start_price,
            min,
            p5: data.percentile(5),
            p25: data.percentile(25),
            median: data.median(),
            p75: data.percentile(75),
            p95: data.percentile(95),
            max,
            mean,
            p_above_start: above as f64 / paths as f64,
        })
    }
}

/// Export the terminal-price summary to JSON.
pub fn export_summary_to_json(summary: &TerminalSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Generate a human-readable summary report.
pub fn generate_report(summary: &TerminalSummary) -> String {
    let mut report = String::new();

    report.push_str("═══════════════════════════════════════════════════════════════\n");
    report.push_str(&format!(
        "  PROJECTED PRICE DISTRIBUTION — {} @ {}\n",
        summary.ticker, summary.expiry_date
    ));
    report.push_str("═══════════════════════════════════════════════════════════════\n\n");

    report.push_str(&format!(
        "  Paths: {}   Days ahead: {}   Start price: {:.2}\n\n",
        summary.generations, summary.days_ahead, summary.start_price
    ));

    report.push_str("  Terminal price distribution\n");
    report.push_str("  ─────────────────────────────────────────\n");
    report.push_str(&format!("    min     {:>12.2}\n", summary.min));
    report.push_str(&format!("    p5      {:>12.2}\n", summary.p5));
    report.push_str(&format!("    p25     {:>12.2}\n", summary.p25));
    report.push_str(&format!("    median  {:>12.2}\n", summary.median));
    report.push_str(&format!("    p75     {:>12.2}\n", summary.p75));
    report.push_str(&format!("    p95     {:>12.2}\n", summary.p95));
    report.push_str(&format!("    max     {:>12.2}\n", summary.max));
    report.push_str(&format!("    mean    {:>12.2}\n", summary.mean));
    report.push('\n');
    report.push_str(&format!(
        "  P(terminal > start): {:.1}%\n",
        summary.p_above_start * 100.0
    ));

    report
}
