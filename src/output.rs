//! Output formatting and export for dashboard results.
//!
//! Supports JSON rendering, a plain-text summary, and CSV export of the
//! company table.

use anyhow::Result;
use tracing::{debug, info};

use crate::analyzers::types::{Company, DashboardResult};
use csv::WriterBuilder;
use std::fs::File;

/// Logs the full result using Rust's debug pretty-print format.
pub fn print_pretty(result: &DashboardResult) {
    debug!("{:#?}", result);
}

/// Serializes the result as JSON.
pub fn to_json(result: &DashboardResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

fn signed_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

/// Headline, KPI line and one line per sector.
pub fn summary_lines(result: &DashboardResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} earnings: {} of {} companies reported ({}%)",
            result.quarter, result.reported, result.total_sp500, result.reported_pct
        ),
        format!(
            "Beat {}% ({})  In-Line {}% ({})  Miss {}% ({})  Avg. EPS surprise {}",
            result.beat_pct,
            result.beat_count,
            result.inline_pct,
            result.inline_count,
            result.miss_pct,
            result.miss_count,
            signed_pct(result.avg_surprise_pct)
        ),
    ];

    let width = result
        .sectors
        .iter()
        .map(|s| s.sector.len())
        .max()
        .unwrap_or(0);

    for s in &result.sectors {
        lines.push(format!(
            "  {:<width$}  {:>3} reported  beat {:>3}%  in-line {:>3}%  miss {:>3}%  avg {}",
            s.sector,
            s.total,
            s.beat_pct,
            s.inline_pct,
            s.miss_pct,
            signed_pct(s.avg_surprise_pct),
        ));
    }

    lines
}

/// One line per company, in the order given.
pub fn company_lines(companies: &[&Company]) -> Vec<String> {
    companies
        .iter()
        .map(|c| {
            format!(
                "{:<6} {:<32} {:<24} {}  {:>8.2} {:>8.2} {:>8}  {}",
                c.ticker,
                c.company,
                c.sector,
                c.eps_actual_date,
                c.eps_actual,
                c.eps_estimate,
                signed_pct(c.surprise_pct),
                c.verdict
            )
        })
        .collect()
}

/// Writes the company table to a CSV file, replacing any existing file.
pub fn write_companies_csv(path: &str, companies: &[&Company]) -> Result<()> {
    debug!(path, rows = companies.len(), "Writing company CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for company in companies {
        writer.serialize(company)?;
    }
    writer.flush()?;

    info!(path, rows = companies.len(), "Company table exported");
    Ok(())
}
