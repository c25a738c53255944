//! Data types produced by the scorecard pipeline.
//!
//! Field names serialize in camelCase so the JSON matches what the dashboard
//! front-end consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzers::classify::{Verdict, classify, surprise_pct};
use crate::analyzers::quarter::Quarter;

/// A spreadsheet row that passed normalization. All six fields are present
/// and well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub report_date: NaiveDate,
    pub eps_actual: f64,
    pub eps_estimate: f64,
}

/// A classified company result within the selected quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub eps_actual_date: NaiveDate,
    pub eps_actual: f64,
    pub eps_estimate: f64,
    /// actual − estimate
    pub surprise: f64,
    /// surprise / |estimate| × 100, or 0 when the estimate is 0.
    pub surprise_pct: f64,
    pub verdict: Verdict,
    pub quarter: Quarter,
}

impl Company {
    pub fn from_record(record: RawRecord, quarter: Quarter, tolerance: f64) -> Self {
        let RawRecord {
            ticker,
            company,
            sector,
            report_date,
            eps_actual,
            eps_estimate,
        } = record;

        Company {
            ticker,
            company,
            sector,
            eps_actual_date: report_date,
            eps_actual,
            eps_estimate,
            surprise: eps_actual - eps_estimate,
            surprise_pct: surprise_pct(eps_actual, eps_estimate),
            verdict: classify(eps_actual, eps_estimate, tolerance),
            quarter,
        }
    }
}

/// Verdict breakdown for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorStats {
    pub sector: String,
    pub total: usize,
    pub beat: usize,
    pub miss: usize,
    pub inline: usize,
    pub beat_pct: u32,
    pub miss_pct: u32,
    pub inline_pct: u32,
    pub avg_surprise_pct: f64,
}

/// Aggregate result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    pub quarter: Quarter,
    pub reported: usize,
    #[serde(rename = "totalSP500")]
    pub total_sp500: usize,
    pub reported_pct: u32,
    pub beat_count: usize,
    pub miss_count: usize,
    pub inline_count: usize,
    pub beat_pct: u32,
    pub miss_pct: u32,
    pub inline_pct: u32,
    pub avg_surprise_pct: f64,
    /// Sorted by beat rate descending, then sector name.
    pub sectors: Vec<SectorStats>,
    /// Input order; consumers impose their own ordering.
    pub companies: Vec<Company>,
    /// Year-over-year growth needs a prior-period baseline the source does
    /// not carry, so this is always `None`.
    pub earnings_growth_pct: Option<f64>,
}
