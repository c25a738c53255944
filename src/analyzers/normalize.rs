//! Coercion of loosely-typed rows into [`RawRecord`]s.
//!
//! A row survives only when all six fields are present and well-formed.
//! Anything else is dropped without an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::analyzers::classify::surprise_pct;
use crate::analyzers::types::RawRecord;
use crate::parser::{Cell, RawRow};

// Two-digit years go first: "%Y" would otherwise read "11/07/25" as year 11.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalizes every row, silently dropping malformed ones.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<RawRecord> {
    let records: Vec<RawRecord> = rows.iter().filter_map(normalize_row).collect();
    debug!(
        rows = rows.len(),
        kept = records.len(),
        dropped = rows.len() - records.len(),
        "Rows normalized"
    );
    records
}

pub fn normalize_row(row: &RawRow) -> Option<RawRecord> {
    let ticker = text_field(&row.ticker)?;
    let company = text_field(&row.company)?;
    let sector = text_field(&row.sector)?;
    let report_date = date_field(&row.eps_actual_date)?;
    let eps_actual = numeric_field(&row.eps_actual)?;
    let eps_estimate = numeric_field(&row.eps_estimate)?;

    // Derived surprise must stay finite too, e.g. a subnormal estimate.
    if !(eps_actual - eps_estimate).is_finite()
        || !surprise_pct(eps_actual, eps_estimate).is_finite()
    {
        return None;
    }

    Some(RawRecord {
        ticker,
        company,
        sector,
        report_date,
        eps_actual,
        eps_estimate,
    })
}

/// Trimmed, non-empty text. Numbers render without a trailing `.0`.
fn text_field(cell: &Cell) -> Option<String> {
    let text = match cell {
        Cell::Empty => return None,
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => format_number(*n),
        Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn numeric_field(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Empty | Cell::Date(_) => return None,
    };
    value.is_finite().then_some(value)
}

fn date_field(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date(s),
        Cell::Empty | Cell::Number(_) => None,
    }
}

/// Parses the date layouts seen in spreadsheet exports. Timestamps keep only
/// their calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
