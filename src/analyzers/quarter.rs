//! Calendar-quarter labels and selection of the reporting quarter.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analyzers::types::RawRecord;

/// A calendar quarter, ordered chronologically.
///
/// Serialized as its label, e.g. `"Q4 2025"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    number: u8,
}

impl Quarter {
    /// Returns `None` unless `number` is in 1..=4.
    pub fn new(year: i32, number: u8) -> Option<Self> {
        (1..=4).contains(&number).then_some(Self { year, number })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            number: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn number(&self) -> u8 {
        self.number
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.number, self.year)
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid quarter label '{s}'");
        let (q, year) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let number = q
            .strip_prefix('Q')
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(invalid)?;
        let year = year.trim().parse::<i32>().map_err(|_| invalid())?;
        Quarter::new(year, number).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Quarter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

/// Records belonging to the selected reporting quarter.
#[derive(Debug, Clone)]
pub struct QuarterSelection {
    pub quarter: Quarter,
    pub records: Vec<RawRecord>,
}

/// Number of records per quarter, in chronological order.
pub fn quarter_counts(records: &[RawRecord]) -> BTreeMap<Quarter, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(Quarter::from_date(record.report_date)).or_insert(0) += 1;
    }
    counts
}

/// Selects the quarter with the most records and keeps only its records,
/// preserving input order.
///
/// When several quarters share the highest count, the chronologically
/// latest one wins. Returns `None` for empty input.
pub fn resolve_quarter(records: Vec<RawRecord>) -> Option<QuarterSelection> {
    let (quarter, _) = quarter_counts(&records)
        .into_iter()
        .max_by_key(|&(quarter, count)| (count, quarter))?;

    let records = records
        .into_iter()
        .filter(|r| Quarter::from_date(r.report_date) == quarter)
        .collect();

    Some(QuarterSelection { quarter, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, y: i32, m: u32, d: u32) -> RawRecord {
        RawRecord {
            ticker: ticker.to_string(),
            company: format!("{ticker} Inc."),
            sector: "Industrials".to_string(),
            report_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            eps_actual: 1.0,
            eps_estimate: 1.0,
        }
    }

    fn q(year: i32, number: u8) -> Quarter {
        Quarter::new(year, number).unwrap()
    }

    #[test]
    fn test_quarter_boundaries() {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        assert_eq!(Quarter::from_date(date(1, 1)), q(2025, 1));
        assert_eq!(Quarter::from_date(date(3, 31)), q(2025, 1));
        assert_eq!(Quarter::from_date(date(4, 1)), q(2025, 2));
        assert_eq!(Quarter::from_date(date(9, 30)), q(2025, 3));
        assert_eq!(Quarter::from_date(date(10, 1)), q(2025, 4));
        assert_eq!(Quarter::from_date(date(12, 31)), q(2025, 4));
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(q(2025, 4).to_string(), "Q4 2025");
        assert_eq!("Q4 2025".parse::<Quarter>(), Ok(q(2025, 4)));
        assert!("Q5 2025".parse::<Quarter>().is_err());
        assert!("Q0 2025".parse::<Quarter>().is_err());
        assert!("2025 Q4".parse::<Quarter>().is_err());
        assert!("Q4".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_serde_as_label() {
        assert_eq!(serde_json::to_string(&q(2024, 1)).unwrap(), "\"Q1 2024\"");
        let parsed: Quarter = serde_json::from_str("\"Q3 2025\"").unwrap();
        assert_eq!(parsed, q(2025, 3));
        assert!(serde_json::from_str::<Quarter>("\"Q9 2025\"").is_err());
    }

    #[test]
    fn test_chronological_order() {
        assert!(q(2024, 4) < q(2025, 1));
        assert!(q(2025, 1) < q(2025, 2));
    }

    #[test]
    fn test_selects_quarter_with_most_records() {
        let mut records = vec![
            record("A", 2025, 7, 10),
            record("B", 2025, 8, 1),
            record("C", 2025, 9, 30),
        ];
        for (i, day) in [1, 5, 9, 14, 20].into_iter().enumerate() {
            records.push(record(&format!("Q4_{i}"), 2025, 11, day));
        }

        let selection = resolve_quarter(records).unwrap();
        assert_eq!(selection.quarter, q(2025, 4));
        assert_eq!(selection.records.len(), 5);
        assert!(selection
            .records
            .iter()
            .all(|r| Quarter::from_date(r.report_date) == q(2025, 4)));
    }

    #[test]
    fn test_preserves_input_order() {
        let records = vec![
            record("Z", 2025, 10, 30),
            record("OLD", 2025, 1, 30),
            record("A", 2025, 10, 2),
            record("M", 2025, 12, 1),
        ];
        let selection = resolve_quarter(records).unwrap();
        let tickers: Vec<_> = selection.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_tie_goes_to_latest_quarter() {
        let records = vec![
            record("LATE1", 2025, 11, 1),
            record("EARLY1", 2025, 2, 1),
            record("LATE2", 2025, 11, 2),
            record("EARLY2", 2025, 2, 2),
        ];
        let selection = resolve_quarter(records.clone()).unwrap();
        assert_eq!(selection.quarter, q(2025, 4));

        // Input order does not influence the tie-break.
        let mut reversed = records;
        reversed.reverse();
        assert_eq!(resolve_quarter(reversed).unwrap().quarter, q(2025, 4));
    }

    #[test]
    fn test_tie_across_years() {
        let records = vec![record("A", 2025, 1, 15), record("B", 2024, 12, 15)];
        assert_eq!(resolve_quarter(records).unwrap().quarter, q(2025, 1));
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_quarter(Vec::new()).is_none());
    }
}
