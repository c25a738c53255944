//! Filtering and ordering of the company table.
//!
//! [`DashboardResult::companies`](crate::analyzers::types::DashboardResult)
//! is left in input order; consumers pick an order here.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::analyzers::classify::Verdict;
use crate::analyzers::types::Company;

/// Column to sort the company table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Ticker,
    Company,
    Sector,
    EpsActualDate,
    EpsActual,
    EpsEstimate,
    Surprise,
    SurprisePct,
    Verdict,
}

impl SortKey {
    const ALL: [(SortKey, &'static str); 9] = [
        (SortKey::Ticker, "ticker"),
        (SortKey::Company, "company"),
        (SortKey::Sector, "sector"),
        (SortKey::EpsActualDate, "date"),
        (SortKey::EpsActual, "actual"),
        (SortKey::EpsEstimate, "estimate"),
        (SortKey::Surprise, "surprise"),
        (SortKey::SurprisePct, "surprise-pct"),
        (SortKey::Verdict, "verdict"),
    ];

    fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, name)| *name)
            .unwrap_or("surprise-pct")
    }

    fn compare(self, a: &Company, b: &Company) -> Ordering {
        match self {
            SortKey::Ticker => a.ticker.cmp(&b.ticker),
            SortKey::Company => a.company.cmp(&b.company),
            SortKey::Sector => a.sector.cmp(&b.sector),
            SortKey::EpsActualDate => a.eps_actual_date.cmp(&b.eps_actual_date),
            SortKey::EpsActual => a.eps_actual.total_cmp(&b.eps_actual),
            SortKey::EpsEstimate => a.eps_estimate.total_cmp(&b.eps_estimate),
            SortKey::Surprise => a.surprise.total_cmp(&b.surprise),
            SortKey::SurprisePct => a.surprise_pct.total_cmp(&b.surprise_pct),
            SortKey::Verdict => a.verdict.label().cmp(b.verdict.label()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(key, _)| *key)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|(_, name)| *name).collect();
                format!("unknown sort key '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Filters and ordering for the company table. The default shows every
/// company, largest surprise first.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyQuery {
    /// Exact sector name.
    pub sector: Option<String>,
    pub verdict: Option<Verdict>,
    /// Case-insensitive substring of ticker or company name.
    pub search: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl Default for CompanyQuery {
    fn default() -> Self {
        Self {
            sector: None,
            verdict: None,
            search: None,
            sort: SortKey::SurprisePct,
            direction: SortDirection::Desc,
        }
    }
}

impl CompanyQuery {
    pub fn apply<'a>(&self, companies: &'a [Company]) -> Vec<&'a Company> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut list: Vec<&Company> = companies
            .iter()
            .filter(|c| self.sector.as_deref().is_none_or(|s| c.sector == s))
            .filter(|c| self.verdict.is_none_or(|v| c.verdict == v))
            .filter(|c| {
                needle.as_deref().is_none_or(|q| {
                    c.ticker.to_lowercase().contains(q) || c.company.to_lowercase().contains(q)
                })
            })
            .collect();

        list.sort_by(|a, b| {
            let ord = self.sort.compare(a, b);
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        list
    }
}

/// Distinct sector names, sorted.
pub fn sector_names(companies: &[Company]) -> Vec<String> {
    companies
        .iter()
        .map(|c| c.sector.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::quarter::Quarter;
    use chrono::NaiveDate;

    fn company(ticker: &str, name: &str, sector: &str, verdict: Verdict, pct: f64) -> Company {
        Company {
            ticker: ticker.to_string(),
            company: name.to_string(),
            sector: sector.to_string(),
            eps_actual_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            eps_actual: 1.0 + pct / 100.0,
            eps_estimate: 1.0,
            surprise: pct / 100.0,
            surprise_pct: pct,
            verdict,
            quarter: Quarter::new(2025, 4).unwrap(),
        }
    }

    fn sample() -> Vec<Company> {
        vec![
            company("AAPL", "Apple Inc.", "Tech", Verdict::Beat, 5.0),
            company("MSFT", "Microsoft Corp.", "Tech", Verdict::InLine, 0.5),
            company("XOM", "Exxon Mobil", "Energy", Verdict::Miss, -3.0),
            company("JPM", "JPMorgan Chase", "Financials", Verdict::Beat, 10.0),
        ]
    }

    fn tickers(list: &[&Company]) -> Vec<String> {
        list.iter().map(|c| c.ticker.clone()).collect()
    }

    #[test]
    fn test_default_sorts_by_surprise_desc() {
        let companies = sample();
        let list = CompanyQuery::default().apply(&companies);
        assert_eq!(tickers(&list), vec!["JPM", "AAPL", "MSFT", "XOM"]);
    }

    #[test]
    fn test_filters_combine() {
        let companies = sample();
        let query = CompanyQuery {
            sector: Some("Tech".to_string()),
            verdict: Some(Verdict::Beat),
            ..CompanyQuery::default()
        };
        assert_eq!(tickers(&query.apply(&companies)), vec!["AAPL"]);
    }

    #[test]
    fn test_search_matches_ticker_or_name() {
        let companies = sample();
        let query = CompanyQuery {
            search: Some("  exxon ".to_string()),
            ..CompanyQuery::default()
        };
        assert_eq!(tickers(&query.apply(&companies)), vec!["XOM"]);

        let query = CompanyQuery {
            search: Some("ms".to_string()),
            ..CompanyQuery::default()
        };
        assert_eq!(tickers(&query.apply(&companies)), vec!["MSFT"]);
    }

    #[test]
    fn test_blank_search_ignored() {
        let companies = sample();
        let query = CompanyQuery {
            search: Some("   ".to_string()),
            ..CompanyQuery::default()
        };
        assert_eq!(query.apply(&companies).len(), 4);
    }

    #[test]
    fn test_sort_ascending_by_ticker() {
        let companies = sample();
        let query = CompanyQuery {
            sort: SortKey::Ticker,
            direction: SortDirection::Asc,
            ..CompanyQuery::default()
        };
        assert_eq!(tickers(&query.apply(&companies)), vec!["AAPL", "JPM", "MSFT", "XOM"]);
    }

    #[test]
    fn test_sort_by_verdict_label() {
        let companies = sample();
        let query = CompanyQuery {
            sort: SortKey::Verdict,
            direction: SortDirection::Asc,
            ..CompanyQuery::default()
        };
        // "Beat" < "In-Line" < "Miss"; stable within equal labels.
        assert_eq!(tickers(&query.apply(&companies)), vec!["AAPL", "JPM", "MSFT", "XOM"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("surprise-pct".parse::<SortKey>(), Ok(SortKey::SurprisePct));
        assert_eq!("SURPRISE_PCT".parse::<SortKey>(), Ok(SortKey::SurprisePct));
        assert_eq!("date".parse::<SortKey>(), Ok(SortKey::EpsActualDate));
        assert!("volume".parse::<SortKey>().is_err());
        assert_eq!(SortKey::EpsEstimate.to_string(), "estimate");
    }

    #[test]
    fn test_sector_names_sorted_unique() {
        assert_eq!(sector_names(&sample()), vec!["Energy", "Financials", "Tech"]);
    }
}
