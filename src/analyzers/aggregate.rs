use crate::analyzers::classify::Verdict;
use crate::analyzers::quarter::Quarter;
use crate::analyzers::types::{Company, DashboardResult, SectorStats};
use crate::analyzers::utility::{mean, round_pct};
use std::collections::BTreeMap;

/// Size of the index the reported share is measured against.
pub const SP500_UNIVERSE: usize = 500;

/// Per-verdict tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VerdictCounts {
    pub beat: usize,
    pub miss: usize,
    pub inline: usize,
}

impl VerdictCounts {
    pub fn tally<'a>(companies: impl IntoIterator<Item = &'a Company>) -> Self {
        let mut counts = VerdictCounts::default();
        for c in companies {
            match c.verdict {
                Verdict::Beat => counts.beat += 1,
                Verdict::Miss => counts.miss += 1,
                Verdict::InLine => counts.inline += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.beat + self.miss + self.inline
    }
}

fn avg_surprise_pct(companies: &[&Company]) -> f64 {
    let values: Vec<f64> = companies.iter().map(|c| c.surprise_pct).collect();
    mean(&values)
}

/// Groups companies by exact sector name and computes each group's stats.
///
/// Sorted by beat rate descending; equal rates fall back to sector name
/// ascending so the order never depends on input order.
pub fn sector_breakdown(companies: &[Company]) -> Vec<SectorStats> {
    let mut groups: BTreeMap<&str, Vec<&Company>> = BTreeMap::new();
    for c in companies {
        groups.entry(c.sector.as_str()).or_default().push(c);
    }

    let mut sectors: Vec<SectorStats> = groups
        .into_iter()
        .map(|(sector, list)| {
            let counts = VerdictCounts::tally(list.iter().copied());
            let n = list.len();
            SectorStats {
                sector: sector.to_string(),
                total: n,
                beat: counts.beat,
                miss: counts.miss,
                inline: counts.inline,
                beat_pct: round_pct(counts.beat, n),
                miss_pct: round_pct(counts.miss, n),
                inline_pct: round_pct(counts.inline, n),
                avg_surprise_pct: avg_surprise_pct(&list),
            }
        })
        .collect();

    sectors.sort_by(|a, b| {
        b.beat_pct
            .cmp(&a.beat_pct)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    sectors
}

/// Builds the dashboard result for the selected quarter's companies.
///
/// The caller guarantees `companies` is non-empty; an empty slice yields
/// zeroed statistics rather than a division by zero.
pub fn aggregate(quarter: Quarter, companies: Vec<Company>) -> DashboardResult {
    let counts = VerdictCounts::tally(&companies);
    let total = companies.len();
    let all: Vec<&Company> = companies.iter().collect();

    DashboardResult {
        quarter,
        reported: total,
        total_sp500: SP500_UNIVERSE,
        reported_pct: round_pct(total, SP500_UNIVERSE),
        beat_count: counts.beat,
        miss_count: counts.miss,
        inline_count: counts.inline,
        beat_pct: round_pct(counts.beat, total),
        miss_pct: round_pct(counts.miss, total),
        inline_pct: round_pct(counts.inline, total),
        avg_surprise_pct: avg_surprise_pct(&all),
        sectors: sector_breakdown(&companies),
        companies,
        earnings_growth_pct: None,
    }
}
