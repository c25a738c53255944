use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional in-line band used when none (or an invalid one) is configured.
pub const DEFAULT_TOLERANCE: f64 = 0.02;

/// Outcome of comparing reported EPS against the consensus estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Beat,
    Miss,
    #[serde(rename = "In-Line")]
    InLine,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Beat => "Beat",
            Verdict::Miss => "Miss",
            Verdict::InLine => "In-Line",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beat" => Ok(Verdict::Beat),
            "miss" => Ok(Verdict::Miss),
            "in-line" | "inline" | "in_line" => Ok(Verdict::InLine),
            other => Err(format!("unknown verdict '{other}' (expected beat, miss or in-line)")),
        }
    }
}

/// Classifies an EPS result against its estimate.
///
/// | Condition                         | Verdict |
/// |-----------------------------------|---------|
/// | estimate = 0, actual > 0          | Beat    |
/// | estimate = 0, actual < 0          | Miss    |
/// | estimate = 0, actual = 0          | In-Line |
/// | (actual − estimate)/\|estimate\| > tol  | Beat    |
/// | (actual − estimate)/\|estimate\| < −tol | Miss    |
/// | otherwise                         | In-Line |
///
/// `tolerance` is expected to be finite and non-negative; the pipeline
/// config enforces that before calling.
pub fn classify(actual: f64, estimate: f64, tolerance: f64) -> Verdict {
    if estimate == 0.0 {
        return match actual {
            a if a > 0.0 => Verdict::Beat,
            a if a < 0.0 => Verdict::Miss,
            _ => Verdict::InLine,
        };
    }

    match (actual - estimate) / estimate.abs() {
        d if d > tolerance => Verdict::Beat,
        d if d < -tolerance => Verdict::Miss,
        _ => Verdict::InLine,
    }
}

/// Relative surprise in percent; zero when the estimate is zero.
pub fn surprise_pct(actual: f64, estimate: f64) -> f64 {
    if estimate == 0.0 {
        0.0
    } else {
        (actual - estimate) / estimate.abs() * 100.0
    }
}
