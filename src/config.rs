//! Runtime settings for the scorecard pipeline.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file by the binary) and can be overridden on the command line.
//! [`Settings::from_lookup`] takes the lookup as a closure so tests never
//! touch the real environment.

use std::time::Duration;

use crate::analyzers::classify::DEFAULT_TOLERANCE;
use crate::error::{Result, ScorecardError};

/// URL or path of the earnings spreadsheet.
pub const DATA_URL_VAR: &str = "EARNINGS_DATA_URL";
/// Fractional in-line tolerance, e.g. `0.02`.
pub const TOLERANCE_VAR: &str = "EARNINGS_INLINE_TOLERANCE";
/// Whole seconds before a fetch is abandoned.
pub const FETCH_TIMEOUT_VAR: &str = "EARNINGS_FETCH_TIMEOUT_SECS";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source: String,
    pub tolerance: f64,
    pub fetch_timeout: Duration,
    pub connect_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            tolerance: DEFAULT_TOLERANCE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = sanitize_tolerance(tolerance);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_url: Option<String>,
    pub tolerance: f64,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_url: None,
            tolerance: DEFAULT_TOLERANCE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_url = non_blank(lookup(DATA_URL_VAR));
        let tolerance = parse_tolerance(lookup(TOLERANCE_VAR).as_deref());
        let fetch_timeout = lookup(FETCH_TIMEOUT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT);

        Self {
            data_url,
            tolerance,
            fetch_timeout,
        }
    }

    /// Applies command-line overrides on top of the environment values.
    ///
    /// A blank source is ignored; an unusable tolerance falls back to the
    /// default, the same as for environment values.
    pub fn with_overrides(mut self, source: Option<String>, tolerance: Option<&str>) -> Self {
        if let Some(source) = non_blank(source) {
            self.data_url = Some(source);
        }
        if let Some(raw) = tolerance {
            self.tolerance = parse_tolerance(Some(raw));
        }
        self
    }

    /// # Errors
    ///
    /// [`ScorecardError::Configuration`] when no source location is set.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let source = self.data_url.clone().ok_or_else(|| {
            ScorecardError::configuration(format!("{DATA_URL_VAR} is not configured."))
        })?;

        Ok(PipelineConfig::new(source)
            .with_tolerance(self.tolerance)
            .with_fetch_timeout(self.fetch_timeout))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a tolerance, falling back to the default when the value is
/// missing, unparsable, negative or not finite.
pub fn parse_tolerance(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .map(sanitize_tolerance)
        .unwrap_or(DEFAULT_TOLERANCE)
}

pub fn sanitize_tolerance(tolerance: f64) -> f64 {
    if tolerance.is_finite() && tolerance >= 0.0 {
        tolerance
    } else {
        DEFAULT_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_reads_all_values() {
        let settings = Settings::from_lookup(lookup(&[
            (DATA_URL_VAR, " https://example.com/eps.xlsx "),
            (TOLERANCE_VAR, "0.05"),
            (FETCH_TIMEOUT_VAR, "5"),
        ]));
        assert_eq!(settings.data_url.as_deref(), Some("https://example.com/eps.xlsx"));
        assert_eq!(settings.tolerance, 0.05);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_tolerance_falls_back() {
        for raw in ["abc", "", "-0.1", "NaN", "inf"] {
            let settings = Settings::from_lookup(lookup(&[(TOLERANCE_VAR, raw)]));
            assert_eq!(settings.tolerance, DEFAULT_TOLERANCE, "{raw}");
        }
        assert_eq!(parse_tolerance(Some("0")), 0.0);
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let settings = Settings::from_lookup(lookup(&[(FETCH_TIMEOUT_VAR, "0")]));
        assert_eq!(settings.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        let settings = Settings::from_lookup(lookup(&[(FETCH_TIMEOUT_VAR, "soon")]));
        assert_eq!(settings.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_missing_source_is_configuration_error() {
        let settings = Settings::from_lookup(lookup(&[(DATA_URL_VAR, "   ")]));
        let err = settings.pipeline_config().unwrap_err();
        assert!(matches!(err, ScorecardError::Configuration(_)));
        assert!(err.to_string().contains(DATA_URL_VAR));
    }

    #[test]
    fn test_overrides_win() {
        let settings = Settings::from_lookup(lookup(&[
            (DATA_URL_VAR, "env.csv"),
            (TOLERANCE_VAR, "0.05"),
        ]))
        .with_overrides(Some("cli.csv".to_string()), Some("0.1"));

        let config = settings.pipeline_config().unwrap();
        assert_eq!(config.source, "cli.csv");
        assert_eq!(config.tolerance, 0.1);
    }

    #[test]
    fn test_bad_tolerance_override_falls_back() {
        for raw in ["-1", "abc", "NaN"] {
            let settings = Settings::from_lookup(lookup(&[(TOLERANCE_VAR, "0.05")]))
                .with_overrides(Some("a.csv".to_string()), Some(raw));
            assert_eq!(settings.tolerance, DEFAULT_TOLERANCE, "{raw}");
        }
    }

    #[test]
    fn test_blank_source_override_keeps_env_value() {
        let settings = Settings::from_lookup(lookup(&[(DATA_URL_VAR, "env.csv")]))
            .with_overrides(Some("  ".to_string()), None);
        assert_eq!(settings.data_url.as_deref(), Some("env.csv"));

        let settings = Settings::default().with_overrides(Some(String::new()), None);
        let err = settings.pipeline_config().unwrap_err();
        assert!(matches!(err, ScorecardError::Configuration(_)));
    }

    #[test]
    fn test_source_override_is_trimmed() {
        let settings = Settings::default().with_overrides(Some(" cli.csv ".to_string()), None);
        assert_eq!(settings.pipeline_config().unwrap().source, "cli.csv");
    }
}
