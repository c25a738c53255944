//! End-to-end orchestration: fetch → parse → normalize → resolve quarter →
//! classify → aggregate.
//!
//! Only the fetch suspends. Dropping the returned future cancels the request
//! and leaves nothing behind.

use tracing::{debug, info};

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::normalize::normalize_rows;
use crate::analyzers::quarter::resolve_quarter;
use crate::analyzers::types::{Company, DashboardResult};
use crate::config::{PipelineConfig, sanitize_tolerance};
use crate::error::{Result, ScorecardError};
use crate::fetch::{BasicClient, CacheBuster, HttpClient, load_source};
use crate::parser::{RawRow, parse_table};

/// Runs the pipeline with a cache-busting HTTP client honouring the
/// configured timeouts.
pub async fn run(config: &PipelineConfig) -> Result<DashboardResult> {
    let client = BasicClient::with_timeouts(config.fetch_timeout, config.connect_timeout)
        .map_err(|e| ScorecardError::fetch(format!("cannot build HTTP client: {e}")))?;
    run_with_client(&CacheBuster::new(client), config).await
}

/// Runs the pipeline using `client` for remote sources.
#[tracing::instrument(skip(client, config), fields(source = %config.source, tolerance = config.tolerance))]
pub async fn run_with_client<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
) -> Result<DashboardResult> {
    let bytes = load_source(client, &config.source).await?;
    let result = process_bytes(&bytes, config.tolerance)?;

    info!(
        quarter = %result.quarter,
        reported = result.reported,
        beat_pct = result.beat_pct,
        sectors = result.sectors.len(),
        "Dashboard computed"
    );
    Ok(result)
}

/// Everything after the fetch. Pure apart from logging.
pub fn process_bytes(bytes: &[u8], tolerance: f64) -> Result<DashboardResult> {
    let rows = parse_table(bytes)?;
    process_rows(&rows, tolerance)
}

/// # Errors
///
/// [`ScorecardError::EmptyDataset`] when no row survives normalization.
pub fn process_rows(rows: &[RawRow], tolerance: f64) -> Result<DashboardResult> {
    let tolerance = sanitize_tolerance(tolerance);
    let records = normalize_rows(rows);

    let selection = resolve_quarter(records).ok_or(ScorecardError::EmptyDataset)?;
    debug!(
        quarter = %selection.quarter,
        records = selection.records.len(),
        "Reporting quarter selected"
    );

    let quarter = selection.quarter;
    let companies: Vec<Company> = selection
        .records
        .into_iter()
        .map(|record| Company::from_record(record, quarter, tolerance))
        .collect();

    Ok(aggregate(quarter, companies))
}
