//! Source retrieval: HTTP(S) through an [`HttpClient`], or a local file.

mod basic;
mod cache_buster;
mod client;

pub use basic::BasicClient;
pub use cache_buster::{CACHE_BUSTER_PARAM, CacheBuster};
pub use client::HttpClient;

use tracing::debug;

use crate::error::{Result, ScorecardError};

/// Returns `true` when `source` should be fetched over HTTP rather than read
/// from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// GETs `url` and returns the body. Any transport failure or non-success
/// status is a [`ScorecardError::Fetch`].
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = url
        .parse()
        .map_err(|e| ScorecardError::fetch(format!("invalid URL '{url}': {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| ScorecardError::fetch(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ScorecardError::fetch(status.as_u16().to_string()));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ScorecardError::fetch(e.to_string()))?;
    debug!(bytes = bytes.len(), "Source body received");
    Ok(bytes.to_vec())
}

/// Loads the dataset from a URL or a local path.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    if is_remote(source) {
        fetch_bytes(client, source).await
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| ScorecardError::fetch(format!("cannot read '{source}': {e}")))
    }
}
