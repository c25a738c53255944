use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use chrono::Utc;

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUSTER_PARAM: &str = "t";

/// An [`HttpClient`] wrapper that appends `t=<unix millis>` to every request
/// so intermediate caches always hand back the latest spreadsheet snapshot.
pub struct CacheBuster<C> {
    pub inner: C,
}

impl<C> CacheBuster<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for CacheBuster<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let stamp = Utc::now().timestamp_millis().to_string();
        req.url_mut()
            .query_pairs_mut()
            .append_pair(CACHE_BUSTER_PARAM, &stamp);
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for Recorder {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen.lock().unwrap().push(req.url().to_string());
            Ok(http::Response::new("ok").into())
        }
    }

    #[tokio::test]
    async fn test_appends_timestamp_param() {
        let client = CacheBuster::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://example.com/data.xlsx".parse().unwrap(),
        );
        client.execute(req).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("https://example.com/data.xlsx?t="));
    }

    #[tokio::test]
    async fn test_keeps_existing_query() {
        let client = CacheBuster::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://example.com/export?format=csv".parse().unwrap(),
        );
        client.execute(req).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert!(seen[0].starts_with("https://example.com/export?format=csv&t="));
    }
}
