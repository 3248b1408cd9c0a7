//! Plain HTTP page fetching.
//!
//! [`FetchText`] is the seam the crawler and the pipeline depend on;
//! [`HttpFetcher`] is the reqwest-backed implementation used at runtime.

use crate::error::{Result, ScrapeError};
use crate::utils::truncate_for_log;
use reqwest::{Client, header};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Fetch a page body as text.
pub trait FetchText {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// GET with a fixed User-Agent.
///
/// The body is returned whatever the status code; a non-success status is
/// only logged. Transport failures surface as [`ScrapeError::Network`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScrapeError::network("<client builder>", e))?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

impl FetchText for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "Non-success status; parsing body anyway");
        }
        let body = resp.text().await.map_err(|e| ScrapeError::network(url, e))?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            preview = %truncate_for_log(&body, 120),
            "Fetched page"
        );
        Ok(body)
    }
}
