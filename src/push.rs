//! Push gateway client
//!
//! Sends each manager's exposition text to
//! `<url>/metrics/job/<job>/instance/<manager>`.

use reqwest::header::CONTENT_TYPE as CONTENT_TYPE_HEADER;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::config::PushgatewayConfig;
use crate::error::TransportError;
use crate::transformer::CONTENT_TYPE;

/// Push gateway HTTP client
#[derive(Clone)]
pub struct PushClient {
    client: Client,
    base_url: Url,
    job: String,
    timeout_ms: u64,
}

impl PushClient {
    /// 새 클라이언트 생성
    ///
    /// # Errors
    /// Returns `InvalidUrl` for an unparseable base URL.
    pub fn new(config: &PushgatewayConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(TransportError::HttpClientInit)?;

        Ok(Self {
            client,
            base_url,
            job: config.job.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Grouping URL for a manager
    pub fn push_url(&self, manager: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["metrics", "job", self.job.as_str(), "instance", manager]);
        Ok(url)
    }

    /// Push exposition text for one manager
    #[instrument(skip(self, body), fields(manager = %manager, bytes = body.len()))]
    pub async fn push(&self, manager: &str, body: String) -> Result<(), TransportError> {
        let url = self.push_url(manager)?;
        debug!(url = %url, "Pushing metrics");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE_HEADER, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout_ms)
                } else {
                    TransportError::HttpRequest(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        Ok(())
    }
}
