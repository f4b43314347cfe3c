//! HTTP price source
//!
//! `GET {base_url}/{platform}/{candidate_id}` answering `{"price": <int|null>}`.
//! A 404 means the id is not listed.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::PriceSourceConfig;
use crate::error::{Result, SolverError};
use crate::pricing::PriceSource;

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    price: Option<u64>,
}

#[derive(Clone)]
pub struct HttpPriceSource {
    http: Client,
    base_url: Url,
    platform: String,
}

impl HttpPriceSource {
    pub fn new(base_url: &str, platform: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(SolverError::Internal(format!(
                "price source url cannot be a base: {}",
                base_url
            )));
        }

        let http = Client::builder()
            .user_agent("sbc-solver/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::Internal(format!("failed to build price HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            platform: platform.to_string(),
        })
    }

    pub fn from_config(config: &PriceSourceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.platform,
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn price_url(&self, candidate_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SolverError::Internal("price source url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.platform)
            .push(candidate_id);
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_price(&self, candidate_id: &str) -> Result<Option<u64>> {
        let url = self.price_url(candidate_id)?;
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SolverError::PriceSourceUnavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SolverError::PriceSourceUnavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        let body: PriceResponse = resp.json().await?;
        Ok(body.price)
    }
}
