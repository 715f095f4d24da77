use std::time::{Duration, Instant};

use anyhow::Context;
use aspexis_shared::{Endpoint, FetchError, QueryKey, RawResponse, TransportResult};
use reqwest::Url;
use tracing::{debug, warn};

use crate::config;

/// Backend client that turns a [`QueryKey`] into one GET request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid API URL {base_url:?}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("API URL {base_url:?} cannot carry a path");
        }
        let client = reqwest::Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(
            &config::api_url(),
            config::upstream_http_timeout(),
            config::upstream_connect_timeout(),
        )
    }

    pub fn url_for(&self, key: &QueryKey) -> Result<Url, FetchError> {
        key.validate()?;
        Ok(endpoint_url(&self.base, &Endpoint::for_key(key)))
    }

    /// Any HTTP status is a response; only connection and body failures are `Err`.
    pub async fn fetch(&self, key: &QueryKey) -> TransportResult {
        let url = self.url_for(key)?;
        let started = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(kind = key.kind(), error = %e, "backend request failed");
                return Err(FetchError::Transport(e.to_string()));
            }
        };
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(kind = key.kind(), status, error = %e, "failed to read backend body");
            FetchError::Transport(e.to_string())
        })?;
        debug!(
            kind = key.kind(),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend response"
        );
        Ok(RawResponse { status, body })
    }
}

fn endpoint_url(base: &Url, endpoint: &Endpoint) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(&endpoint.segments);
    }
    if !endpoint.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &endpoint.query {
            pairs.append_pair(name, value);
        }
    }
    url
}
