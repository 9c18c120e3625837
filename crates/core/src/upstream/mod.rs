pub mod cycleon;
pub mod gag;

use anyhow::Context;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: Url,
        status: StatusCode,
        body: Option<Value>,
    },

    #[error("{url} returned a body that is not JSON: {detail}")]
    InvalidJson { url: Url, detail: String },
}

impl UpstreamError {
    /// HTTP status of the upstream reply, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            UpstreamError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

/// GET-only JSON client bound to one upstream host.
#[derive(Debug, Clone)]
pub struct JsonUpstream {
    http: reqwest::Client,
    base_url: Url,
}

impl JsonUpstream {
    pub fn new(base_url: &str, http: reqwest::Client) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid upstream base url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "upstream base url cannot carry a path: {base_url}"
        );
        Ok(Self { http, base_url })
    }

    /// Base url with `segments` appended, each percent-encoded as a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json(
        &self,
        segments: &[&str],
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, ?timeout, "upstream GET");

        let res = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|source| UpstreamError::Transport {
            url: url.clone(),
            source,
        })?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url,
                status,
                body: parsed.ok(),
            });
        }

        parsed.map_err(|e| UpstreamError::InvalidJson {
            url,
            detail: e.to_string(),
        })
    }
}
