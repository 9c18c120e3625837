use crate::config::Settings;
use crate::upstream::{JsonUpstream, UpstreamError};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const STATS_TIMEOUT: Duration = Duration::from_secs(30);
const ITEM_PREDICT_TIMEOUT: Duration = Duration::from_secs(30);
const ITEM_PREDICT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WEATHER_PREDICT_TIMEOUT: Duration = Duration::from_secs(15);
const WEATHER_PREDICT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the statistics and prediction service. Responses are relayed, never computed here.
#[derive(Debug, Clone)]
pub struct CycleonClient {
    upstream: JsonUpstream,
    weather_predict: JsonUpstream,
}

impl CycleonClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = &settings.cycleon_base_url;
        let insecure = settings.cycleon_accept_invalid_certs;
        if insecure {
            tracing::warn!(%base_url, "TLS certificate verification disabled for prediction API");
        }

        let http = build_client(ITEM_PREDICT_CONNECT_TIMEOUT, insecure)?;
        let weather_http = build_client(WEATHER_PREDICT_CONNECT_TIMEOUT, insecure)?;

        Ok(Self {
            upstream: JsonUpstream::new(base_url, http)?,
            weather_predict: JsonUpstream::new(base_url, weather_http)?,
        })
    }

    pub async fn items(&self) -> Result<Value, UpstreamError> {
        self.upstream.get_json(&["items"], STATS_TIMEOUT).await
    }

    pub async fn weather_types(&self) -> Result<Value, UpstreamError> {
        self.upstream.get_json(&["weather"], STATS_TIMEOUT).await
    }

    pub async fn item_stats(&self) -> Result<Value, UpstreamError> {
        self.upstream.get_json(&["item-stats"], STATS_TIMEOUT).await
    }

    pub async fn weather_stats(&self) -> Result<Value, UpstreamError> {
        self.upstream.get_json(&["weather-stats"], STATS_TIMEOUT).await
    }

    pub async fn weather_stats_for(&self, weather: &str) -> Result<Value, UpstreamError> {
        self.upstream
            .get_json(&["weather-stats", weather], STATS_TIMEOUT)
            .await
    }

    pub async fn predict_item(&self, item: &str) -> Result<Value, UpstreamError> {
        self.upstream
            .get_json(&["predict", "items", item], ITEM_PREDICT_TIMEOUT)
            .await
    }

    pub async fn predict_weather(&self, weather: &str) -> Result<Value, UpstreamError> {
        self.weather_predict
            .get_json(&["predict", "weather", weather], WEATHER_PREDICT_TIMEOUT)
            .await
    }
}

fn build_client(connect_timeout: Duration, accept_invalid_certs: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .context("failed to build prediction API http client")
}
