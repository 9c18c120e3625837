use crate::config::Settings;
use crate::domain::stock::{transform_items, RawShopStock, Shop, StockItem, StockResponse};
use crate::domain::weather::{weather_event_from_upstream, EventsResponse};
use crate::upstream::JsonUpstream;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

const ALLDATA_TIMEOUT: Duration = Duration::from_secs(30);
const SHOP_TIMEOUT: Duration = Duration::from_secs(10);
const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Live shop stock and weather, as the dashboard consumes them.
#[async_trait::async_trait]
pub trait StockSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_stock(&self) -> StockResponse;

    async fn fetch_shop(&self, shop: Shop) -> Result<Vec<StockItem>>;

    async fn fetch_weather(&self) -> EventsResponse;
}

/// Client for the stock/weather aggregator.
#[derive(Debug, Clone)]
pub struct GagClient {
    upstream: JsonUpstream,
    image_cdn_base_url: String,
}

impl GagClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build stock aggregator http client")?;

        Ok(Self {
            upstream: JsonUpstream::new(&settings.gag_base_url, http)?,
            image_cdn_base_url: settings.image_cdn_base_url.clone(),
        })
    }

    pub fn image_cdn_base_url(&self) -> &str {
        &self.image_cdn_base_url
    }

    async fn fetch_stock_individually(&self) -> StockResponse {
        let (seeds, gear, honey, eggs, cosmetics) = tokio::join!(
            self.fetch_raw_shop(Shop::Seed),
            self.fetch_raw_shop(Shop::Gear),
            self.fetch_raw_shop(Shop::Event),
            self.fetch_raw_shop(Shop::Egg),
            self.fetch_raw_shop(Shop::Cosmetic),
        );

        let raw = RawShopStock {
            seeds,
            gear,
            eggs,
            cosmetics,
            honey,
        };
        StockResponse::from_raw(raw, &self.image_cdn_base_url)
    }

    /// One shop's raw array. Failures degrade to an empty list for that shop only.
    async fn fetch_raw_shop(&self, shop: Shop) -> Vec<Value> {
        match self.upstream.get_json(&[shop.source_key()], SHOP_TIMEOUT).await {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(shop = %shop, "shop endpoint returned a non-array body");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(shop = %shop, error = %err, "failed to fetch shop");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl StockSource for GagClient {
    fn source_name(&self) -> &'static str {
        "gagapi"
    }

    /// Tries `/alldata` first and falls back to the per-shop endpoints.
    async fn fetch_stock(&self) -> StockResponse {
        tracing::info!("fetching all shop stock");

        match self.upstream.get_json(&["alldata"], ALLDATA_TIMEOUT).await {
            Ok(body) if body.is_object() => {
                return StockResponse::from_raw(
                    RawShopStock::from_alldata(&body),
                    &self.image_cdn_base_url,
                );
            }
            Ok(_) => {
                tracing::warn!("alldata returned a non-object body; trying individual endpoints")
            }
            Err(err) => {
                tracing::warn!(error = %err, "alldata fetch failed; trying individual endpoints")
            }
        }

        self.fetch_stock_individually().await
    }

    async fn fetch_shop(&self, shop: Shop) -> Result<Vec<StockItem>> {
        let body = self
            .upstream
            .get_json(&[shop.source_key()], SHOP_TIMEOUT)
            .await
            .with_context(|| format!("failed to fetch {}", shop.display_name()))?;
        let items = body
            .as_array()
            .with_context(|| format!("{} response is not a list", shop.display_name()))?;
        Ok(transform_items(items, &self.image_cdn_base_url))
    }

    async fn fetch_weather(&self) -> EventsResponse {
        tracing::info!("fetching weather");
        let now = Utc::now();

        match self.upstream.get_json(&["weather"], WEATHER_TIMEOUT).await {
            Ok(body) => match weather_event_from_upstream(&body, &self.image_cdn_base_url, now) {
                Some(event) => {
                    tracing::info!(weather = %event.name, active = event.is_active(), "weather data received");
                    return EventsResponse::with_event(event, now);
                }
                None => tracing::warn!("weather API returned no weather type"),
            },
            Err(err) => tracing::error!(error = %err, "weather API failed"),
        }

        EventsResponse::empty(now)
    }
}
