use super::{GardenProxy, ProxyReply};
use crate::domain::forecast::{
    as_list, collection_len, debug_report, filter_items_by_category, find_item_stats,
    ItemStatsNotFound,
};
use crate::upstream::UpstreamError;
use reqwest::StatusCode;
use serde_json::Value;

const SERVER_ERROR_PREFIX: &str = "Server error: ";

/// Relays the upstream status with a fixed message; connection failures become 500.
fn failure(err: UpstreamError, message: &str) -> ProxyReply {
    match err.status() {
        Some(status) => {
            tracing::error!(%status, error = %err, "{message}");
            ProxyReply::error(status, message)
        }
        None => server_error(err, ""),
    }
}

fn server_error(err: UpstreamError, prefix: &str) -> ProxyReply {
    tracing::error!(error = %err, "forecast API error");
    ProxyReply::error(StatusCode::INTERNAL_SERVER_ERROR, format!("{prefix}{err}"))
}

fn relayed(resource: &str, body: Value) -> ProxyReply {
    tracing::info!(resource, count = collection_len(&body), "fetched forecast resource");
    ProxyReply::ok(body)
}

impl GardenProxy {
    pub async fn forecast_items(&self) -> ProxyReply {
        match self.cycleon.items().await {
            Ok(body) => relayed("items", body),
            Err(err) => failure(err, "Failed to fetch items"),
        }
    }

    pub async fn forecast_weather(&self) -> ProxyReply {
        match self.cycleon.weather_types().await {
            Ok(body) => relayed("weather", body),
            Err(err) => failure(err, "Failed to fetch weather"),
        }
    }

    pub async fn all_item_stats(&self) -> ProxyReply {
        match self.cycleon.item_stats().await {
            Ok(body) => relayed("item-stats", body),
            Err(err) => failure(err, "Failed to fetch items stats"),
        }
    }

    pub async fn all_weather_stats(&self) -> ProxyReply {
        match self.cycleon.weather_stats().await {
            Ok(body) => relayed("weather-stats", body),
            Err(err) => failure(err, "Failed to fetch weather stats"),
        }
    }

    /// Any upstream status other than success is reported as 404.
    pub async fn weather_stats(&self, weather: &str) -> ProxyReply {
        tracing::info!(%weather, "fetching weather stats");
        match self.cycleon.weather_stats_for(weather).await {
            Ok(body) => ProxyReply::ok(body),
            Err(err) if err.status().is_some() => {
                tracing::error!(%weather, error = %err, "failed to fetch weather stats");
                ProxyReply::error(StatusCode::NOT_FOUND, "Weather stats not found")
            }
            Err(err) => server_error(err, ""),
        }
    }

    pub async fn item_stats(&self, item: &str) -> ProxyReply {
        tracing::info!(%item, "searching for item stats");
        let stats = match self.cycleon.item_stats().await {
            Ok(body) => body,
            Err(err) => return failure(err, "Failed to fetch item stats"),
        };

        match find_item_stats(as_list(&stats), item) {
            Some(found) => {
                tracing::info!(%item, "found item stats");
                ProxyReply::ok(found.clone())
            }
            None => {
                tracing::warn!(%item, "item not found in stats");
                ProxyReply::json(StatusCode::NOT_FOUND, &ItemStatsNotFound::new(item))
            }
        }
    }

    pub async fn items_by_category(&self, category: &str) -> ProxyReply {
        tracing::info!(%category, "getting items by category with stats");
        let items = match self.cycleon.items().await {
            Ok(body) => body,
            Err(err) if err.status().is_some() => return failure(err, "Failed to fetch items"),
            Err(err) => return server_error(err, SERVER_ERROR_PREFIX),
        };
        let stats = match self.cycleon.item_stats().await {
            Ok(body) => body,
            Err(err) if err.status().is_some() => {
                return failure(err, "Failed to fetch item stats")
            }
            Err(err) => return server_error(err, SERVER_ERROR_PREFIX),
        };

        let filtered = filter_items_by_category(as_list(&items), as_list(&stats), category);
        tracing::info!(
            %category,
            total_items = as_list(&items).len(),
            filtered_items = filtered.len(),
            "found items by category with stats"
        );
        ProxyReply::ok(Value::Array(filtered))
    }

    /// A failing stats fetch counts as no stats; a failing items fetch is reported.
    pub async fn debug_items(&self) -> ProxyReply {
        tracing::info!("checking items with stats");

        let items = match self.cycleon.items().await {
            Ok(body) => body,
            Err(err) => return failure(err, "Failed to fetch items"),
        };
        let stats = match self.cycleon.item_stats().await {
            Ok(body) => body,
            Err(err) if err.status().is_some() => {
                tracing::warn!(error = %err, "item stats unavailable; reporting without stats");
                Value::Array(Vec::new())
            }
            Err(err) => return server_error(err, ""),
        };

        let report = debug_report(as_list(&items), as_list(&stats));
        ProxyReply::json(StatusCode::OK, &report)
    }
}
