use super::{GardenProxy, ProxyReply};
use crate::domain::prediction::{
    ensure_array_fields, upstream_detail, weather_name_candidates, ItemPredictionError,
    WeatherPredictionError, ITEM_ARRAY_FIELDS, ITEM_NOT_FOUND, WEATHER_ARRAY_FIELDS,
};
use crate::upstream::UpstreamError;
use reqwest::StatusCode;

impl GardenProxy {
    pub async fn predict_item(&self, item: &str) -> ProxyReply {
        tracing::info!(%item, "item prediction");

        match self.cycleon.predict_item(item).await {
            Ok(body) => {
                tracing::info!(%item, "item prediction successful");
                ProxyReply::ok(ensure_array_fields(body, &ITEM_ARRAY_FIELDS))
            }
            Err(err) => match err.status() {
                Some(status) if status == StatusCode::NOT_FOUND => {
                    let detail =
                        upstream_detail(err.body()).unwrap_or_else(|| ITEM_NOT_FOUND.to_string());
                    tracing::warn!(%item, error = %detail, "item not found in prediction API");
                    ProxyReply::json(StatusCode::NOT_FOUND, &ItemPredictionError::new(item, detail))
                }
                Some(status) => {
                    tracing::warn!(%item, %status, "item prediction API error");
                    let message = format!("Prediction API returned status: {}", status.as_u16());
                    ProxyReply::json(status, &ItemPredictionError::new(item, message))
                }
                None => {
                    tracing::error!(%item, error = %err, "item prediction failed");
                    let message = format!("Connection failed: {err}");
                    ProxyReply::json(
                        StatusCode::SERVICE_UNAVAILABLE,
                        &ItemPredictionError::new(item, message),
                    )
                }
            },
        }
    }

    /// Tries each spelling of the weather name until the predictor accepts one.
    pub async fn predict_weather(&self, weather: &str) -> ProxyReply {
        tracing::info!(%weather, "weather prediction");
        let mut last_error: Option<String> = None;

        for candidate in weather_name_candidates(weather) {
            match self.cycleon.predict_weather(&candidate).await {
                Ok(body) => {
                    tracing::info!(%weather, format_used = %candidate, "weather prediction successful");
                    return ProxyReply::ok(ensure_array_fields(body, &WEATHER_ARRAY_FIELDS));
                }
                Err(err) => {
                    let reason = failure_reason(&err);
                    tracing::warn!(format = %candidate, error = %reason, "weather format failed");
                    last_error = Some(reason);
                }
            }
        }

        tracing::error!(%weather, "all weather formats failed");
        let message = format!(
            "Weather prediction failed: {}",
            last_error.as_deref().unwrap_or("Unknown error")
        );
        ProxyReply::json(
            StatusCode::NOT_FOUND,
            &WeatherPredictionError::new(weather, message).with_suggestion(),
        )
    }
}

fn failure_reason(err: &UpstreamError) -> String {
    match err.status() {
        Some(status) => {
            upstream_detail(err.body()).unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        }
        None => err.to_string(),
    }
}
