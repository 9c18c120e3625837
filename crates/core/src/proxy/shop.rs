use super::{GardenProxy, ProxyReply, SUPPORTED_GAME};
use crate::domain::weather::EventsResponse;
use crate::upstream::gag::StockSource;
use chrono::Utc;
use reqwest::StatusCode;

impl GardenProxy {
    pub async fn stock(&self, game: &str) -> ProxyReply {
        if game != SUPPORTED_GAME {
            return ProxyReply::error(StatusCode::NOT_FOUND, "Game not supported");
        }
        let stock = self.gag.fetch_stock().await;
        ProxyReply::json(StatusCode::OK, &stock)
    }

    /// Unknown games get the empty shape rather than an error.
    pub async fn events(&self, game: &str) -> ProxyReply {
        let events = if game == SUPPORTED_GAME {
            self.gag.fetch_weather().await
        } else {
            EventsResponse::empty(Utc::now())
        };
        ProxyReply::json(StatusCode::OK, &events)
    }
}
