use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::{FixedOffset, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use garden_core::config::Settings;
use garden_core::proxy::{GardenProxy, ProxyReply, SUPPORTED_GAME};
use garden_core::time::restock::{restock_board, ShopRestock};

#[derive(Debug, Clone)]
pub struct AppState {
    proxy: Arc<GardenProxy>,
    restock_offset: FixedOffset,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            proxy: Arc::new(GardenProxy::from_settings(settings)?),
            restock_offset: settings.restock_offset()?,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/proxy/stock", get(stock_default))
        .route("/proxy/stock/:game", get(stock))
        .route("/proxy/events", get(events_default))
        .route("/proxy/events/:game", get(events))
        .route("/proxy/forecast/items", get(forecast_items))
        .route("/proxy/forecast/weather", get(forecast_weather))
        .route("/proxy/forecast/weather-stats/:weather", get(weather_stats))
        .route("/proxy/forecast/item-stats/:item", get(item_stats))
        .route("/proxy/forecast/all-item-stats", get(all_item_stats))
        .route("/proxy/forecast/all-weather-stats", get(all_weather_stats))
        .route(
            "/proxy/forecast/items-by-category/:category",
            get(items_by_category),
        )
        .route("/proxy/forecast/debug-items", get(debug_items))
        .route("/proxy/predict/items/:item", get(predict_item))
        .route("/proxy/predict/weather/:weather", get(predict_weather))
        .route("/proxy/restock", get(restock))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn respond(reply: ProxyReply) -> Response {
    (reply.status, Json(reply.body)).into_response()
}

async fn index() -> Redirect {
    Redirect::temporary("/proxy/stock/grow-a-garden")
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stock_default(State(state): State<AppState>) -> Response {
    respond(state.proxy.stock(SUPPORTED_GAME).await)
}

async fn stock(State(state): State<AppState>, Path(game): Path<String>) -> Response {
    respond(state.proxy.stock(&game).await)
}

async fn events_default(State(state): State<AppState>) -> Response {
    respond(state.proxy.events(SUPPORTED_GAME).await)
}

async fn events(State(state): State<AppState>, Path(game): Path<String>) -> Response {
    respond(state.proxy.events(&game).await)
}

async fn forecast_items(State(state): State<AppState>) -> Response {
    respond(state.proxy.forecast_items().await)
}

async fn forecast_weather(State(state): State<AppState>) -> Response {
    respond(state.proxy.forecast_weather().await)
}

async fn weather_stats(State(state): State<AppState>, Path(weather): Path<String>) -> Response {
    respond(state.proxy.weather_stats(&weather).await)
}

async fn item_stats(State(state): State<AppState>, Path(item): Path<String>) -> Response {
    respond(state.proxy.item_stats(&item).await)
}

async fn all_item_stats(State(state): State<AppState>) -> Response {
    respond(state.proxy.all_item_stats().await)
}

async fn all_weather_stats(State(state): State<AppState>) -> Response {
    respond(state.proxy.all_weather_stats().await)
}

async fn items_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    respond(state.proxy.items_by_category(&category).await)
}

async fn debug_items(State(state): State<AppState>) -> Response {
    respond(state.proxy.debug_items().await)
}

async fn predict_item(State(state): State<AppState>, Path(item): Path<String>) -> Response {
    respond(state.proxy.predict_item(&item).await)
}

async fn predict_weather(State(state): State<AppState>, Path(weather): Path<String>) -> Response {
    respond(state.proxy.predict_weather(&weather).await)
}

async fn restock(State(state): State<AppState>) -> (StatusCode, Json<Vec<ShopRestock>>) {
    (
        StatusCode::OK,
        Json(restock_board(Utc::now(), state.restock_offset)),
    )
}
