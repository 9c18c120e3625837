//! Endpoint logic: each operation calls an upstream, reshapes the result and decides the
//! status code, so the HTTP layer only routes.

mod forecast;
mod predict;
mod shop;

use crate::config::Settings;
use crate::upstream::cycleon::CycleonClient;
use crate::upstream::gag::GagClient;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

pub const SUPPORTED_GAME: &str = "grow-a-garden";

/// Status and JSON body handed back to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ProxyReply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize reply");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GardenProxy {
    gag: GagClient,
    cycleon: CycleonClient,
}

impl GardenProxy {
    pub fn new(gag: GagClient, cycleon: CycleonClient) -> Self {
        Self { gag, cycleon }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            GagClient::from_settings(settings)?,
            CycleonClient::from_settings(settings)?,
        ))
    }

    pub fn gag(&self) -> &GagClient {
        &self.gag
    }
}
