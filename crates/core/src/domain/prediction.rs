use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ITEM_ARRAY_FIELDS: [&str; 3] =
    ["next_occurrences", "cycle_probabilities", "confidence_windows"];
pub const WEATHER_ARRAY_FIELDS: [&str; 3] =
    ["next_occurrences", "time_window_probabilities", "confidence_windows"];

pub const ITEM_NOT_FOUND: &str = "Item not found in prediction database";
pub const WEATHER_SUGGESTION: &str =
    r#"Try a different weather name like "sunny", "rain", or "storm""#;
const PREDICTION_MODE_ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPredictionError {
    pub item: String,
    pub prediction_mode: String,
    pub next_occurrences: Vec<Value>,
    pub cycle_probabilities: Vec<Value>,
    pub confidence_windows: Vec<Value>,
    pub error: String,
}

impl ItemPredictionError {
    pub fn new(item: &str, error: impl Into<String>) -> Self {
        Self {
            item: item.to_string(),
            prediction_mode: PREDICTION_MODE_ERROR.to_string(),
            next_occurrences: Vec::new(),
            cycle_probabilities: Vec::new(),
            confidence_windows: Vec::new(),
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPredictionError {
    pub weather: String,
    pub prediction_mode: String,
    pub next_occurrences: Vec<Value>,
    pub time_window_probabilities: Vec<Value>,
    pub confidence_windows: Vec<Value>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl WeatherPredictionError {
    pub fn new(weather: &str, error: impl Into<String>) -> Self {
        Self {
            weather: weather.to_string(),
            prediction_mode: PREDICTION_MODE_ERROR.to_string(),
            next_occurrences: Vec::new(),
            time_window_probabilities: Vec::new(),
            confidence_windows: Vec::new(),
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self) -> Self {
        self.suggestion = Some(WEATHER_SUGGESTION.to_string());
        self
    }
}

/// Makes sure the listed fields exist as arrays; missing or null fields become `[]`.
/// Non-object bodies are returned as they are.
pub fn ensure_array_fields(mut body: Value, fields: &[&str]) -> Value {
    if let Some(obj) = body.as_object_mut() {
        for field in fields {
            let slot = obj.entry(*field).or_insert(Value::Null);
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
        }
    }
    body
}

/// Name spellings tried against the weather predictor, in order and without repeats.
pub fn weather_name_candidates(weather: &str) -> Vec<String> {
    let lower = weather.to_lowercase();
    let snake = lower.replace(' ', "_");

    let mut out: Vec<String> = Vec::with_capacity(3);
    for candidate in [lower, snake, weather.to_string()] {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// The `detail` message of a prediction API error body, if any.
pub fn upstream_detail(body: Option<&Value>) -> Option<String> {
    match body?.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
