use crate::domain::stock::{cdn_image_url, is_truthy, value_to_string};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EVENT_DURATION_SECS: i64 = 3600;
const NO_EFFECTS: &str = "No effects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEvent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "LastSeen")]
    pub last_seen: i64,
    pub start_timestamp_unix: i64,
    pub end_timestamp_unix: i64,
    /// Relayed as the upstream sent it; only a missing or null flag becomes `false`.
    pub active: Value,
    pub duration: i64,
}

impl WeatherEvent {
    pub fn is_active(&self) -> bool {
        is_truthy(&self.active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Value>,
    #[serde(rename = "lastSeenEvents")]
    pub last_seen_events: Vec<WeatherEvent>,
    #[serde(rename = "nextEvent")]
    pub next_event: Option<Value>,
    pub timestamp: String,
}

impl EventsResponse {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            events: Vec::new(),
            last_seen_events: Vec::new(),
            next_event: None,
            timestamp: iso_timestamp(now),
        }
    }

    pub fn with_event(event: WeatherEvent, now: DateTime<Utc>) -> Self {
        Self {
            last_seen_events: vec![event],
            ..Self::empty(now)
        }
    }

    pub fn current(&self) -> Option<&WeatherEvent> {
        self.last_seen_events.first()
    }
}

/// Reshapes the aggregator's `/weather` body. Returns `None` when it carries no weather type.
pub fn weather_event_from_upstream(
    body: &Value,
    image_cdn_base_url: &str,
    now: DateTime<Utc>,
) -> Option<WeatherEvent> {
    let kind = body.get("type").filter(|v| !v.is_null()).map(value_to_string)?;

    let last_seen = unix_seconds(body.get("lastUpdated"), now);

    let description = match body.get("effects") {
        Some(Value::Array(effects)) => effects
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Null) | None => NO_EFFECTS.to_string(),
        Some(other) => value_to_string(other),
    };

    Some(WeatherEvent {
        display_name: upper_first(&kind),
        image: cdn_image_url(image_cdn_base_url, &kind.to_lowercase()),
        description,
        last_seen,
        start_timestamp_unix: last_seen,
        end_timestamp_unix: last_seen.saturating_add(EVENT_DURATION_SECS),
        active: body
            .get("active")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Bool(false)),
        duration: EVENT_DURATION_SECS,
        name: kind,
    })
}

pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn unix_seconds(value: Option<&Value>, now: DateTime<Utc>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or_else(|| now.timestamp()),
        Some(Value::String(s)) => parse_timestamp(s).unwrap_or_else(|| {
            tracing::debug!(last_updated = %s, "unparseable weather timestamp; using now");
            now.timestamp()
        }),
        _ => now.timestamp(),
    }
}

fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    if let Ok(f) = s.parse::<f64>() {
        return f.is_finite().then(|| f.trunc() as i64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const CDN: &str = "https://cdn.example/GrowAGarden";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn reshapes_weather_with_iso_timestamp() {
        let body = json!({
            "type": "rain",
            "active": true,
            "effects": ["Wet mutation", "Faster growth"],
            "lastUpdated": "2026-10-16T11:30:00Z",
        });
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 11, 30, 0).unwrap().timestamp();

        assert_eq!(event.name, "rain");
        assert_eq!(event.display_name, "Rain");
        assert_eq!(event.image, "https://cdn.example/GrowAGarden/rain");
        assert_eq!(event.description, "Wet mutation, Faster growth");
        assert_eq!(event.last_seen, start);
        assert_eq!(event.start_timestamp_unix, start);
        assert_eq!(event.end_timestamp_unix, start + 3600);
        assert_eq!(event.active, json!(true));
        assert_eq!(event.duration, 3600);
    }

    #[test]
    fn numeric_timestamps_pass_through() {
        let body = json!({"type": "Thunderstorm", "lastUpdated": 1_700_000_000});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.last_seen, 1_700_000_000);
        assert_eq!(event.image, "https://cdn.example/GrowAGarden/thunderstorm");

        let body = json!({"type": "snow", "lastUpdated": "1700000000"});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.last_seen, 1_700_000_000);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let body = json!({"type": "heat wave"});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.display_name, "Heat wave");
        assert_eq!(event.description, "No effects");
        assert_eq!(event.last_seen, now().timestamp());
        assert_eq!(event.active, json!(false));
        assert!(!event.is_active());
    }

    #[test]
    fn out_of_range_timestamps_do_not_overflow() {
        let body = json!({"type": "rain", "lastUpdated": i64::MAX});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.last_seen, i64::MAX);
        assert_eq!(event.end_timestamp_unix, i64::MAX);

        let body = json!({"type": "rain", "lastUpdated": 1e300});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.end_timestamp_unix, i64::MAX);
    }

    #[test]
    fn non_boolean_active_flag_is_relayed() {
        let body = json!({"type": "rain", "active": 1});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert_eq!(event.active, json!(1));
        assert!(event.is_active());

        let body = json!({"type": "rain", "active": "0"});
        let event = weather_event_from_upstream(&body, CDN, now()).unwrap();
        assert!(!event.is_active());
    }

    #[test]
    fn body_without_type_is_not_an_event() {
        assert!(weather_event_from_upstream(&json!({"active": true}), CDN, now()).is_none());
        assert!(weather_event_from_upstream(&json!({"type": null}), CDN, now()).is_none());
    }

    #[test]
    fn empty_response_serializes_null_next_event() {
        let v = serde_json::to_value(EventsResponse::empty(now())).unwrap();
        assert_eq!(
            v,
            json!({
                "events": [],
                "lastSeenEvents": [],
                "nextEvent": null,
                "timestamp": "2026-10-16T12:00:00.000000Z",
            })
        );
    }
}
