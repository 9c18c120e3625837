use garden_core::config::Settings;
use garden_core::domain::stock::Shop;
use garden_core::proxy::GardenProxy;
use garden_core::upstream::gag::{GagClient, StockSource};
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::json;

const CDN: &str = "https://cdn.test/GrowAGarden/";

struct Upstreams {
    gag: MockServer,
    cycleon: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            gag: MockServer::start_async().await,
            cycleon: MockServer::start_async().await,
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            gag_base_url: self.gag.base_url(),
            cycleon_base_url: self.cycleon.base_url(),
            image_cdn_base_url: CDN.to_string(),
            ..Settings::default()
        }
    }

    fn proxy(&self) -> GardenProxy {
        GardenProxy::from_settings(&self.settings()).unwrap()
    }
}

fn unreachable_settings() -> Settings {
    Settings {
        gag_base_url: "http://127.0.0.1:1".to_string(),
        cycleon_base_url: "http://127.0.0.1:1".to_string(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn stock_comes_from_alldata_when_available() {
    let up = Upstreams::start().await;
    let alldata = up
        .gag
        .mock_async(|when, then| {
            when.method(GET).path("/alldata");
            then.status(200).json_body(json!({
                "seeds": [{"name": "Carrot", "quantity": 14}],
                "gear": [{"name": "Watering Can", "quantity": 2}],
                "eggs": [],
                "cosmetics": [{"name": "Orange Umbrella", "quantity": 1}],
                "honey": [{"name": "Flower Seed Pack", "quantity": "3"}],
            }));
        })
        .await;
    let seeds = up
        .gag
        .mock_async(|when, then| {
            when.method(GET).path("/seeds");
            then.status(200).json_body(json!([]));
        })
        .await;

    let reply = up.proxy().stock("grow-a-garden").await;

    alldata.assert_async().await;
    assert_eq!(seeds.hits_async().await, 0);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body["seed_stock"],
        json!([{
            "name": "Carrot",
            "Stock": 14,
            "quantity": 14,
            "image": "https://cdn.test/GrowAGarden/carrot",
        }])
    );
    assert_eq!(reply.body["event_shop_stock"][0]["Stock"], 3);
    assert_eq!(reply.body["raw_honey"][0]["quantity"], "3");
    assert_eq!(reply.body["egg_stock"], json!([]));
}

#[tokio::test]
async fn stock_falls_back_to_individual_shops() {
    let up = Upstreams::start().await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/alldata");
            then.status(502);
        })
        .await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/seeds");
            then.status(200)
                .json_body(json!([{"Name": "Tomato", "Stock": 4, "image": "https://img/t.png"}]));
        })
        .await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/gear");
            then.status(503);
        })
        .await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/honey");
            then.status(200).json_body(json!([{"title": "Honey Sprinkler"}]));
        })
        .await;
    for path in ["/eggs", "/cosmetics"] {
        up.gag
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).json_body(json!([]));
            })
            .await;
    }

    let reply = up.proxy().stock("grow-a-garden").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["seed_stock"][0]["name"], "Tomato");
    assert_eq!(reply.body["seed_stock"][0]["image"], "https://img/t.png");
    assert_eq!(reply.body["gear_stock"], json!([]));
    assert_eq!(reply.body["raw_gear"], json!([]));
    assert_eq!(reply.body["event_shop_stock"][0]["name"], "Honey Sprinkler");
    assert_eq!(reply.body["event_shop_stock"][0]["Stock"], 0);
}

#[tokio::test]
async fn stock_for_unknown_game_is_404() {
    let up = Upstreams::start().await;
    let reply = up.proxy().stock("adopt-me").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({"error": "Game not supported"}));
}

#[tokio::test]
async fn stock_is_empty_when_every_upstream_is_down() {
    let proxy = GardenProxy::from_settings(&unreachable_settings()).unwrap();
    let reply = proxy.stock("grow-a-garden").await;
    assert_eq!(reply.status, StatusCode::OK);
    for key in ["seed_stock", "gear_stock", "egg_stock", "cosmetic_stock", "event_shop_stock"] {
        assert_eq!(reply.body[key], json!([]), "{key}");
    }
}

#[tokio::test]
async fn single_shop_fetch_reports_failures() {
    let up = Upstreams::start().await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/eggs");
            then.status(500);
        })
        .await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/cosmetics");
            then.status(200).json_body(json!([{"name": "Red Tractor", "stock": 1}]));
        })
        .await;

    let gag = GagClient::from_settings(&up.settings()).unwrap();
    assert!(gag.fetch_shop(Shop::Egg).await.is_err());
    let items = gag.fetch_shop(Shop::Cosmetic).await.unwrap();
    assert_eq!(items[0].name, "Red Tractor");
    assert_eq!(items[0].image, "https://cdn.test/GrowAGarden/red_tractor");
}

#[tokio::test]
async fn events_wrap_the_current_weather() {
    let up = Upstreams::start().await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/weather");
            then.status(200).json_body(json!({
                "type": "frost",
                "active": true,
                "effects": ["Chilled"],
                "lastUpdated": 1_760_000_000,
            }));
        })
        .await;

    let reply = up.proxy().events("grow-a-garden").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["events"], json!([]));
    assert_eq!(reply.body["nextEvent"], json!(null));
    let event = &reply.body["lastSeenEvents"][0];
    assert_eq!(event["Name"], "frost");
    assert_eq!(event["DisplayName"], "Frost");
    assert_eq!(event["Description"], "Chilled");
    assert_eq!(event["end_timestamp_unix"], 1_760_003_600);
    assert_eq!(event["active"], true);
}

#[tokio::test]
async fn events_are_empty_when_weather_fails() {
    let up = Upstreams::start().await;
    up.gag
        .mock_async(|when, then| {
            when.method(GET).path("/weather");
            then.status(500).body("oops");
        })
        .await;

    let reply = up.proxy().events("grow-a-garden").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["lastSeenEvents"], json!([]));
    assert!(reply.body["timestamp"].is_string());
}

#[tokio::test]
async fn events_for_other_games_skip_the_upstream() {
    let up = Upstreams::start().await;
    let weather = up
        .gag
        .mock_async(|when, then| {
            when.method(GET).path("/weather");
            then.status(200).json_body(json!({"type": "rain"}));
        })
        .await;

    let reply = up.proxy().events("some-other-game").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["lastSeenEvents"], json!([]));
    assert_eq!(weather.hits_async().await, 0);
}

#[tokio::test]
async fn forecast_lists_are_relayed_with_upstream_status_on_failure() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200).json_body(json!([{"name": "Carrot", "shops": ["Seed Shop"]}]));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/weather-stats");
            then.status(502);
        })
        .await;

    let proxy = up.proxy();
    let items = proxy.forecast_items().await;
    assert_eq!(items.status, StatusCode::OK);
    assert_eq!(items.body[0]["name"], "Carrot");

    let stats = proxy.all_weather_stats().await;
    assert_eq!(stats.status, StatusCode::BAD_GATEWAY);
    assert_eq!(stats.body, json!({"error": "Failed to fetch weather stats"}));
}

#[tokio::test]
async fn forecast_connection_failures_are_500() {
    let proxy = GardenProxy::from_settings(&unreachable_settings()).unwrap();
    let reply = proxy.forecast_weather().await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.body["error"].as_str().unwrap().contains("127.0.0.1:1"));
}

#[tokio::test]
async fn weather_stats_failures_become_404() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/weather-stats/rain");
            then.status(200).json_body(json!({"weather": "rain", "appearances": [1, 0, 2]}));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/weather-stats/meteor");
            then.status(500);
        })
        .await;

    let proxy = up.proxy();
    let found = proxy.weather_stats("rain").await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["appearances"], json!([1, 0, 2]));

    let missing = proxy.weather_stats("meteor").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body, json!({"error": "Weather stats not found"}));
}

#[tokio::test]
async fn item_stats_are_searched_case_insensitively() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/item-stats");
            then.status(200).json_body(json!([
                {"item": "Carrot", "appearances": [1, 1, 0, 0, 0, 0, 0]},
                {"item": "Bamboo", "appearances": [0, 0, 0, 0, 0, 0, 3]},
            ]));
        })
        .await;

    let proxy = up.proxy();
    let found = proxy.item_stats("bamboo").await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["item"], "Bamboo");

    let missing = proxy.item_stats("Moon Melon").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing.body,
        json!({
            "error": "Item not found in historical data",
            "item": "Moon Melon",
            "message": "This item has not appeared in the shop yet or has no historical data.",
        })
    );
}

#[tokio::test]
async fn items_by_category_keeps_items_that_have_appeared() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200).json_body(json!([
                {"name": "Carrot", "shops": ["Seed Shop"]},
                {"name": "Beanstalk", "shops": ["Seed Shop"]},
                {"name": "Trowel", "shops": ["Gear Shop"]},
            ]));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/item-stats");
            then.status(200).json_body(json!([
                {"item": "carrot", "appearances": [0, 1]},
                {"item": "beanstalk", "appearances": [0, 0]},
                {"item": "trowel", "appearances": [5, 5]},
            ]));
        })
        .await;

    let reply = up.proxy().items_by_category("Seed").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([{"name": "Carrot", "shops": ["Seed Shop"]}]));
}

#[tokio::test]
async fn items_by_category_relays_stats_failures() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200).json_body(json!([]));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/item-stats");
            then.status(504);
        })
        .await;

    let reply = up.proxy().items_by_category("gear").await;
    assert_eq!(reply.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(reply.body, json!({"error": "Failed to fetch item stats"}));
}

#[tokio::test]
async fn debug_items_tolerates_missing_stats() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200).json_body(json!([
                {"name": "Common Egg", "shops": ["Egg Shop"]},
                {"name": "Sign Crate", "shops": ["Cosmetic Shop"]},
            ]));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/item-stats");
            then.status(500);
        })
        .await;

    let reply = up.proxy().debug_items().await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["total_items"], 2);
    assert_eq!(reply.body["total_stats"], 0);
    assert_eq!(reply.body["items_with_appearances"], 0);
    assert_eq!(
        reply.body["items_by_category"]["egg"],
        json!([{"name": "Common Egg", "has_stats": false}])
    );
    assert_eq!(reply.body["stats_sample"], json!([]));
}

#[tokio::test]
async fn item_prediction_fills_missing_arrays() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/predict/items/Carrot");
            then.status(200).json_body(json!({
                "item": "Carrot",
                "prediction_mode": "statistical",
                "next_occurrences": [{"predicted_time": "2026-10-16T12:05:00Z", "confidence": 0.9}],
            }));
        })
        .await;

    let reply = up.proxy().predict_item("Carrot").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["prediction_mode"], "statistical");
    assert_eq!(reply.body["next_occurrences"][0]["confidence"], 0.9);
    assert_eq!(reply.body["cycle_probabilities"], json!([]));
    assert_eq!(reply.body["confidence_windows"], json!([]));
}

#[tokio::test]
async fn item_prediction_errors_keep_the_error_shape() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/predict/items/Ghost");
            then.status(404).json_body(json!({"detail": "Item 'Ghost' not found"}));
        })
        .await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/predict/items/Broken");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let proxy = up.proxy();
    let missing = proxy.predict_item("Ghost").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing.body,
        json!({
            "item": "Ghost",
            "prediction_mode": "error",
            "next_occurrences": [],
            "cycle_probabilities": [],
            "confidence_windows": [],
            "error": "Item 'Ghost' not found",
        })
    );

    let broken = proxy.predict_item("Broken").await;
    assert_eq!(broken.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(broken.body["error"], "Prediction API returned status: 500");
}

#[tokio::test]
async fn item_prediction_connection_failure_is_503() {
    let proxy = GardenProxy::from_settings(&unreachable_settings()).unwrap();
    let reply = proxy.predict_item("Carrot").await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(reply.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Connection failed: "));
    assert_eq!(reply.body["item"], "Carrot");
}

#[tokio::test]
async fn weather_prediction_tries_underscored_name() {
    let up = Upstreams::start().await;
    let underscored = up
        .cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/predict/weather/heat_wave");
            then.status(200).json_body(json!({"weather": "heat_wave", "confidence_windows": null}));
        })
        .await;

    let reply = up.proxy().predict_weather("Heat Wave").await;

    underscored.assert_async().await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["weather"], "heat_wave");
    assert_eq!(reply.body["time_window_probabilities"], json!([]));
    assert_eq!(reply.body["confidence_windows"], json!([]));
}

#[tokio::test]
async fn weather_prediction_reports_last_failure() {
    let up = Upstreams::start().await;
    up.cycleon
        .mock_async(|when, then| {
            when.method(GET).path("/predict/weather/fog");
            then.status(404).json_body(json!({"detail": "Unknown weather 'fog'"}));
        })
        .await;

    let reply = up.proxy().predict_weather("fog").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["weather"], "fog");
    assert_eq!(reply.body["prediction_mode"], "error");
    assert_eq!(
        reply.body["error"],
        "Weather prediction failed: Unknown weather 'fog'"
    );
    assert_eq!(
        reply.body["suggestion"],
        r#"Try a different weather name like "sunny", "rain", or "storm""#
    );
}
