use chrono::{DateTime, FixedOffset, Utc};
use garden_core::domain::stock::{Shop, StockItem};
use garden_core::time::restock::{countdown, format_countdown, until_next_restock};
use garden_core::upstream::gag::StockSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

// The aggregator lags the restock boundary slightly.
const RESTOCK_GRACE: Duration = Duration::from_millis(100);
const REARM_DELAY: Duration = Duration::from_secs(1);

/// Wall clock the shop timers schedule against.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub shops: Vec<Shop>,
    pub weather_every: Duration,
    pub offset: FixedOffset,
}

/// Runs one timer per shop plus the weather poll until Ctrl-C.
pub async fn run(source: Arc<dyn StockSource>, opts: WatchOptions) -> anyhow::Result<()> {
    let clock: Clock = Arc::new(Utc::now);
    let mut tasks = JoinSet::new();

    for shop in opts.shops.iter().copied() {
        tasks.spawn(watch_shop(
            Arc::clone(&source),
            shop,
            opts.offset,
            Arc::clone(&clock),
        ));
    }
    tasks.spawn(watch_weather(Arc::clone(&source), opts.weather_every));

    tracing::info!(
        source = source.source_name(),
        shops = opts.shops.len(),
        weather_every_secs = opts.weather_every.as_secs(),
        "restock watcher started"
    );

    let outcome = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down restock watcher");
            Ok(())
        }
        Some(joined) = tasks.join_next() => {
            let err = match joined {
                Err(err) => anyhow::anyhow!("watcher task failed: {err}"),
                Ok(()) => anyhow::anyhow!("watcher task stopped"),
            };
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "stopping restock watcher");
            Err(err)
        }
    };

    tasks.abort_all();
    outcome
}

async fn watch_shop(
    source: Arc<dyn StockSource>,
    shop: Shop,
    offset: FixedOffset,
    clock: Clock,
) {
    loop {
        let now = clock();
        let left = countdown(shop, now, offset);
        tracing::info!(
            shop = %shop,
            next_in = %format_countdown(shop, &left, false),
            "waiting for restock"
        );

        tokio::time::sleep(until_next_restock(shop, now, offset) + RESTOCK_GRACE).await;
        restock_once(source.as_ref(), shop).await;
        tokio::time::sleep(REARM_DELAY).await;
    }
}

async fn watch_weather(source: Arc<dyn StockSource>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let events = source.fetch_weather().await;
        match events.current() {
            Some(event) => tracing::info!(
                weather = %event.display_name,
                active = event.is_active(),
                effects = %event.description,
                "current weather"
            ),
            None => tracing::info!("no weather event reported"),
        }
    }
}

/// Fetches one shop after its restock. Failures are reported and the timer keeps going.
pub async fn restock_once(source: &dyn StockSource, shop: Shop) -> Option<Vec<StockItem>> {
    tracing::info!(shop = %shop, "fetching {} on restock", shop.display_name());

    match source.fetch_shop(shop).await {
        Ok(items) => {
            let in_stock: i64 = items.iter().map(|i| i.stock).sum();
            tracing::info!(shop = %shop, items = items.len(), in_stock, "restocked");
            for item in &items {
                tracing::debug!(shop = %shop, name = %item.name, stock = item.stock, "stock item");
            }
            Some(items)
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::warn!(shop = %shop, error = %format!("{err:#}"), "restock fetch failed");
            None
        }
    }
}
