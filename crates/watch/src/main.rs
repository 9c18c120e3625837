use clap::Parser;
use garden_core::domain::stock::Shop;
use garden_core::upstream::gag::{GagClient, StockSource};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod watcher;

#[derive(Debug, Parser)]
#[command(name = "garden_watch")]
struct Args {
    /// Shops to watch (seed, gear, event, egg, cosmetic). Defaults to all of them.
    #[arg(long, value_delimiter = ',')]
    shops: Vec<Shop>,

    /// Seconds between weather polls.
    #[arg(long, default_value_t = 300)]
    weather_every_secs: u64,

    /// Fetch stock and weather once, print them as JSON and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = garden_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.weather_every_secs > 0,
        "--weather-every-secs must be positive"
    );

    let gag = GagClient::from_settings(&settings)?;

    if args.once {
        let (stock, weather) = tokio::join!(gag.fetch_stock(), gag.fetch_weather());
        let out = serde_json::json!({ "stock": stock, "weather": weather });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let shops = if args.shops.is_empty() {
        Shop::ALL.to_vec()
    } else {
        args.shops
    };

    let opts = watcher::WatchOptions {
        shops,
        weather_every: Duration::from_secs(args.weather_every_secs),
        offset: settings.restock_offset()?,
    };

    watcher::run(Arc::new(gag), opts).await
}

fn init_sentry(settings: &garden_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
