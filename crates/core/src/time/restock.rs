use crate::domain::stock::Shop;
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde::Serialize;

const RESTOCKING_LABEL: &str = "Restocking...";

/// Restocks happen every `interval` minutes counted from local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockWindow {
    pub last: DateTime<FixedOffset>,
    pub next: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
}

impl Countdown {
    pub fn from_total_seconds(total_seconds: i64) -> Self {
        let total_seconds = total_seconds.max(0);
        Self {
            minutes: total_seconds / 60,
            seconds: total_seconds % 60,
            total_seconds,
        }
    }

    /// One tick of the per-second timer, clamped at zero.
    pub fn tick(self) -> Self {
        Self::from_total_seconds(self.total_seconds - 1)
    }

    pub fn is_due(&self) -> bool {
        self.total_seconds == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopRestock {
    pub shop: Shop,
    pub interval_minutes: i64,
    pub last_restock: DateTime<FixedOffset>,
    pub next_restock: DateTime<FixedOffset>,
    pub seconds_until_restock: i64,
    pub countdown: String,
}

pub fn restock_window(shop: Shop, now: DateTime<Utc>, offset: FixedOffset) -> RestockWindow {
    let local = now.with_timezone(&offset);
    let interval_ms = shop.interval_minutes() * 60 * 1000;

    let since_midnight_ms = i64::from(local.num_seconds_from_midnight()) * 1000
        + i64::from(local.timestamp_subsec_millis().min(999));
    let into_interval_ms = since_midnight_ms % interval_ms;

    let last = local - Duration::milliseconds(into_interval_ms);
    RestockWindow {
        last,
        next: last + Duration::milliseconds(interval_ms),
    }
}

pub fn countdown(shop: Shop, now: DateTime<Utc>, offset: FixedOffset) -> Countdown {
    let window = restock_window(shop, now, offset);
    let remaining_ms = (window.next.with_timezone(&Utc) - now).num_milliseconds();
    Countdown::from_total_seconds(remaining_ms.div_euclid(1000))
}

/// Time left until the next restock, as a sleep duration.
pub fn until_next_restock(shop: Shop, now: DateTime<Utc>, offset: FixedOffset) -> std::time::Duration {
    let window = restock_window(shop, now, offset);
    (window.next.with_timezone(&Utc) - now)
        .to_std()
        .unwrap_or_default()
}

/// Cosmetic shop renders `HH:MM:SS`, the others `M:SS`. At zero the label depends on
/// whether a refresh is in flight.
pub fn format_countdown(shop: Shop, countdown: &Countdown, restocking: bool) -> String {
    if countdown.is_due() {
        if restocking {
            return RESTOCKING_LABEL.to_string();
        }
        let interval = shop.interval_minutes();
        return match shop {
            Shop::Cosmetic => format!("{:02}:{:02}:00", interval / 60, interval % 60),
            _ => format!("{interval}:00"),
        };
    }

    match shop {
        Shop::Cosmetic => {
            let total = countdown.total_seconds;
            format!(
                "{:02}:{:02}:{:02}",
                total / 3600,
                (total % 3600) / 60,
                total % 60
            )
        }
        _ => format!("{}:{:02}", countdown.minutes, countdown.seconds),
    }
}

pub fn restock_board(now: DateTime<Utc>, offset: FixedOffset) -> Vec<ShopRestock> {
    Shop::ALL
        .into_iter()
        .map(|shop| {
            let window = restock_window(shop, now, offset);
            let left = countdown(shop, now, offset);
            ShopRestock {
                shop,
                interval_minutes: shop.interval_minutes(),
                last_restock: window.last,
                next_restock: window.next,
                seconds_until_restock: left.total_seconds,
                countdown: format_countdown(shop, &left, false),
            }
        })
        .collect()
}
