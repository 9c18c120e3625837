use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const UNKNOWN_ITEM: &str = "Unknown Item";

const NAME_KEYS: [&str; 3] = ["name", "Name", "title"];
const STOCK_KEYS: [&str; 4] = ["Stock", "stock", "quantity", "Quantity"];
const IMAGE_KEYS: [&str; 3] = ["image", "Image", "img"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shop {
    Seed,
    Gear,
    Event,
    Egg,
    Cosmetic,
}

impl Shop {
    pub const ALL: [Shop; 5] = [Shop::Seed, Shop::Gear, Shop::Event, Shop::Egg, Shop::Cosmetic];

    pub fn key(self) -> &'static str {
        match self {
            Shop::Seed => "seed",
            Shop::Gear => "gear",
            Shop::Event => "event",
            Shop::Egg => "egg",
            Shop::Cosmetic => "cosmetic",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Shop::Seed => "Seed Shop",
            Shop::Gear => "Gear Shop",
            Shop::Event => "Event Shop",
            Shop::Egg => "Egg Shop",
            Shop::Cosmetic => "Cosmetic Shop",
        }
    }

    /// Key in the `/alldata` payload, which is also the path of the shop's own endpoint.
    pub fn source_key(self) -> &'static str {
        match self {
            Shop::Seed => "seeds",
            Shop::Gear => "gear",
            Shop::Event => "honey",
            Shop::Egg => "eggs",
            Shop::Cosmetic => "cosmetics",
        }
    }

    pub fn interval_minutes(self) -> i64 {
        match self {
            Shop::Seed | Shop::Gear => 5,
            Shop::Event | Shop::Egg => 30,
            Shop::Cosmetic => 240,
        }
    }
}

impl fmt::Display for Shop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Shop {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        for shop in Shop::ALL {
            if shop.key() == wanted || shop.source_key() == wanted {
                return Ok(shop);
            }
        }
        bail!("unknown shop: {s} (expected one of seed, gear, event, egg, cosmetic)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub name: String,
    #[serde(rename = "Stock")]
    pub stock: i64,
    pub quantity: i64,
    pub image: String,
}

/// Upstream shop arrays, untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawShopStock {
    pub seeds: Vec<Value>,
    pub gear: Vec<Value>,
    pub eggs: Vec<Value>,
    pub cosmetics: Vec<Value>,
    pub honey: Vec<Value>,
}

impl RawShopStock {
    /// Reads the per-shop arrays out of an `/alldata` body. Missing or non-array entries are empty.
    pub fn from_alldata(body: &Value) -> Self {
        let mut raw = Self::default();
        for shop in Shop::ALL {
            let items = body
                .get(shop.source_key())
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            raw.set(shop, items);
        }
        raw
    }

    pub fn get(&self, shop: Shop) -> &[Value] {
        match shop {
            Shop::Seed => &self.seeds,
            Shop::Gear => &self.gear,
            Shop::Event => &self.honey,
            Shop::Egg => &self.eggs,
            Shop::Cosmetic => &self.cosmetics,
        }
    }

    pub fn set(&mut self, shop: Shop, items: Vec<Value>) {
        let slot = match shop {
            Shop::Seed => &mut self.seeds,
            Shop::Gear => &mut self.gear,
            Shop::Event => &mut self.honey,
            Shop::Egg => &mut self.eggs,
            Shop::Cosmetic => &mut self.cosmetics,
        };
        *slot = items;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockResponse {
    pub seed_stock: Vec<StockItem>,
    pub gear_stock: Vec<StockItem>,
    pub egg_stock: Vec<StockItem>,
    pub cosmetic_stock: Vec<StockItem>,
    pub event_shop_stock: Vec<StockItem>,
    pub raw_seeds: Vec<Value>,
    pub raw_gear: Vec<Value>,
    pub raw_eggs: Vec<Value>,
    pub raw_cosmetics: Vec<Value>,
    pub raw_honey: Vec<Value>,
}

impl StockResponse {
    pub fn from_raw(raw: RawShopStock, image_cdn_base_url: &str) -> Self {
        Self {
            seed_stock: transform_items(&raw.seeds, image_cdn_base_url),
            gear_stock: transform_items(&raw.gear, image_cdn_base_url),
            egg_stock: transform_items(&raw.eggs, image_cdn_base_url),
            cosmetic_stock: transform_items(&raw.cosmetics, image_cdn_base_url),
            event_shop_stock: transform_items(&raw.honey, image_cdn_base_url),
            raw_seeds: raw.seeds,
            raw_gear: raw.gear,
            raw_eggs: raw.eggs,
            raw_cosmetics: raw.cosmetics,
            raw_honey: raw.honey,
        }
    }

    pub fn items(&self, shop: Shop) -> &[StockItem] {
        match shop {
            Shop::Seed => &self.seed_stock,
            Shop::Gear => &self.gear_stock,
            Shop::Event => &self.event_shop_stock,
            Shop::Egg => &self.egg_stock,
            Shop::Cosmetic => &self.cosmetic_stock,
        }
    }
}

pub fn transform_items(items: &[Value], image_cdn_base_url: &str) -> Vec<StockItem> {
    items
        .iter()
        .map(|item| transform_item(item, image_cdn_base_url))
        .collect()
}

fn transform_item(item: &Value, image_cdn_base_url: &str) -> StockItem {
    let empty = Map::new();
    let fields = item.as_object().unwrap_or(&empty);

    let name = first_present(fields, &NAME_KEYS)
        .map(value_to_string)
        .unwrap_or_else(|| UNKNOWN_ITEM.to_string());

    let stock = first_present(fields, &STOCK_KEYS)
        .map(coerce_int)
        .unwrap_or(0);

    let image = first_present(fields, &IMAGE_KEYS)
        .filter(|v| is_truthy(v))
        .map(value_to_string)
        .unwrap_or_else(|| cdn_image_url(image_cdn_base_url, &image_slug(&name)));

    StockItem {
        name,
        stock,
        quantity: stock,
        image,
    }
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose truthiness of an upstream value: null, `false`, zero, `""`, `"0"` and
/// empty collections are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Integer cast with the lenient semantics the upstream data needs: floats truncate,
/// numeric strings parse, booleans are 0/1, anything else is 0.
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Lowercases ASCII letters and digits; every other byte becomes `_`.
pub fn image_slug(name: &str) -> String {
    name.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                b.to_ascii_lowercase() as char
            } else {
                '_'
            }
        })
        .collect()
}

pub fn cdn_image_url(image_cdn_base_url: &str, slug: &str) -> String {
    format!("{}/{}", image_cdn_base_url.trim_end_matches('/'), slug)
}
