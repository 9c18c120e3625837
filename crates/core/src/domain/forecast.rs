use crate::domain::stock::Shop;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const STATS_SAMPLE_LEN: usize = 5;

pub const ITEM_NOT_FOUND_ERROR: &str = "Item not found in historical data";
pub const ITEM_NOT_FOUND_MESSAGE: &str =
    "This item has not appeared in the shop yet or has no historical data.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatsNotFound {
    pub error: String,
    pub item: String,
    pub message: String,
}

impl ItemStatsNotFound {
    pub fn new(item: &str) -> Self {
        Self {
            error: ITEM_NOT_FOUND_ERROR.to_string(),
            item: item.to_string(),
            message: ITEM_NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub has_stats: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemsByCategory {
    pub seed: Vec<CategoryEntry>,
    pub gear: Vec<CategoryEntry>,
    pub event: Vec<CategoryEntry>,
    pub egg: Vec<CategoryEntry>,
    pub cosmetic: Vec<CategoryEntry>,
}

impl ItemsByCategory {
    fn push(&mut self, shop: Shop, entry: CategoryEntry) {
        match shop {
            Shop::Seed => self.seed.push(entry),
            Shop::Gear => self.gear.push(entry),
            Shop::Event => self.event.push(entry),
            Shop::Egg => self.egg.push(entry),
            Shop::Cosmetic => self.cosmetic.push(entry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugItemsReport {
    pub total_items: usize,
    pub total_stats: usize,
    pub items_with_appearances: usize,
    pub items_by_category: ItemsByCategory,
    pub stats_sample: Vec<Value>,
}

/// Views a JSON value as a list; anything but an array is empty.
pub fn as_list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Number of entries in an upstream collection, for logging.
pub fn collection_len(value: &Value) -> usize {
    match value {
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        _ => 1,
    }
}

fn lowercase_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

/// True when at least one appearance count is positive. `appearances` may be a list or a map.
pub fn has_appearances(stat: &Value) -> bool {
    let positive = |v: &Value| match v {
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(|n| n > 0.0),
        other => other.as_f64().is_some_and(|n| n > 0.0),
    };
    match stat.get("appearances") {
        Some(Value::Array(counts)) => counts.iter().any(positive),
        Some(Value::Object(counts)) => counts.values().any(positive),
        _ => false,
    }
}

/// Stats entries that have appeared at least once, keyed by lowercased item name.
pub fn stats_with_appearances(stats: &[Value]) -> HashMap<String, &Value> {
    stats
        .iter()
        .filter(|s| has_appearances(s))
        .map(|s| (lowercase_field(s, "item"), s))
        .collect()
}

pub fn find_item_stats<'a>(stats: &'a [Value], item: &str) -> Option<&'a Value> {
    let wanted = item.to_lowercase();
    stats.iter().find(|s| lowercase_field(s, "item") == wanted)
}

fn item_shops(item: &Value) -> impl Iterator<Item = String> + '_ {
    item.get("shops")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_lowercase)
}

/// Items sold in a shop whose name contains `category` and that have appeared at least once,
/// in upstream order.
pub fn filter_items_by_category(items: &[Value], stats: &[Value], category: &str) -> Vec<Value> {
    let with_stats = stats_with_appearances(stats);
    let category = category.to_lowercase();

    items
        .iter()
        .filter(|item| item_shops(item).any(|shop| shop.contains(&category)))
        .filter(|item| with_stats.contains_key(&lowercase_field(item, "name")))
        .cloned()
        .collect()
}

pub fn debug_report(items: &[Value], stats: &[Value]) -> DebugItemsReport {
    let with_stats = stats_with_appearances(stats);
    let mut by_category = ItemsByCategory::default();

    for item in items {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let has_stats = with_stats.contains_key(&name.to_lowercase());

        // One entry per matching shop, so an item listed in two seed shops shows up twice.
        for shop_name in item_shops(item) {
            for shop in Shop::ALL {
                if shop_name.contains(shop.key()) {
                    by_category.push(
                        shop,
                        CategoryEntry {
                            name: name.clone(),
                            has_stats,
                        },
                    );
                }
            }
        }
    }

    DebugItemsReport {
        total_items: items.len(),
        total_stats: stats.len(),
        items_with_appearances: with_stats.len(),
        items_by_category: by_category,
        stats_sample: stats.iter().take(STATS_SAMPLE_LEN).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<Value> {
        vec![
            json!({"name": "Carrot", "shops": ["Seed Shop"]}),
            json!({"name": "Watering Can", "shops": ["Gear Shop"]}),
            json!({"name": "Bee Egg", "shops": ["Event Shop", "Egg Shop"]}),
            json!({"name": "Dragon Fruit", "shops": ["Seed Shop"]}),
            json!({"name": "Mystery", "shops": "not a list"}),
        ]
    }

    fn stats() -> Vec<Value> {
        vec![
            json!({"item": "carrot", "appearances": [0, 2, 1, 0, 0, 0, 0]}),
            json!({"item": "Watering Can", "appearances": {"mon": 1}}),
            json!({"item": "Bee Egg", "appearances": [0, 0, 0]}),
            json!({"item": "Dragon Fruit"}),
        ]
    }

    #[test]
    fn appearance_check_handles_lists_and_maps() {
        let s = stats();
        assert!(has_appearances(&s[0]));
        assert!(has_appearances(&s[1]));
        assert!(!has_appearances(&s[2]));
        assert!(!has_appearances(&s[3]));
    }

    #[test]
    fn numeric_string_counts_count_as_appearances() {
        assert!(has_appearances(&json!({"item": "Tomato", "appearances": ["0", "3"]})));
        assert!(has_appearances(&json!({"item": "Tomato", "appearances": {"tue": " 2 "}})));
        assert!(!has_appearances(&json!({"item": "Tomato", "appearances": ["0", "many"]})));
    }

    #[test]
    fn item_search_is_case_insensitive() {
        let s = stats();
        let found = find_item_stats(&s, "CARROT").unwrap();
        assert_eq!(found["item"], "carrot");
        assert!(find_item_stats(&s, "Pumpkin").is_none());
    }

    #[test]
    fn category_filter_requires_shop_match_and_appearances() {
        let seeds = filter_items_by_category(&items(), &stats(), "seed");
        assert_eq!(seeds, vec![json!({"name": "Carrot", "shops": ["Seed Shop"]})]);

        let gear = filter_items_by_category(&items(), &stats(), "GEAR");
        assert_eq!(gear.len(), 1);

        // Bee Egg is in the egg shop but has never appeared.
        assert!(filter_items_by_category(&items(), &stats(), "egg").is_empty());
    }

    #[test]
    fn debug_report_groups_items_per_shop() {
        let report = debug_report(&items(), &stats());
        assert_eq!(report.total_items, 5);
        assert_eq!(report.total_stats, 4);
        assert_eq!(report.items_with_appearances, 2);
        assert_eq!(report.stats_sample.len(), 4);

        let cat = &report.items_by_category;
        assert_eq!(cat.seed.len(), 2);
        assert!(cat.seed[0].has_stats);
        assert!(!cat.seed[1].has_stats);
        assert_eq!(cat.event[0].name, "Bee Egg");
        assert_eq!(cat.egg[0].name, "Bee Egg");
        assert!(cat.cosmetic.is_empty());
    }

    #[test]
    fn debug_report_keeps_category_key_order() {
        let out = serde_json::to_string(&debug_report(&[], &[]).items_by_category).unwrap();
        assert_eq!(
            out,
            r#"{"seed":[],"gear":[],"event":[],"egg":[],"cosmetic":[]}"#
        );
    }
}
