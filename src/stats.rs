//! Per-market stock statistics over one snapshot's item list.

use crate::models::{InventoryItem, Market, StockStatus};
use serde::Serialize;

/// Bucket counts for one market. Every item lands in exactly one bucket
/// (0 counts only toward `out_of_stock`, never `low_stock`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    #[serde(rename = "outOfStock")]
    pub out_of_stock: usize,
    #[serde(rename = "lowStock")]
    pub low_stock: usize,
    #[serde(rename = "inStock")]
    pub in_stock: usize,
}

/// Derived snapshot statistics; recomputed on demand, never persisted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    #[serde(rename = "totalSkus")]
    pub total_skus: usize,
    pub us: MarketStats,
    pub canada: MarketStats,
}

impl InventoryStats {
    pub fn for_market(&self, market: Market) -> &MarketStats {
        match market {
            Market::Us => &self.us,
            Market::Canada => &self.canada,
        }
    }
}

/// Reduces an item list into per-market bucket counts. Single pass,
/// order-independent.
pub fn aggregate(items: &[InventoryItem]) -> InventoryStats {
    let mut stats = InventoryStats {
        total_skus: items.len(),
        ..Default::default()
    };
    for item in items {
        bump(&mut stats.us, item.us_stock);
        bump(&mut stats.canada, item.canada_stock);
    }
    stats
}

fn bump(market: &mut MarketStats, qty: u32) {
    match StockStatus::classify(qty) {
        StockStatus::OutOfStock => market.out_of_stock += 1,
        StockStatus::LowStock => market.low_stock += 1,
        StockStatus::InStock => market.in_stock += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(sku: &str, us: u32, ca: u32) -> InventoryItem {
        InventoryItem::new(sku, us, ca, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn empty_list_is_all_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats, InventoryStats::default());
    }

    #[test]
    fn buckets_partition_the_items() {
        let items = vec![
            item("A", 0, 25),
            item("B", 3, 0),
            item("C", 9, 9),
            item("D", 10, 1),
            item("E", 150, 0),
        ];
        let stats = aggregate(&items);

        assert_eq!(stats.total_skus, 5);
        for market in Market::all() {
            let m = stats.for_market(*market);
            assert_eq!(
                m.out_of_stock + m.low_stock + m.in_stock,
                stats.total_skus,
                "{} buckets must partition the items",
                market.as_str()
            );
        }
        assert_eq!(stats.us.out_of_stock, 1);
        assert_eq!(stats.us.low_stock, 2);
        assert_eq!(stats.us.in_stock, 2);
        assert_eq!(stats.canada.out_of_stock, 2);
        assert_eq!(stats.canada.low_stock, 2);
        assert_eq!(stats.canada.in_stock, 1);
    }

    #[test]
    fn zero_counts_only_as_out_of_stock() {
        let stats = aggregate(&[item("A", 0, 0)]);
        assert_eq!(stats.us.out_of_stock, 1);
        assert_eq!(stats.us.low_stock, 0);
        assert_eq!(stats.canada.out_of_stock, 1);
        assert_eq!(stats.canada.low_stock, 0);
    }

    #[test]
    fn markets_are_independent() {
        let stats = aggregate(&[item("A", 0, 42)]);
        assert_eq!(stats.us.out_of_stock, 1);
        assert_eq!(stats.canada.in_stock, 1);
    }
}
