use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stock at or above this many units counts as healthy inventory.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Stock level category, derived from a quantity and never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Classifies a quantity: 0 is out of stock, 1-9 is low, 10+ is in stock.
    pub fn classify(qty: u32) -> Self {
        if qty == 0 {
            StockStatus::OutOfStock
        } else if qty < LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Returns the display label (e.g., "Low Stock")
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

/// Regional market bucket. Determined entirely by which warehouse column a
/// quantity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "CA")]
    Canada,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Us => "US",
            Market::Canada => "CA",
        }
    }

    /// Both markets, in the order alerts are evaluated (US first)
    pub fn all() -> &'static [Market] {
        &[Market::Us, Market::Canada]
    }
}

/// One SKU's state within one snapshot.
///
/// Statuses always satisfy `status == StockStatus::classify(stock)`; they are
/// derived in [`InventoryItem::new`] and recomputed on load rather than being
/// stored as independent truth. Totals equal the sum of the corresponding
/// warehouse map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub sku: String,
    #[serde(rename = "usStock")]
    pub us_stock: u32,
    #[serde(rename = "canadaStock")]
    pub canada_stock: u32,
    #[serde(rename = "usStatus")]
    pub us_status: StockStatus,
    #[serde(rename = "canadaStatus")]
    pub canada_status: StockStatus,
    #[serde(rename = "usWarehouses")]
    pub us_warehouses: BTreeMap<String, u32>,
    #[serde(rename = "canadaWarehouses")]
    pub canada_warehouses: BTreeMap<String, u32>,
}

impl InventoryItem {
    /// Builds an item from its stock totals and warehouse breakdowns,
    /// deriving both market statuses.
    pub fn new(
        sku: impl Into<String>,
        us_stock: u32,
        canada_stock: u32,
        us_warehouses: BTreeMap<String, u32>,
        canada_warehouses: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            sku: sku.into(),
            us_stock,
            canada_stock,
            us_status: StockStatus::classify(us_stock),
            canada_status: StockStatus::classify(canada_stock),
            us_warehouses,
            canada_warehouses,
        }
    }

    pub fn stock_for(&self, market: Market) -> u32 {
        match market {
            Market::Us => self.us_stock,
            Market::Canada => self.canada_stock,
        }
    }

    pub fn status_for(&self, market: Market) -> StockStatus {
        match market {
            Market::Us => self.us_status,
            Market::Canada => self.canada_status,
        }
    }
}

/// The complete inventory state captured at one calendar date; the unit of
/// storage. A later save for the same date replaces the snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySnapshot {
    pub date: NaiveDate,
    pub items: Vec<InventoryItem>,
}

/// One SKU's US/Canada stock at one stored snapshot date (for charting)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    #[serde(rename = "usStock")]
    pub us_stock: u32,
    #[serde(rename = "canadaStock")]
    pub canada_stock: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_zero_is_out_of_stock() {
        assert_eq!(StockStatus::classify(0), StockStatus::OutOfStock);
    }

    #[test]
    fn classify_low_stock_range() {
        assert_eq!(StockStatus::classify(1), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(5), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(9), StockStatus::LowStock);
    }

    #[test]
    fn classify_threshold_is_in_stock() {
        assert_eq!(StockStatus::classify(10), StockStatus::InStock);
        assert_eq!(StockStatus::classify(10_000), StockStatus::InStock);
    }

    #[test]
    fn status_labels() {
        assert_eq!(StockStatus::InStock.as_str(), "In Stock");
        assert_eq!(StockStatus::LowStock.as_str(), "Low Stock");
        assert_eq!(StockStatus::OutOfStock.as_str(), "Out of Stock");
    }

    #[test]
    fn new_item_derives_statuses() {
        let item = InventoryItem::new("SKU-1", 7, 0, BTreeMap::new(), BTreeMap::new());
        assert_eq!(item.us_status, StockStatus::LowStock);
        assert_eq!(item.canada_status, StockStatus::OutOfStock);
    }

    #[test]
    fn stock_for_market() {
        let item = InventoryItem::new("SKU-1", 12, 3, BTreeMap::new(), BTreeMap::new());
        assert_eq!(item.stock_for(Market::Us), 12);
        assert_eq!(item.stock_for(Market::Canada), 3);
        assert_eq!(item.status_for(Market::Us), StockStatus::InStock);
        assert_eq!(item.status_for(Market::Canada), StockStatus::LowStock);
    }

    #[test]
    fn market_order_is_us_first() {
        assert_eq!(Market::all(), &[Market::Us, Market::Canada][..]);
    }
}
