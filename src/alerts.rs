//! Stock-state transition detection between two chronologically adjacent
//! snapshots.
//!
//! Alerts are ephemeral: they are generated fresh per comparison and never
//! persisted. Identical inputs reproduce an identical alert list, ids
//! included, so re-running a diff is idempotent.

use crate::models::{InventoryItem, Market, LOW_STOCK_THRESHOLD};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Kind of stock transition detected for one SKU in one market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    #[serde(rename = "LOW_STOCK")]
    LowStock,
    #[serde(rename = "OUT_OF_STOCK")]
    OutOfStock,
    #[serde(rename = "RESTOCK")]
    Restock,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::OutOfStock => "OUT_OF_STOCK",
            AlertKind::Restock => "RESTOCK",
        }
    }

    /// Human message shown with the alert
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "Stock fell below 10 units",
            AlertKind::OutOfStock => "Item went Out of Stock",
            AlertKind::Restock => "Item is Back in Stock",
        }
    }
}

/// A detected stock-state transition for one SKU in one market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Deterministic: derived from market, kind, SKU, and date
    pub id: String,
    pub sku: String,
    pub market: Market,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    #[serde(rename = "previousQty")]
    pub previous_qty: u32,
    #[serde(rename = "newQty")]
    pub new_qty: u32,
    /// Date of the current snapshot being diffed
    pub date: NaiveDate,
}

impl Alert {
    fn new(
        kind: AlertKind,
        market: Market,
        sku: &str,
        previous_qty: u32,
        new_qty: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: format!("{}-{}-{}-{}", market.as_str(), kind.as_str(), sku, date),
            sku: sku.to_string(),
            market,
            kind,
            message: kind.message().to_string(),
            previous_qty,
            new_qty,
            date,
        }
    }
}

/// Compares the current item list against the immediately preceding
/// snapshot's list and emits transition alerts per SKU per market.
///
/// SKUs without a prior record are skipped (a newly appeared SKU never
/// alerts). Markets are evaluated independently, US first. Pure function:
/// no I/O, no mutable state.
pub fn generate_alerts(
    current: &[InventoryItem],
    previous: Option<&[InventoryItem]>,
    date: NaiveDate,
) -> Vec<Alert> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    // First occurrence wins on duplicate SKUs, mirroring the history read path
    let mut prior: HashMap<&str, &InventoryItem> = HashMap::with_capacity(previous.len());
    for item in previous {
        prior.entry(item.sku.as_str()).or_insert(item);
    }

    let mut alerts = Vec::new();
    for item in current {
        let Some(prev) = prior.get(item.sku.as_str()) else {
            continue;
        };
        for market in Market::all() {
            let previous_qty = prev.stock_for(*market);
            let new_qty = item.stock_for(*market);
            if let Some(kind) = transition(previous_qty, new_qty) {
                alerts.push(Alert::new(
                    kind,
                    *market,
                    &item.sku,
                    previous_qty,
                    new_qty,
                    date,
                ));
            }
        }
    }
    alerts
}

/// The three transition rules are mutually exclusive: a direct fall from
/// healthy to zero is a stockout, not a low-stock event.
fn transition(previous: u32, current: u32) -> Option<AlertKind> {
    if previous >= LOW_STOCK_THRESHOLD && current > 0 && current < LOW_STOCK_THRESHOLD {
        Some(AlertKind::LowStock)
    } else if previous > 0 && current == 0 {
        Some(AlertKind::OutOfStock)
    } else if previous == 0 && current > 0 {
        Some(AlertKind::Restock)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(sku: &str, us: u32, ca: u32) -> InventoryItem {
        InventoryItem::new(sku, us, ca, BTreeMap::new(), BTreeMap::new())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn no_previous_snapshot_means_no_alerts() {
        let current = vec![item("A", 0, 0)];
        assert!(generate_alerts(&current, None, date()).is_empty());
    }

    #[test]
    fn unchanged_stock_does_not_alert() {
        let prev = vec![item("A", 15, 15)];
        let cur = vec![item("A", 15, 15)];
        assert!(generate_alerts(&cur, Some(&prev), date()).is_empty());
    }

    #[test]
    fn fall_below_threshold_emits_low_stock() {
        let prev = vec![item("A", 15, 0)];
        let cur = vec![item("A", 7, 0)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.kind, AlertKind::LowStock);
        assert_eq!(alert.market, Market::Us);
        assert_eq!(alert.previous_qty, 15);
        assert_eq!(alert.new_qty, 7);
        assert_eq!(alert.message, "Stock fell below 10 units");
    }

    #[test]
    fn fall_to_zero_emits_only_out_of_stock() {
        let prev = vec![item("A", 20, 0)];
        let cur = vec![item("A", 0, 0)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::OutOfStock);
        assert_eq!(alerts[0].message, "Item went Out of Stock");
    }

    #[test]
    fn restock_from_zero() {
        let prev = vec![item("A", 0, 0)];
        let cur = vec![item("A", 3, 0)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Restock);
        assert_eq!(alerts[0].previous_qty, 0);
        assert_eq!(alerts[0].new_qty, 3);
        assert_eq!(alerts[0].message, "Item is Back in Stock");
    }

    #[test]
    fn low_stock_requires_healthy_previous() {
        // 5 -> 3 stays within the low band; no transition happened
        let prev = vec![item("A", 5, 0)];
        let cur = vec![item("A", 3, 0)];
        assert!(generate_alerts(&cur, Some(&prev), date()).is_empty());
    }

    #[test]
    fn markets_alert_independently_us_first() {
        let prev = vec![item("A", 15, 0)];
        let cur = vec![item("A", 7, 4)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].market, Market::Us);
        assert_eq!(alerts[0].kind, AlertKind::LowStock);
        assert_eq!(alerts[1].market, Market::Canada);
        assert_eq!(alerts[1].kind, AlertKind::Restock);
    }

    #[test]
    fn new_sku_never_alerts() {
        let prev = vec![item("A", 15, 15)];
        let cur = vec![item("A", 15, 15), item("B", 0, 0)];
        assert!(generate_alerts(&cur, Some(&prev), date()).is_empty());
    }

    #[test]
    fn disappeared_sku_never_alerts() {
        let prev = vec![item("A", 15, 15), item("B", 15, 15)];
        let cur = vec![item("A", 15, 15)];
        assert!(generate_alerts(&cur, Some(&prev), date()).is_empty());
    }

    #[test]
    fn alerts_follow_current_iteration_order() {
        let prev = vec![item("A", 0, 0), item("B", 20, 0)];
        let cur = vec![item("B", 2, 0), item("A", 5, 0)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].sku, "B");
        assert_eq!(alerts[1].sku, "A");
    }

    #[test]
    fn ids_are_deterministic() {
        let prev = vec![item("A", 15, 0)];
        let cur = vec![item("A", 7, 0)];

        let first = generate_alerts(&cur, Some(&prev), date());
        let second = generate_alerts(&cur, Some(&prev), date());
        assert_eq!(first, second);
        assert_eq!(first[0].id, "US-LOW_STOCK-A-2026-03-02");
    }

    #[test]
    fn duplicate_previous_skus_use_first_occurrence() {
        let prev = vec![item("A", 15, 0), item("A", 3, 0)];
        let cur = vec![item("A", 7, 0)];
        let alerts = generate_alerts(&cur, Some(&prev), date());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].previous_qty, 15);
        assert_eq!(alerts[0].kind, AlertKind::LowStock);
    }
}
