//! Inventory Ops - Feed Diff & History Engine
//!
//! Ingests periodic inventory feed exports (one per calendar date),
//! normalizes heterogeneous warehouse columns into per-SKU, per-market stock
//! records, detects stock-state transitions across consecutive snapshots,
//! and keeps a date-keyed snapshot history in SQLite for trend analysis.

pub mod alerts;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod models;
pub mod stats;
pub mod store;

pub use alerts::{generate_alerts, Alert, AlertKind};
pub use error::{Error, Result};
pub use feed::{cell_to_quantity, parse_feed, ParsedFeed};
pub use ingest::{ingest_feed, preview_alerts, IngestOutcome};
pub use models::{
    HistoryPoint, InventoryItem, InventorySnapshot, Market, StockStatus, LOW_STOCK_THRESHOLD,
};
pub use stats::{aggregate, InventoryStats, MarketStats};
pub use store::SnapshotStore;
