//! The ingest pipeline: normalize a feed, diff it against the prior stored
//! snapshot, persist the new snapshot.
//!
//! `ingest_feed` takes `&mut SnapshotStore`, so two read-modify-write
//! sequences can never interleave on one handle: the "previous" snapshot
//! read stays valid until the save commits.

use crate::alerts::{generate_alerts, Alert};
use crate::error::Result;
use crate::feed::parse_feed;
use crate::models::InventoryItem;
use crate::store::SnapshotStore;
use chrono::NaiveDate;
use serde::Serialize;

/// What one ingestion produced
#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    /// Resolved snapshot date
    pub date: NaiveDate,
    /// Normalized items, in feed order
    pub items: Vec<InventoryItem>,
    /// Transition alerts against the immediately preceding snapshot
    pub alerts: Vec<Alert>,
    /// Whether a snapshot already stored for this date was replaced
    pub replaced_existing: bool,
    /// Rows excluded for lacking an identifier
    pub dropped_rows: usize,
}

/// Parses `content`, diffs it against the latest snapshot strictly before
/// its date, saves it, and reports the outcome.
///
/// A parse or storage failure aborts the sequence; stored state is only
/// touched by the final save, which is itself atomic.
pub fn ingest_feed(store: &mut SnapshotStore, content: &str) -> Result<IngestOutcome> {
    let feed = parse_feed(content)?;
    if !feed.explicit_date {
        log::info!("Feed carries no date line, using today: {}", feed.date);
    }
    if feed.dropped_rows > 0 {
        log::warn!("Dropped {} row(s) without a SKU", feed.dropped_rows);
    }

    let replaced_existing = store.get_by_date(feed.date)?.is_some();
    let previous = store.get_latest_before(feed.date)?;
    let alerts = generate_alerts(
        &feed.items,
        previous.as_ref().map(|s| s.items.as_slice()),
        feed.date,
    );

    store.save(feed.date, &feed.items)?;
    log::info!(
        "Ingested snapshot {}: {} items, {} alert(s)",
        feed.date,
        feed.items.len(),
        alerts.len()
    );

    Ok(IngestOutcome {
        date: feed.date,
        items: feed.items,
        alerts,
        replaced_existing,
        dropped_rows: feed.dropped_rows,
    })
}

/// Dry run: parses and diffs like [`ingest_feed`] but saves nothing
pub fn preview_alerts(store: &SnapshotStore, content: &str) -> Result<IngestOutcome> {
    let feed = parse_feed(content)?;
    let replaced_existing = store.get_by_date(feed.date)?.is_some();
    let previous = store.get_latest_before(feed.date)?;
    let alerts = generate_alerts(
        &feed.items,
        previous.as_ref().map(|s| s.items.as_slice()),
        feed.date,
    );

    Ok(IngestOutcome {
        date: feed.date,
        items: feed.items,
        alerts,
        replaced_existing,
        dropped_rows: feed.dropped_rows,
    })
}
