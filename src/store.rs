//! Snapshot persistence over SQLite.
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Every write runs inside one transaction, so a failed save never leaves a
//! torn snapshot visible to readers.
//!
//! Dates are stored as `YYYY-MM-DD` TEXT; lexicographic order equals
//! chronological order, so SQL `MAX`/`<` comparisons on the key are correct.

use crate::error::{Error, Result};
use crate::models::{HistoryPoint, InventoryItem, InventorySnapshot};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// Handle to the snapshot database.
///
/// Constructed and owned by the caller; there is no module-level singleton.
/// Writes take `&mut self`, which statically serializes read-modify-write
/// ingest sequences on one handle. Reads take `&self` and observe only
/// committed snapshots.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Opens (or creates) the snapshot database at `path` and initialises
    /// the schema. The parent directory is created if missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("Snapshot DB: {}", path.display());
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, used in tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the underlying connection, surfacing any pending error
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    /// Upserts the snapshot for `date`. Last write wins: any previously
    /// stored snapshot for the same date is replaced wholesale, never
    /// merged. Atomic — either the new snapshot becomes fully visible or
    /// the prior one is left entirely intact.
    pub fn save(&mut self, date: NaiveDate, items: &[InventoryItem]) -> Result<()> {
        let key = date_key(date);
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM snapshot_items WHERE date = ?1", params![key])?;
        tx.execute(
            "INSERT OR REPLACE INTO snapshots (date) VALUES (?1)",
            params![key],
        )?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO snapshot_items
                 (date, position, sku, us_stock, canada_stock, us_warehouses, canada_warehouses)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, item) in items.iter().enumerate() {
                stmt.execute(params![
                    key,
                    position as i64,
                    item.sku,
                    item.us_stock,
                    item.canada_stock,
                    encode_warehouses(&item.us_warehouses)?,
                    encode_warehouses(&item.canada_warehouses)?,
                ])?;
            }
        }

        tx.commit()?;
        log::info!("Saved snapshot {} ({} items)", key, items.len());
        Ok(())
    }

    /// Looks up the snapshot stored for exactly `date`
    pub fn get_by_date(&self, date: NaiveDate) -> Result<Option<InventorySnapshot>> {
        let key = date_key(date);
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT date FROM snapshots WHERE date = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(_) => Ok(Some(InventorySnapshot {
                date,
                items: self.load_items(&key)?,
            })),
            None => Ok(None),
        }
    }

    /// All stored snapshots, ordered by date descending, items in feed order
    pub fn list_all(&self) -> Result<Vec<InventorySnapshot>> {
        let mut snapshots = Vec::new();
        for key in self.all_keys_desc()? {
            let date = decode_date(&key)?;
            let items = self.load_items(&key)?;
            snapshots.push(InventorySnapshot { date, items });
        }
        Ok(snapshots)
    }

    /// The most recently dated snapshot, if any
    pub fn latest(&self) -> Result<Option<InventorySnapshot>> {
        let key: Option<String> =
            self.conn
                .query_row("SELECT MAX(date) FROM snapshots", [], |row| row.get(0))?;
        self.load_keyed(key)
    }

    /// The snapshot with the greatest date strictly less than `date`.
    ///
    /// Strictness matters: re-uploading a feed for an already-stored date
    /// must diff against the snapshot before that date, not against itself.
    pub fn get_latest_before(&self, date: NaiveDate) -> Result<Option<InventorySnapshot>> {
        let key: Option<String> = self.conn.query_row(
            "SELECT MAX(date) FROM snapshots WHERE date < ?1",
            params![date_key(date)],
            |row| row.get(0),
        )?;
        self.load_keyed(key)
    }

    /// One point per stored snapshot for `sku`, ascending by date.
    ///
    /// A snapshot lacking the SKU contributes zeros (absence is not an
    /// error). If a snapshot holds duplicate rows for the SKU, the first
    /// occurrence in feed order is used.
    pub fn get_item_history(&self, sku: &str) -> Result<Vec<HistoryPoint>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT s.date,
                    COALESCE(i.us_stock, 0),
                    COALESCE(i.canada_stock, 0)
             FROM snapshots s
             LEFT JOIN snapshot_items i
               ON i.date = s.date
              AND i.sku = ?1
              AND i.position = (SELECT MIN(position) FROM snapshot_items x
                                WHERE x.date = s.date AND x.sku = ?1)
             ORDER BY s.date ASC",
        )?;

        let rows = stmt.query_map(params![sku], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut points = Vec::new();
        for row in rows {
            let (key, us_stock, canada_stock) = row?;
            points.push(HistoryPoint {
                date: decode_date(&key)?,
                us_stock: us_stock as u32,
                canada_stock: canada_stock as u32,
            });
        }
        Ok(points)
    }

    /// Number of stored snapshots
    pub fn snapshot_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn all_keys_desc(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT date FROM snapshots ORDER BY date DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn load_keyed(&self, key: Option<String>) -> Result<Option<InventorySnapshot>> {
        match key {
            Some(key) => Ok(Some(InventorySnapshot {
                date: decode_date(&key)?,
                items: self.load_items(&key)?,
            })),
            None => Ok(None),
        }
    }

    /// Loads one snapshot's items in feed order, re-deriving statuses from
    /// the stored stock numbers.
    fn load_items(&self, key: &str) -> Result<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT sku, us_stock, canada_stock, us_warehouses, canada_warehouses
             FROM snapshot_items
             WHERE date = ?1
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map(params![key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (sku, us_stock, canada_stock, us_raw, ca_raw) = row?;
            items.push(InventoryItem::new(
                sku,
                us_stock as u32,
                canada_stock as u32,
                decode_warehouses(&us_raw)?,
                decode_warehouses(&ca_raw)?,
            ));
        }
        Ok(items)
    }
}

/// Initialize the snapshot schema
///
/// Creates tables if they don't exist:
/// - `snapshots`: one row per stored date (the primary key)
/// - `snapshot_items`: per-SKU records, ordered by `position` to preserve
///   feed order
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS snapshots (
            date TEXT NOT NULL PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS snapshot_items (
            date              TEXT NOT NULL,
            position          INTEGER NOT NULL,
            sku               TEXT NOT NULL,
            us_stock          INTEGER NOT NULL,
            canada_stock      INTEGER NOT NULL,
            us_warehouses     TEXT NOT NULL,
            canada_warehouses TEXT NOT NULL,
            PRIMARY KEY (date, position),
            FOREIGN KEY (date) REFERENCES snapshots(date) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_snapshot_items_sku ON snapshot_items(sku);
        ",
    )?;
    log::debug!("Snapshot schema initialized");
    Ok(())
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A stored key that no longer parses as a date means the database was
/// tampered with or corrupted.
fn decode_date(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|e| Error::Corrupt(format!("bad snapshot date '{}': {}", key, e)))
}

fn encode_warehouses(map: &BTreeMap<String, u32>) -> Result<String> {
    serde_json::to_string(map).map_err(|e| Error::Corrupt(e.to_string()))
}

fn decode_warehouses(raw: &str) -> Result<BTreeMap<String, u32>> {
    serde_json::from_str(raw).map_err(|e| Error::Corrupt(format!("bad warehouse map: {}", e)))
}
