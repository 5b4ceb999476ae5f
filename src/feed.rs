//! Feed normalization: raw CSV export text -> per-SKU inventory records.
//!
//! Feeds may start with a single line holding the snapshot date; everything
//! after that is a delimited table whose header row names the warehouse
//! columns. Column roles are fixed: `SKU` identifies the item, one column is
//! the Canadian warehouse, a short ignore list contributes to neither
//! market, and every remaining column is a US warehouse.

use crate::error::Result;
use crate::models::InventoryItem;
use chrono::{NaiveDate, Utc};
use log::debug;
use std::collections::BTreeMap;

/// Column holding the item identifier
pub const ID_COLUMN: &str = "SKU";

/// The single fixed Canadian warehouse column
pub const CANADA_WAREHOUSE: &str = "Prescott, ON";

/// Columns that contribute to neither market
pub const IGNORED_COLUMNS: &[&str] = &["Returns"];

/// A leading date line must stay under this length to be recognized
const MAX_DATE_LINE_LEN: usize = 50;

/// Date formats accepted on the leading date line
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Result of normalizing one feed export
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Per-SKU records in feed order. Duplicate SKU rows are kept as-is.
    pub items: Vec<InventoryItem>,
    /// Snapshot date: from the leading date line, or today (UTC) without one
    pub date: NaiveDate,
    /// Whether the feed carried its own date line
    pub explicit_date: bool,
    /// Rows excluded because they had no identifier value
    pub dropped_rows: usize,
}

/// Parses one feed export into per-SKU records plus the resolved snapshot
/// date.
///
/// Rows without an identifier are dropped (counted, not an error). A
/// structurally unparsable table fails with [`crate::Error::Parse`] and
/// produces no items.
pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
    let (date, explicit_date, table) = split_date_line(content);

    // Strict (rectangular) parse: a row whose cell count differs from the
    // header is a structural failure, not a partial record.
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(table.as_bytes());

    let headers = rdr.headers()?.clone();
    let sku_idx = headers.iter().position(|h| h == ID_COLUMN);

    let mut items = Vec::new();
    let mut dropped_rows = 0;

    for record in rdr.records() {
        let record = record?;

        let sku = sku_idx.and_then(|i| record.get(i)).unwrap_or("");
        if sku.is_empty() {
            dropped_rows += 1;
            debug!("Dropping row without {} value: {:?}", ID_COLUMN, record);
            continue;
        }

        let mut us_stock: u32 = 0;
        let mut canada_stock: u32 = 0;
        let mut us_warehouses = BTreeMap::new();
        let mut canada_warehouses = BTreeMap::new();

        for (idx, header) in headers.iter().enumerate() {
            if Some(idx) == sku_idx {
                continue;
            }
            let qty = cell_to_quantity(record.get(idx).unwrap_or(""));

            if header == CANADA_WAREHOUSE {
                canada_stock += qty;
                // The Canada bucket is always recorded, zero included
                canada_warehouses.insert(header.to_string(), qty);
            } else if IGNORED_COLUMNS.contains(&header) {
                // Contributes to neither market
            } else {
                us_stock += qty;
                // Keep the US breakdown sparse
                if qty > 0 {
                    us_warehouses.insert(header.to_string(), qty);
                }
            }
        }

        items.push(InventoryItem::new(
            sku,
            us_stock,
            canada_stock,
            us_warehouses,
            canada_warehouses,
        ));
    }

    Ok(ParsedFeed {
        items,
        date,
        explicit_date,
        dropped_rows,
    })
}

/// Coerces one table cell to a quantity.
///
/// Integer parse first, then float truncated toward zero (some exports write
/// whole numbers as "3.0"); negative or non-numeric values become 0.
pub fn cell_to_quantity(raw: &str) -> u32 {
    let value = raw.trim();
    if value.is_empty() {
        return 0;
    }
    if let Ok(n) = value.parse::<u32>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Today's date in UTC, used when a feed carries no date line
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Splits an explicit leading date line off the feed, if present.
///
/// Returns the snapshot date, whether it was explicit, and the remaining
/// table text.
fn split_date_line(content: &str) -> (NaiveDate, bool, &str) {
    let (first, rest) = match content.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (content, ""),
    };

    match parse_date_line(first.trim_end_matches('\r').trim()) {
        Some(date) => (date, true, rest),
        None => (today_utc(), false, content),
    }
}

/// A line is a date line iff it is short, contains no field separator, and
/// parses as a calendar date in one of the accepted formats.
fn parse_date_line(line: &str) -> Option<NaiveDate> {
    if line.is_empty() || line.len() >= MAX_DATE_LINE_LEN || line.contains(',') {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(line, fmt).ok())
}
