//! Inventory Ops - Feed Diff & History CLI
//!
//! Ingests warehouse feed exports into the snapshot database, reports
//! stock-state transitions, and queries per-SKU history. All business logic
//! lives in the library; this binary is presentation only.

use clap::{Parser, Subcommand};
use inventory_ops::{
    aggregate, ingest_feed, preview_alerts, Alert, IngestOutcome, InventoryItem, Market,
    SnapshotStore,
};
use std::path::PathBuf;

/// Inventory feed diff & history engine
#[derive(Parser, Debug)]
#[command(name = "inventory_ops")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite snapshot database
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a feed export: diff against the prior snapshot, then save
    Ingest {
        /// Path to the feed CSV
        file: PathBuf,
        /// Emit the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dry run: show the alerts a feed would produce, saving nothing
    Alerts {
        /// Path to the feed CSV
        file: PathBuf,
        /// Emit the alerts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-market stats for the latest (or a given) stored snapshot
    Stats {
        /// Snapshot date (YYYY-MM-DD), defaults to the latest
        #[arg(long)]
        date: Option<String>,
        /// Emit the stats as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one SKU's stock time series
    History {
        sku: String,
        /// Emit the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored snapshot dates
    List,
}

/// Returns the default database path: ~/.local/share/inventory_ops/snapshots.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inventory_ops")
        .join("snapshots.db")
        .to_string_lossy()
        .to_string()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SnapshotStore::open(&args.database)?;

    match args.command {
        Command::Ingest { file, json } => {
            let content = std::fs::read_to_string(&file)?;
            let outcome = ingest_feed(&mut store, &content)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, false);
            }
        }
        Command::Alerts { file, json } => {
            let content = std::fs::read_to_string(&file)?;
            let outcome = preview_alerts(&store, &content)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.alerts)?);
            } else {
                print_outcome(&outcome, true);
            }
        }
        Command::Stats { date, json } => {
            let snapshot = match date {
                Some(d) => {
                    let date = chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d")?;
                    store.get_by_date(date)?
                }
                None => store.latest()?,
            };
            match snapshot {
                Some(snapshot) => {
                    let stats = aggregate(&snapshot.items);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&stats)?);
                    } else {
                        println!("Snapshot {}:", snapshot.date);
                        print_stats(&snapshot.items);
                    }
                }
                None => println!("No matching snapshot stored."),
            }
        }
        Command::History { sku, json } => {
            let history = store.get_item_history(&sku)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No snapshots stored yet.");
            } else {
                println!("{:<12} {:>8} {:>8}", "Date", "US", "Canada");
                for point in &history {
                    println!(
                        "{:<12} {:>8} {:>8}",
                        point.date.to_string(),
                        point.us_stock,
                        point.canada_stock
                    );
                }
            }
        }
        Command::List => {
            let snapshots = store.list_all()?;
            if snapshots.is_empty() {
                println!("No snapshots stored yet.");
            } else {
                for snapshot in &snapshots {
                    println!("{}  {} items", snapshot.date, snapshot.items.len());
                }
                println!("{} snapshot(s) total", snapshots.len());
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &IngestOutcome, dry_run: bool) {
    if dry_run {
        println!("Dry run for snapshot {}:", outcome.date);
    } else if outcome.replaced_existing {
        println!("Replaced snapshot {}:", outcome.date);
    } else {
        println!("Saved snapshot {}:", outcome.date);
    }
    println!(
        "  {} item(s), {} row(s) dropped without a SKU",
        outcome.items.len(),
        outcome.dropped_rows
    );
    print_stats(&outcome.items);
    print_alerts(&outcome.alerts);
}

fn print_stats(items: &[InventoryItem]) {
    let stats = aggregate(items);
    for market in Market::all() {
        let m = stats.for_market(*market);
        println!(
            "  {:<3} out of stock: {:>5}   low stock: {:>5}   in stock: {:>5}",
            market.as_str(),
            m.out_of_stock,
            m.low_stock,
            m.in_stock
        );
    }
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("  No stock transitions.");
        return;
    }
    println!("  {} alert(s):", alerts.len());
    for alert in alerts {
        println!(
            "  [{:<12}] {:<2} {:<20} {:>5} -> {:<5} {}",
            alert.kind.as_str(),
            alert.market.as_str(),
            alert.sku,
            alert.previous_qty,
            alert.new_qty,
            alert.message
        );
    }
}
