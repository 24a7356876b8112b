//! order-reconciler: recompute order totals from their active lines.
//!
//! # Usage
//!
//! ```bash
//! # Report drift without writing
//! cargo run -p order-reconciler -- --dry-run
//!
//! # Fix every drifted order, 200 orders per page
//! DATABASE_URL=postgres://... cargo run -p order-reconciler -- --page-size 200
//! ```

use anyhow::Result;
use clap::Parser;

use order_reconciler::{DbTotals, reconcile};
use shop_core::cache::EntityCache;
use shop_core::config::{cache_from_env, connect_database, load_dotenv};
use shop_core::context::RequestContext;
use shop_core::tracing::init_tracing;
use shop_order::infra::db::{DbOrderItemRepository, DbOrderRepository};
use shop_order::state::ORDER_KEYS;

#[derive(Parser)]
#[command(about = "Re-roll order totals left stale by failed order sagas")]
struct Args {
    /// PostgreSQL URL of the order database
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Report drifted orders without rewriting them
    #[arg(long)]
    dry_run: bool,

    /// Orders read per page
    #[arg(long, default_value_t = 100)]
    page_size: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_tracing();
    let args = Args::parse();

    let db = connect_database(&args.database_url).await?;
    let store = DbTotals {
        orders: DbOrderRepository { db: db.clone() },
        items: DbOrderItemRepository { db },
    };
    let cache = EntityCache::new(cache_from_env("order")?, ORDER_KEYS);

    let report = reconcile(
        &store,
        &cache,
        &RequestContext::new(),
        args.page_size,
        args.dry_run,
    )
    .await?;

    for drift in &report.drifted {
        println!(
            "order {:>8}  stored {:>12}  computed {:>12}",
            drift.order_id, drift.stored, drift.computed
        );
    }
    println!();
    println!(
        "Scanned {} order(s), {} drifted, {} fixed{}",
        report.scanned,
        report.drifted.len(),
        report.fixed,
        if args.dry_run { " (dry run)" } else { "" }
    );
    Ok(())
}
