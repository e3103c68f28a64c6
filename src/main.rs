//! Card Economy Engine service binary
//!
//! Wires the storage layers, loads the card master table, builds the sell
//! and trade engines, and serves the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --data-dir data/persist --port 5173
//! cargo run -- --data-dir data/persist --mirror-dir data/mirror --daily-limit 5
//! ```
//!
//! Documents live as JSON files under the data directory. When a mirror
//! directory is given, reads fall back to it if the primary fails and writes
//! go to whichever layer accepts them first.

use card_economy_engine::api::{self, Api};
use card_economy_engine::cli;
use card_economy_engine::core::{
    LedgerStore, LockTable, QuotaStore, SellEngine, SessionStore, TradeEngine,
};
use card_economy_engine::{BlobStore, CardCatalog, FileStore, LayeredStore};
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::parse_args();

    // Primary file store, with an optional mirror layered behind it
    let store: Arc<dyn BlobStore> = match &args.mirror_dir {
        Some(mirror) => Arc::new(LayeredStore::new(vec![
            Arc::new(FileStore::new(&args.data_dir)),
            Arc::new(FileStore::new(mirror)),
        ])),
        None => Arc::new(FileStore::new(&args.data_dir)),
    };

    let catalog = match CardCatalog::load(store.as_ref()) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!("Error: failed to load card master table: {}", e);
            process::exit(1);
        }
    };

    let ledger = LedgerStore::new(store.clone());
    let quota = QuotaStore::new(store.clone());
    let sessions = SessionStore::new(store.clone());
    let locks = Arc::new(LockTable::new());

    let api = Api {
        sell: Arc::new(SellEngine::new(
            catalog,
            ledger.clone(),
            quota,
            locks.clone(),
            args.daily_limit,
        )),
        trade: Arc::new(TradeEngine::new(ledger.clone(), sessions, locks)),
        ledger,
    };

    let addr = SocketAddr::new(args.bind, args.port);
    tracing::info!(%addr, daily_limit = args.daily_limit, "card economy engine listening");
    warp::serve(api::routes(api)).run(addr).await;
}
