use std::{
    fs::OpenOptions,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use moneta_rs::{
    AppState, CategoryCatalog, SQLiteRecurringStore, SQLiteTransactionStore, SweepScheduler,
    SystemClock, build_router, graceful_shutdown, initialize,
};

/// The REST API server for moneta_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Hours between recurring transaction sweeps.
    #[arg(long, default_value_t = 24)]
    sweep_interval_hours: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = Connection::open(&args.db_path).expect("Could not open the database.");
    initialize(&connection).expect("Could not initialize the database.");
    let connection = Arc::new(Mutex::new(connection));

    let recurring_store = SQLiteRecurringStore::new(connection.clone());
    let transaction_store = SQLiteTransactionStore::new(connection);
    let clock = SystemClock;

    let state = AppState::new(
        recurring_store.clone(),
        transaction_store.clone(),
        CategoryCatalog::default(),
        clock,
    );

    let scheduler = SweepScheduler::new(
        recurring_store,
        transaction_store,
        clock,
        Duration::from_secs(args.sweep_interval_hours * 60 * 60),
    )
    .start();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not serve the application.");

    scheduler.stop().await;
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(
                    filter::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| filter::EnvFilter::new("info")),
                )
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
