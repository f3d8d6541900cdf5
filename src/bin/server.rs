use std::{env, fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router, middleware,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_webhook::{
    AppState, GoogleSheetsStore, RetryPolicy, SheetsConfig, build_router, graceful_shutdown,
    logging_middleware,
};

/// The webhook server for recording expenses in Google Sheets.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The ID of the Google Sheets spreadsheet to append rows to.
    #[arg(long)]
    spreadsheet_id: String,

    /// The name of the sheet tab within the spreadsheet.
    #[arg(long, default_value = "Expense_Tracking")]
    sheet_name: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let access_token = env::var("SHEETS_ACCESS_TOKEN")
        .expect("The environment variable 'SHEETS_ACCESS_TOKEN' must be set");

    let store = GoogleSheetsStore::new(SheetsConfig::new(
        args.spreadsheet_id,
        args.sheet_name,
        access_token,
    ))
    .expect("Could not create the Google Sheets client.");

    let state = AppState::new(store, RetryPolicy::default());

    let health = state.health.check().await;
    if health.store_connected {
        tracing::info!("Google Sheets store connected successfully");
    } else {
        tracing::warn!("Google Sheets store not connected - check configuration");
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start the server.");

    tracing::info!("Shutting down");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("expense_tracker.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
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
        // Failures are logged where they are classified, so disable the
        // default 5xx logging.
        .on_failure(());

    router.layer(tracing_layer)
}
