use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use momo_dashboard::{
    AppState, DashboardConfig, SourceFormat, build_router, graceful_shutdown, logging_middleware,
};

/// A web dashboard for mobile money transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the transactions API, e.g., "http://localhost:5000".
    #[arg(long)]
    api_url: String,

    /// The kind of API served at `api_url`.
    #[arg(long, value_enum, default_value_t = SourceFormat::Sms)]
    source: SourceFormat,

    /// The API key for the hosted source.
    #[arg(long, env = "MOMO_API_KEY")]
    api_key: Option<String>,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The number of table rows per page.
    #[arg(long, default_value_t = 10)]
    page_size: u64,

    /// How long to wait for more refresh requests before fetching, in milliseconds.
    #[arg(long, default_value_t = 300)]
    refresh_delay_ms: u64,

    /// How long a request to the API may take, in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// The unit shown next to amounts.
    #[arg(long, default_value = "RWF")]
    currency: String,

    /// Where to write the debug log.
    #[arg(long, default_value = "debug.log")]
    log_file: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_file);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let config = DashboardConfig {
        api_url: args.api_url,
        source: args.source,
        api_key: args.api_key,
        page_size: args.page_size,
        refresh_delay: Duration::from_millis(args.refresh_delay_ms),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        currency: args.currency,
    };

    let state = AppState::new(&config).expect("Could not create the app state.");
    state.refresher.load();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging(log_file: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
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
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
