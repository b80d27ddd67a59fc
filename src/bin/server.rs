use std::{
    fs::OpenOptions,
    net::IpAddr,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use financas_rs::{AppState, Settings, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for financas_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON settings file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// File path to the application SQLite database, overrides the settings file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// The port to serve the API from, overrides the settings file.
    #[arg(short, long)]
    port: Option<u16>,

    /// The IP address to bind to, overrides the settings file.
    #[arg(long)]
    host: Option<IpAddr>,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();

    let mut settings = match Settings::load(&args.config) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(db_path) = args.db_path {
        settings.db_path = db_path;
    }

    if let Some(port) = args.port {
        settings.server.port = port;
    }

    if let Some(host) = args.host {
        settings.server.ip = host;
    }

    let connection = match Connection::open(&settings.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!(
                "Could not open the database {}: {error}",
                settings.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let addr = settings.server.socket_addr();
    let state = match AppState::new(connection, settings) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

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

    Ok(())
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
        // Errors are logged when they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
