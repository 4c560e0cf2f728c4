use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;

use device_monitor::api::{self, AppState};
use device_monitor::cli::Cli;
use device_monitor::config::Config;
use device_monitor::db::create_pool;
use device_monitor::logging::init_logging;
use device_monitor::metrics::AppMetrics;
use device_monitor::repository::TelemetryRepository;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env().unwrap_or_else(|err| {
        tracing::error!("{}", err);
        std::process::exit(1);
    });
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let pool = create_pool(&config.database_url)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Failed to open database: {}", err);
            std::process::exit(1);
        });

    let metrics = AppMetrics::new().unwrap_or_else(|err| {
        tracing::error!("Failed to register metrics: {}", err);
        std::process::exit(1);
    });

    let state = AppState {
        repo: Arc::new(TelemetryRepository::new(pool)),
        metrics: Arc::new(metrics),
    };

    let app = api::router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        });

    tracing::info!("Listening on {}", addr);
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
