// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::http::HeaderName;
use clap::Parser;
use planner_common::{SystemClock, TaskStore};
use planner_server::config::Config;
use planner_server::file_store::JsonFileStore;
use planner_server::{AppState, routes};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting up the server...");

    let backend = JsonFileStore::new(&config.data_dir);
    tracing::info!("Tasks are stored under {}", backend.dir().display());
    let store = TaskStore::open(backend, SystemClock);

    let app_routes = routes::create_router(AppState::new(store));

    let cors = CorsLayer::new()
        .allow_methods(Any)
        // Headers the front end sends with JSON requests.
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ])
        .allow_origin(Any);

    let app = app_routes.layer(cors).layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {:?}", config.addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("The server listens on http://{}", config.addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {:?}", e);
        std::process::exit(1);
    }
    tracing::info!("Server stopped.");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {:?}", e);
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
