// src/main.rs

use std::path::Path;
use std::sync::Arc;

use dotenvy::dotenv;
use quiz_backend::config::Config;
use quiz_backend::engine::{ExamEngine, ExamSettings};
use quiz_backend::routes;
use quiz_backend::seed::seed_if_empty;
use quiz_backend::state::AppState;
use quiz_backend::store::{MemoryStore, PgStore, Store};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = match PgStore::connect(url).await {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!("Failed to connect to database: {}", e);
                    return;
                }
            };
            if let Err(e) = store.migrate().await {
                tracing::error!("Failed to run database migrations: {}", e);
                return;
            }
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    // Seed the question bank on first boot
    if let Err(e) = seed_if_empty(store.as_ref(), Path::new(&config.seed_file)).await {
        tracing::error!("Failed to seed question bank: {}", e);
        return;
    }

    let engine = ExamEngine::new(store, ExamSettings::from(&config));
    let state = AppState::new(engine, config.clone());

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            return;
        }
    };
    tracing::info!("Listening on {}", config.listen_addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
