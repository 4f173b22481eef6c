//! Snack Inventory Tracking - Backend Server
//!
//! Weekly wastage/shortage ledger for a workplace snack-ordering platform,
//! with lifetime statistics, week-over-week comparison and re-order guidance.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod store;

pub use crate::config::Config;

use crate::config::{LogFormat, StorageBackend};
use shared::WeekStart;
use crate::store::{MemoryTrackingStore, PgTrackingStore, TrackingStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackingStore>,
    pub config: Arc<Config>,
    pub week_start: WeekStart,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackingStore>, config: Config) -> Result<Self, ::config::ConfigError> {
        let week_start = config.tracking.week_start()?;
        Ok(Self {
            store,
            config: Arc::new(config),
            week_start,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "snack_tracking_server=debug,tower_http=debug,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Snack Tracking Server");
    tracing::info!("Environment: {}", config.environment);

    let store = connect_store(&config).await?;
    tracing::info!("Tracking store: {}", store.name());

    // Create application state
    let state = AppState::new(store, config.clone())?;
    tracing::info!("Tracking weeks start on {}", state.week_start);

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured tracking store
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn TrackingStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory tracking store; records are lost on restart");
            Ok(Arc::new(MemoryTrackingStore::new()))
        }
        StorageBackend::Postgres => {
            if config.database.url.is_empty() {
                anyhow::bail!("database.url must be set when storage.backend is postgres");
            }

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgTrackingStore::new(db_pool)))
        }
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Snack Inventory Tracking API v1.0"
}
