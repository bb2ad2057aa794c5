//! Family Tree DPL
//!
//! REST persistence layer for the big/little family tree, with SQLite storage and
//! weighted subtree views.

mod api;
mod auth;
mod config;
mod csv_io;
mod db;
mod errors;
mod models;
mod tree;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::Credentials;
use config::{Config, LogFormat};
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Family Tree DPL");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_password.is_none() {
        tracing::warn!("No API password configured (DPL_API_PASSWORD). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let credentials = state
        .config
        .api_password
        .clone()
        .map(|password| Credentials {
            user: state.config.api_user.clone(),
            password,
        });

    // API routes
    let api_routes = Router::new()
        .route(
            "/brothers",
            get(api::list_brothers).post(api::create_brother),
        )
        .route(
            "/brothers/{nickname}",
            get(api::get_brother)
                .put(api::update_brother)
                .delete(api::delete_brother),
        )
        .route("/brothers/{nickname}/rekey", put(api::rekey_brother))
        .route("/brothers/{nickname}/littles", put(api::add_little))
        .route("/search", get(api::search_brothers))
        .route("/export", get(api::export_roster))
        .route("/import", post(api::import_roster))
        .layer(middleware::from_fn(move |req, next| {
            auth::basic_auth_layer(credentials.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
