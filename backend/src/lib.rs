//! # Family Rewards Backend
//!
//! Task and reward points ledger for a single family. Children complete
//! tasks and request rewards; parents approve or reject both. A child's
//! spendable balance always accounts for work awaiting approval and for
//! rewards already requested.
//!
//! - **Domain** ([`domain`]): ledger rules, command reducer, family store
//! - **Storage** ([`storage`]): key-value persistence (SQLite or in-memory)
//! - **IO** ([`io`]): axum REST endpoints
//! - **Config** ([`config`]): environment-driven settings

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use config::AppConfig;
use domain::FamilyStore;
use storage::DbConnection;

/// Shared handler state. The mutex serializes mutations, so every command
/// sees the result of the one before it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<FamilyStore>>,
}

/// Open storage and load (or seed) the family store.
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Opening database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;
    let store = FamilyStore::load(Arc::new(db), &config.seed).await?;

    Ok(AppState {
        store: Arc::new(Mutex::new(store)),
    })
}

pub fn create_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .nest("/api", io::rest::router())
        .layer(cors)
        .with_state(state)
}
