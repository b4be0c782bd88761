//! Tutorial Wiki - a small wiki with cookie login and ACL-guarded editing
//!
//! Pages live in SQLite, users come from configuration, and every route is
//! declared once in [`routes::Route`] together with the permission it needs.

pub mod components;
pub mod config;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod logger;
pub mod routes;
pub mod security;
pub mod services;
pub mod types;
pub mod utils;

use std::sync::Arc;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

// Re-export commonly used items
pub use config::{Config, UserConfig};
pub use errors::WikiError;
pub use routes::Route;
pub use security::{Acl, Permission, Principal, SecurityPolicy};
pub use services::{PageRepository, SessionService};
pub use types::{AppState, Page, SessionData};

use components::TemplateComponent;

/// Open the database and build the shared state from configuration
pub async fn build_state(config: &Config) -> Result<AppState, WikiError> {
    let pool = services::database::open(&config.database_url, config.max_connections).await?;
    let security = SecurityPolicy::from_config(config)?;
    let sessions = SessionService::new(config);
    let templates = Arc::new(TemplateComponent::new(&config.template_dir));
    Ok(AppState {
        pool,
        security,
        sessions,
        templates,
    })
}

/// The application router for the given state
pub fn app(state: AppState) -> Router {
    routes::build_router(state)
}

/// Serve the application on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), WikiError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Wiki listening on http://{}", addr);
    }
    axum::serve(listener, app(state)).await.map_err(WikiError::from)
}

/// Bind to the configured address and serve until the process stops
pub async fn serve(config: Config) -> Result<(), WikiError> {
    let addr = config.socket_addr()?;
    let state = build_state(&config).await?;
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}
