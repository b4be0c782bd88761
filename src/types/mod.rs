use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::components::TemplateComponent;
use crate::security::SecurityPolicy;
use crate::services::SessionService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub security: SecurityPolicy,
    pub sessions: SessionService,
    pub templates: Arc<TemplateComponent>,
}

/// A stored wiki page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Page {
    /// Storage id, assigned by the database.
    pub id: i64,
    /// Public short identifier used in URLs.
    pub uid: String,
    pub title: String,
    /// HTML body, rendered as-is.
    pub body: String,
}

/// Per-browser session data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub counter: u64,
}

/// Template rendering context
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub title: String,
    pub content: String,
    pub navigation: String,
}
