use std::io;
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

/// Custom error types for the wiki application
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("page not found: {0}")]
    PageNotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
    #[error("cookie signing error: {0}")]
    Signing(String),
    #[error("template error: {0}")]
    TemplateError(String),
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::PageNotFound(uid) => {
                log::warn!("Page not found: '{}'", uid);
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            WikiError::Config(e) => {
                log::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error").into_response()
            }
            other => {
                // Storage and crypto details stay in the log, not in the body.
                log::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_not_found_maps_to_404() {
        let response = WikiError::PageNotFound("abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_map_to_500() {
        let response = WikiError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = WikiError::Signing("bad key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
