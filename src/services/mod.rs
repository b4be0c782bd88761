pub mod database;
pub mod page_repository;
pub mod session_service;

pub use page_repository::{PageRepository, next_uid};
pub use session_service::{SESSION_COOKIE, SessionService};
