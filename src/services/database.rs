//! SQLite connection pool, schema migrations and sample data.

use log::{debug, info};
use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, migrate};

use crate::errors::WikiError;
use crate::services::PageRepository;

/// Pages inserted by `init-db` when their uid is not taken yet.
pub const SAMPLE_PAGES: &[(&str, &str, &str)] = &[
    ("100", "Page 100", "<p>Sample page 100</p>"),
    ("101", "Page 101", "<p>Sample page 101</p>"),
];

/// Create the database if it doesn't already exist.
pub async fn create_database(url: &str) -> Result<(), WikiError> {
    if !Sqlite::database_exists(url).await? {
        info!("Creating database {}", url);
        Sqlite::create_database(url).await?;
    }
    Ok(())
}

/// Create a connection pool.
pub async fn connection_pool(url: &str, max_connections: u32) -> Result<SqlitePool, WikiError> {
    debug!("Connecting to {} with up to {} connections", url, max_connections);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Embedded migrations.
pub fn migrations() -> Migrator {
    migrate!()
}

/// Run any pending database migrations from inside the application.
pub async fn run_pending_migrations(pool: &SqlitePool) -> Result<(), WikiError> {
    migrations().run(pool).await?;
    Ok(())
}

/// Create, connect and migrate in one step.
pub async fn open(url: &str, max_connections: u32) -> Result<SqlitePool, WikiError> {
    create_database(url).await?;
    let pool = connection_pool(url, max_connections).await?;
    run_pending_migrations(&pool).await?;
    Ok(pool)
}

/// Insert the sample pages that are missing; returns how many were added.
pub async fn seed_sample_pages(pool: &SqlitePool) -> Result<usize, WikiError> {
    let mut tx = pool.begin().await?;
    let mut added = 0;
    {
        let mut pages = PageRepository::new(&mut tx);
        for (uid, title, body) in SAMPLE_PAGES {
            if pages.get(uid).await?.is_none() {
                pages.insert_with_uid(uid, title, body).await?;
                added += 1;
            }
        }
    }
    tx.commit().await?;
    info!("Seeded {} sample pages", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = open("sqlite::memory:", 1).await.unwrap();
        assert_eq!(seed_sample_pages(&pool).await.unwrap(), 2);
        assert_eq!(seed_sample_pages(&pool).await.unwrap(), 0);

        let mut conn = pool.acquire().await.unwrap();
        let page = PageRepository::new(&mut conn).get("100").await.unwrap().unwrap();
        assert_eq!(page.title, "Page 100");
        assert!(page.body.contains("Sample page 100"));
    }
}
