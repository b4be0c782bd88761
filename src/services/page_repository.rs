use log::{debug, info, warn};
use sqlx::SqliteConnection;

use crate::errors::WikiError;
use crate::types::Page;

/// Generate a short public identifier for a new page.
///
/// Eight hex characters of a random UUID; collisions are left to the UNIQUE
/// constraint on `pages.uid`.
pub fn next_uid() -> String {
    let mut uid = uuid::Uuid::new_v4().simple().to_string();
    uid.truncate(8);
    uid
}

/// Repository for wiki pages over a caller-supplied connection.
///
/// Handlers pass the connection of their request transaction, so every write
/// made here commits or rolls back with that transaction.
pub struct PageRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PageRepository<'c> {
    /// Create a new page repository
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// All pages ordered by title
    pub async fn list(&mut self) -> Result<Vec<Page>, WikiError> {
        let pages = sqlx::query_as::<_, Page>(
            "SELECT id, uid, title, body FROM pages ORDER BY title ASC, id ASC",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        debug!("Listed {} pages", pages.len());
        Ok(pages)
    }

    /// Fetch a page by its public uid
    pub async fn get(&mut self, uid: &str) -> Result<Option<Page>, WikiError> {
        let page = sqlx::query_as::<_, Page>("SELECT id, uid, title, body FROM pages WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&mut *self.conn)
            .await?;
        if page.is_none() {
            debug!("No page with uid '{}'", uid);
        }
        Ok(page)
    }

    /// Create a page under a freshly generated uid
    pub async fn create(&mut self, title: &str, body: &str) -> Result<Page, WikiError> {
        let uid = next_uid();
        self.insert_with_uid(&uid, title, body).await
    }

    /// Insert a page under a caller-chosen uid
    pub async fn insert_with_uid(&mut self, uid: &str, title: &str, body: &str) -> Result<Page, WikiError> {
        let result = sqlx::query("INSERT INTO pages (uid, title, body) VALUES ($1, $2, $3)")
            .bind(uid)
            .bind(title)
            .bind(body)
            .execute(&mut *self.conn)
            .await?;
        let page = Page {
            id: result.last_insert_rowid(),
            uid: uid.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        };
        info!("Created page '{}' ({})", page.uid, page.title);
        Ok(page)
    }

    /// Replace title and body in place; uid and id are untouched
    pub async fn update(&mut self, uid: &str, title: &str, body: &str) -> Result<Page, WikiError> {
        let result = sqlx::query("UPDATE pages SET title = $1, body = $2 WHERE uid = $3")
            .bind(title)
            .bind(body)
            .bind(uid)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            warn!("Update of missing page '{}'", uid);
            return Err(WikiError::PageNotFound(uid.to_string()));
        }
        info!("Updated page '{}'", uid);
        self.get(uid)
            .await?
            .ok_or_else(|| WikiError::PageNotFound(uid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database;
    use sqlx::SqlitePool;

    async fn pool() -> SqlitePool {
        database::open("sqlite::memory:", 1).await.unwrap()
    }

    #[test]
    fn uids_are_short_hex() {
        let uid = next_uid();
        assert_eq!(uid.len(), 8);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(next_uid(), next_uid());
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut pages = PageRepository::new(&mut conn);

        let created = pages.create("Page 100", "<p>Sample page 100</p>").await.unwrap();
        let fetched = pages.get(&created.uid).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(fetched.body.contains("Sample page 100"));
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut pages = PageRepository::new(&mut conn);

        let created = pages.create("Draft", "<p>old</p>").await.unwrap();
        let updated = pages.update(&created.uid, "Final", "<p>new</p>").await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.uid, created.uid);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.body, "<p>new</p>");
    }

    #[tokio::test]
    async fn update_of_unknown_uid_fails() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = PageRepository::new(&mut conn).update("nope", "t", "b").await.unwrap_err();
        assert!(matches!(err, WikiError::PageNotFound(uid) if uid == "nope"));
    }

    #[tokio::test]
    async fn list_is_sorted_by_title() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut pages = PageRepository::new(&mut conn);
        for title in ["Zebra", "apple", "Mango", "Banana"] {
            pages.create(title, "<p>x</p>").await.unwrap();
        }
        let titles: Vec<String> = pages.list().await.unwrap().into_iter().map(|p| p.title).collect();
        // Byte order, as SQLite's default BINARY collation sorts.
        assert_eq!(titles, vec!["Banana", "Mango", "Zebra", "apple"]);
    }

    #[tokio::test]
    async fn duplicate_uid_is_a_storage_error() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut pages = PageRepository::new(&mut conn);
        pages.insert_with_uid("abc", "One", "<p>1</p>").await.unwrap();
        let err = pages.insert_with_uid("abc", "Two", "<p>2</p>").await.unwrap_err();
        assert!(matches!(err, WikiError::Database(_)));
    }

    #[tokio::test]
    async fn interleaved_edits_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("edits.sqlite").display());
        let pool = database::open(&url, 4).await.unwrap();
        {
            let mut conn = pool.acquire().await.unwrap();
            PageRepository::new(&mut conn).insert_with_uid("p1", "Start", "<p>0</p>").await.unwrap();
            PageRepository::new(&mut conn).insert_with_uid("p2", "Other", "<p>0</p>").await.unwrap();
        }

        // Both edits are open before either writes; each writes before reading.
        let mut a = pool.begin().await.unwrap();
        let mut b = pool.begin().await.unwrap();
        PageRepository::new(&mut a).update("p1", "A", "<p>a</p>").await.unwrap();
        a.commit().await.unwrap();
        let page = PageRepository::new(&mut b).update("p1", "B", "<p>b</p>").await.unwrap();
        b.commit().await.unwrap();
        assert_eq!(page.title, "B");

        // A write to a different page in between does not fail the later edit either.
        let mut c = pool.begin().await.unwrap();
        let mut d = pool.begin().await.unwrap();
        PageRepository::new(&mut c).update("p2", "C", "<p>c</p>").await.unwrap();
        c.commit().await.unwrap();
        PageRepository::new(&mut d).update("p1", "D", "<p>d</p>").await.unwrap();
        d.commit().await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut pages = PageRepository::new(&mut conn);
        assert_eq!(pages.get("p1").await.unwrap().unwrap().title, "D");
        assert_eq!(pages.get("p2").await.unwrap().unwrap().title, "C");
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let pool = pool().await;
        {
            let mut tx = pool.begin().await.unwrap();
            PageRepository::new(&mut tx).create("Lost", "<p>gone</p>").await.unwrap();
        }
        let mut conn = pool.acquire().await.unwrap();
        assert!(PageRepository::new(&mut conn).list().await.unwrap().is_empty());
    }
}
