//! SQLite-backed credential and secret storage.

use glasshouse_common::GlasshouseError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use super::models::{SecretRow, UserRow};
use super::schema::SQLITE_INIT;

pub type SqlitePool = Pool<Sqlite>;

/// Storage service wrapping the SQLite pool
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, GlasshouseError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GlasshouseError> {
        // execute statements one by one (sqlx::query rejects multi-command strings)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a new user row. The unique constraint on `username` is the
    /// only guard against duplicates; violations surface as
    /// `GlasshouseError::Database` and can be classified with
    /// `is_unique_violation()`.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<(), GlasshouseError> {
        sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Look up a user by exact username match
    pub async fn find_user(&self, username: &str) -> Result<Option<UserRow>, GlasshouseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a secret row. Always parameterized; no mode toggle reaches
    /// this path.
    pub async fn insert_secret(
        &self,
        id: &str,
        secret: &str,
        pin: &str,
    ) -> Result<(), GlasshouseError> {
        sqlx::query("INSERT INTO secrets (id, secret, pin) VALUES (?, ?, ?)")
            .bind(id)
            .bind(secret)
            .bind(pin)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Query secrets with bound parameters. Inputs match literally.
    pub async fn secrets_matching(
        &self,
        id: &str,
        pin: &str,
    ) -> Result<Vec<SecretRow>, GlasshouseError> {
        let rows = sqlx::query_as::<_, SecretRow>(
            "SELECT id, secret, pin FROM secrets WHERE id = ? AND pin = ?",
        )
        .bind(id)
        .bind(pin)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// INTENTIONALLY UNSAFE: interpolates both inputs into the SQL text
    /// with no escaping, reproducing the injection surface the app
    /// demonstrates. Reached only through the vulnerable mode toggle;
    /// never call this from a hardened path.
    pub async fn secrets_matching_raw(
        &self,
        id: &str,
        pin: &str,
    ) -> Result<Vec<SecretRow>, GlasshouseError> {
        let sql = format!("SELECT id, secret, pin FROM secrets WHERE id = '{id}' AND pin = '{pin}'");
        tracing::debug!(query = %sql, "executing raw secrets query");
        let rows = sqlx::query_as::<_, SecretRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Storage {
        // single connection: every pool member of :memory: is its own db
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = Storage::from_pool(pool);
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let store = memory_store().await;
        store.create_user("mira", "pw").await.unwrap();

        let err = store.create_user("mira", "other").await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_secret_round_trip_parameterized() {
        let store = memory_store().await;
        store.insert_secret("a", "s", "1234").await.unwrap();
        store.insert_secret("a", "other", "9999").await.unwrap();
        store.insert_secret("b", "s2", "1234").await.unwrap();

        let rows = store.secrets_matching("a", "1234").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].secret, "s");

        let none = store.secrets_matching("a", "0000").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_raw_query_injection_returns_all_rows() {
        let store = memory_store().await;
        store.insert_secret("a", "s1", "1111").await.unwrap();
        store.insert_secret("b", "s2", "2222").await.unwrap();
        store.insert_secret("c", "s3", "3333").await.unwrap();

        // boolean tail in the pin position defeats the whole filter
        let rows = store
            .secrets_matching_raw("x", "' OR '1'='1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        // comment payload in the id position does the same
        let rows = store
            .secrets_matching_raw("' OR '1'='1' --", "x")
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        // the identical input matches literally on the parameterized path
        let rows = store.secrets_matching("x", "' OR '1'='1").await.unwrap();
        assert!(rows.is_empty());
    }
}
