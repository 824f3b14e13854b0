use super::{CredentialStore, StoreError};
use crate::accounts::verifier::Verifier;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{Connection, PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{Instrument, info_span};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Credential store backed by the `credentials` table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and make sure the schema exists.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable or the schema cannot be applied.
    pub async fn connect(dsn: &SecretString) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .acquire_timeout(Duration::from_secs(10))
            .test_before_acquire(true)
            .connect(dsn.expose_secret())
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply `sql/schema.sql`; every statement is idempotent.
    ///
    /// # Errors
    /// Returns an error if any statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let span = info_span!("db.migrate", db.system = "postgresql");
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(())
    }
}

// PostgreSQL TEXT cannot hold NUL, so such a name can never be stored.
fn storable(username: &str) -> bool {
    !username.contains('\0')
}

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let query = "SELECT username FROM credentials";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(rows.iter().map(|row| row.get("username")).collect())
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        if !storable(username) {
            return Ok(false);
        }
        let query = "SELECT EXISTS(SELECT 1 FROM credentials WHERE username = $1) AS exists";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(row.get("exists"))
    }

    async fn get(&self, username: &str) -> Result<Option<Verifier>, StoreError> {
        if !storable(username) {
            return Ok(None);
        }
        let query = "SELECT verifier FROM credentials WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(row.map(|row| Verifier::from_phc(row.get("verifier"))))
    }

    async fn set(&self, username: &str, verifier: &Verifier) -> Result<(), StoreError> {
        if !storable(username) {
            return Err(StoreError::NulInUsername);
        }
        let query = r"
            INSERT INTO credentials (username, verifier)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET verifier = EXCLUDED.verifier
        ";
        sqlx::query(query)
            .bind(username)
            .bind(verifier.as_str())
            .execute(&self.pool)
            .instrument(query_span("UPSERT", query))
            .await?;

        Ok(())
    }

    async fn insert_new(&self, username: &str, verifier: &Verifier) -> Result<bool, StoreError> {
        if !storable(username) {
            return Err(StoreError::NulInUsername);
        }
        let query = r"
            INSERT INTO credentials (username, verifier)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
        ";
        let result = sqlx::query(query)
            .bind(username)
            .bind(verifier.as_str())
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, username: &str) -> Result<(), StoreError> {
        if !storable(username) {
            return Ok(());
        }
        let query = "DELETE FROM credentials WHERE username = $1";
        sqlx::query(query)
            .bind(username)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgresql"
    }
}
