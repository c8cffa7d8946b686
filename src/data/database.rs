//! SQLite record store
//!
//! One `Database` wraps one client's file. All statements are
//! parameterized; reads come back in insertion (rowid) order.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Instant;

use super::models::*;
use crate::error::AppError;
use crate::metrics;

const MAX_CONNECTIONS: u32 = 4;

/// Database connection pool wrapper for one client store
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the store at `path`, creating and seeding it on first use.
    ///
    /// A missing file is not an error: it is created, migrated and given
    /// the seed record.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let is_new = !path.exists();

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        let db = Self { pool };

        if is_new {
            db.insert_record(&AccountRecord::seed()).await?;
            tracing::info!(path = %path.display(), "Client store created with seed record");
        }

        Ok(db)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record in the store
    pub async fn list_records(&self) -> Result<Vec<AccountRecord>, AppError> {
        let started = Instant::now();
        let records = sqlx::query_as::<_, AccountRecord>(
            "SELECT graph, user, followers, following FROM connections ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        metrics::observe_db_query("list_records", started.elapsed());

        Ok(records)
    }

    /// Every record belonging to `graph`
    pub async fn list_graph_records(&self, graph: &str) -> Result<Vec<AccountRecord>, AppError> {
        let started = Instant::now();
        let records = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT graph, user, followers, following FROM connections
            WHERE graph = ?
            ORDER BY rowid
            "#,
        )
        .bind(graph)
        .fetch_all(&self.pool)
        .await?;
        metrics::observe_db_query("list_graph_records", started.elapsed());

        Ok(records)
    }

    /// First record stored for `account` within `graph`
    pub async fn find_record(
        &self,
        graph: &str,
        account: &str,
    ) -> Result<Option<AccountRecord>, AppError> {
        let started = Instant::now();
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT graph, user, followers, following FROM connections
            WHERE graph = ? AND user = ?
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(graph)
        .bind(account)
        .fetch_optional(&self.pool)
        .await?;
        metrics::observe_db_query("find_record", started.elapsed());

        Ok(record)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append one record. Existing rows with the same graph/account stay.
    pub async fn insert_record(&self, record: &AccountRecord) -> Result<(), AppError> {
        let started = Instant::now();
        sqlx::query(
            r#"
            INSERT INTO connections (graph, user, followers, following)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.graph)
        .bind(&record.account)
        .bind(&record.followers)
        .bind(&record.following)
        .execute(&self.pool)
        .await?;
        metrics::observe_db_query("insert_record", started.elapsed());
        metrics::RECORDS_INSERTED_TOTAL.inc();

        Ok(())
    }

    /// Remove every record of `graph`
    ///
    /// # Returns
    /// Number of rows removed
    pub async fn delete_graph(&self, graph: &str) -> Result<u64, AppError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM connections WHERE graph = ?")
            .bind(graph)
            .execute(&self.pool)
            .await?;
        metrics::observe_db_query("delete_graph", started.elapsed());
        metrics::RECORDS_DELETED_TOTAL
            .with_label_values(&["graph"])
            .inc_by(result.rows_affected());

        Ok(result.rows_affected())
    }

    /// Remove every record of `account`, across all graphs
    ///
    /// # Returns
    /// Number of rows removed
    pub async fn delete_account(&self, account: &str) -> Result<u64, AppError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM connections WHERE user = ?")
            .bind(account)
            .execute(&self.pool)
            .await?;
        metrics::observe_db_query("delete_account", started.elapsed());
        metrics::RECORDS_DELETED_TOTAL
            .with_label_values(&["account"])
            .inc_by(result.rows_affected());

        Ok(result.rows_affected())
    }
}
