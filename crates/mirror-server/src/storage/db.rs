//! SQLite document store (embedded, no external dependencies)
//!
//! All three collections share one `documents` table. Bodies are stored as
//! JSON text and filters are evaluated with SQLite's JSON1 functions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mirror_core::{Collection, Document, DocumentStore, Filter, MirrorError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub async fn open(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. One connection, since every SQLite
    /// connection to `:memory:` sees its own database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        tracing::info!("SQLite connection established, creating schema...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                body TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_collection
            ON documents (collection, seq)
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn db_err(e: sqlx::Error) -> MirrorError {
    MirrorError::Database(e.to_string())
}

/// JSON path of a top-level field, quoted so odd keys stay literal
fn json_path(field: &str) -> mirror_core::Result<String> {
    if field.contains('"') || field.contains('\\') {
        return Err(MirrorError::InvalidFilter(format!(
            "unsupported field name: {}",
            field
        )));
    }
    Ok(format!("$.\"{}\"", field))
}

/// Appends ` AND <predicate>` for anything narrower than [`Filter::All`].
///
/// The bound value is JSON text; `json_extract(?, '$')` turns it back into
/// the same SQL value `json_extract` yields for the stored field, which keeps
/// integers and strings from comparing equal.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> mirror_core::Result<()> {
    match filter {
        Filter::All => {}
        Filter::Eq { field, value } => {
            qb.push(" AND json_extract(body, ")
                .push_bind(json_path(field)?)
                .push(") = json_extract(")
                .push_bind(serde_json::to_string(value)?)
                .push(", '$')");
        }
        Filter::In { field, values } => {
            qb.push(" AND json_extract(body, ")
                .push_bind(json_path(field)?)
                .push(") IN (SELECT value FROM json_each(")
                .push_bind(serde_json::to_string(values)?)
                .push("))");
        }
    }
    Ok(())
}

fn parse_rows(rows: Vec<(String,)>) -> mirror_core::Result<Vec<Document>> {
    rows.into_iter()
        .map(|(body,)| serde_json::from_str(&body).map_err(MirrorError::from))
        .collect()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> mirror_core::Result<u64> {
        let mut qb = QueryBuilder::new("DELETE FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter)?;

        let result = qb.build().execute(&*self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> mirror_core::Result<u64> {
        let mut qb = QueryBuilder::new(
            "DELETE FROM documents WHERE seq = (SELECT seq FROM documents WHERE collection = ",
        );
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter)?;
        qb.push(" ORDER BY seq LIMIT 1)");

        let result = qb.build().execute(&*self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: &[Document],
    ) -> mirror_core::Result<u64> {
        if docs.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for doc in docs {
            sqlx::query("INSERT INTO documents (collection, body) VALUES (?1, ?2)")
                .bind(collection.as_str())
                .bind(serde_json::to_string(doc)?)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;

        Ok(docs.len() as u64)
    }

    async fn insert_one(&self, collection: Collection, doc: &Document) -> mirror_core::Result<()> {
        sqlx::query("INSERT INTO documents (collection, body) VALUES (?1, ?2)")
            .bind(collection.as_str())
            .bind(serde_json::to_string(doc)?)
            .execute(&*self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> mirror_core::Result<Vec<Document>> {
        let mut qb = QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter)?;
        qb.push(" ORDER BY seq");

        let rows: Vec<(String,)> = qb
            .build_query_as()
            .fetch_all(&*self.pool)
            .await
            .map_err(db_err)?;

        parse_rows(rows)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> mirror_core::Result<Option<Document>> {
        let mut qb = QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter)?;
        qb.push(" ORDER BY seq LIMIT 1");

        let row: Option<(String,)> = qb
            .build_query_as()
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_err)?;

        Ok(parse_rows(row.into_iter().collect())?.pop())
    }

    /// Single statement, so the existence check and the insert cannot interleave
    async fn insert_one_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: &Document,
    ) -> mirror_core::Result<bool> {
        let mut qb = QueryBuilder::new("INSERT INTO documents (collection, body) SELECT ");
        qb.push_bind(collection.as_str())
            .push(", ")
            .push_bind(serde_json::to_string(doc)?)
            .push(" WHERE NOT EXISTS (SELECT 1 FROM documents WHERE collection = ")
            .push_bind(collection.as_str());
        push_filter(&mut qb, guard)?;
        qb.push(")");

        let result = qb.build().execute(&*self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn close(&self) {
        tracing::info!("Closing SQLite pool");
        self.pool.close().await;
    }
}
