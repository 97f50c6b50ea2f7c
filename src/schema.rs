//! Database schema management for `stationdash`.
//!
//! Ensures required tables exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::SqlitePool;

// ---

/// Create the database schema (idempotent).
///
/// Creates the `kv_blobs` table backing the history store. The store keeps
/// the whole history as one JSON blob under a fixed key, so a plain
/// key-value table is all the schema there is. Safe to call on every
/// startup; no-op if the table already exists.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_blobs (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
