//! Bounded, persisted history of weather readings.
//!
//! The dashboard keeps its whole trend history as one JSON blob under a
//! fixed key: every `record` rewrites the full newest-first array, capped at
//! a fixed retention length. Persistence is best-effort; the readings are
//! non-critical telemetry, so a failed write is logged and counted but never
//! surfaced to the caller, and a corrupt or missing blob reads back as an
//! empty history.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::models::{Reading, WindowAverage};

// ---

/// One string blob per string key. Backend-agnostic so tests can swap in an
/// in-memory fake for the SQLite table.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) the blob under `key`.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob under `key`; removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Durable blob store backed by the `kv_blobs` table.
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // ---
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM kv_blobs WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO kv_blobs (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // ---
        sqlx::query("DELETE FROM kv_blobs WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// In-memory blob store for tests. Writes can be made to fail so the
/// best-effort persistence policy stays observable.
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put`/`delete` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        // ---
        if self.fail_writes.load(Ordering::Relaxed) {
            anyhow::bail!("blob store is read-only");
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // ---
        if self.fail_writes.load(Ordering::Relaxed) {
            anyhow::bail!("blob store is read-only");
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---

/// Bounded, time-ordered history of readings with windowed queries.
///
/// Constructed from a blob store, the blob key and the retention cap, and
/// cheap to clone (the backend is shared). Invariants:
/// - every persisted reading carries a timestamp (stamped on `record`);
/// - the sequence is newest-first;
/// - the sequence never exceeds the cap (oldest readings drop off the tail).
#[derive(Clone)]
pub struct HistoryStore {
    blobs: Arc<dyn BlobStore>,
    key: String,
    capacity: usize,
    write_failures: Arc<AtomicU64>,
    // Serializes the load-modify-write in `record` across clones; the
    // poller and the request handlers all write the same blob.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl HistoryStore {
    pub fn new(blobs: Arc<dyn BlobStore>, key: impl Into<String>, capacity: usize) -> Self {
        // ---
        Self {
            blobs,
            key: key.into(),
            capacity,
            write_failures: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Prepend a reading, stamping it with the current time if the caller
    /// left the timestamp unset, and rewrite the persisted blob.
    ///
    /// Persistence is best-effort: a serialization or storage failure is
    /// logged and counted, and the call still returns normally.
    pub async fn record(&self, reading: Reading) {
        // ---
        let reading = reading.stamped(Utc::now());

        // Two overlapping recorders must not both load the same blob, or
        // the second put silently drops the first reading.
        let _guard = self.write_lock.lock().await;

        let mut history = self.load().await;
        history.insert(0, reading);
        history.truncate(self.capacity);

        match serde_json::to_string(&history) {
            Ok(blob) => {
                if let Err(e) = self.blobs.put(&self.key, &blob).await {
                    self.note_write_failure("store history blob", &e);
                }
            }
            Err(e) => self.note_write_failure("serialize history", &e.into()),
        }
    }

    /// The full retained sequence, newest-first. A missing or unparseable
    /// blob is treated as no data, never as an error.
    pub async fn all(&self) -> Vec<Reading> {
        self.load().await
    }

    /// Readings whose timestamp lies within `hours` of now. Readings with
    /// no timestamp are excluded.
    pub async fn for_window(&self, hours: u32) -> Vec<Reading> {
        // ---
        // A cutoff that underflows chrono's date range lies before all
        // time, so a window that wide includes every stamped reading.
        let cutoff = Utc::now().checked_sub_signed(Duration::hours(i64::from(hours)));
        self.load()
            .await
            .into_iter()
            .filter(|r| {
                r.timestamp
                    .is_some_and(|t| cutoff.map_or(true, |c| t >= c))
            })
            .collect()
    }

    /// Mean of every numeric field over `for_window(hours)`, or `None` when
    /// the window holds no readings.
    pub async fn average(&self, hours: u32) -> Option<WindowAverage> {
        WindowAverage::of(&self.for_window(hours).await)
    }

    /// Drop the persisted blob entirely; `all` returns empty afterwards.
    pub async fn clear(&self) {
        // ---
        let _guard = self.write_lock.lock().await;

        if let Err(e) = self.blobs.delete(&self.key).await {
            self.note_write_failure("clear history blob", &e);
        }
    }

    /// Number of persistence failures swallowed so far.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    fn note_write_failure(&self, what: &str, err: &anyhow::Error) {
        // ---
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("Failed to {} under '{}': {}", what, self.key, err);
    }

    async fn load(&self) -> Vec<Reading> {
        // ---
        let blob = match self.blobs.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history blob '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(history) => history,
            Err(e) => {
                // No schema versioning: an unparseable blob is discarded,
                // not migrated.
                tracing::warn!("Discarding corrupt history blob '{}': {}", self.key, e);
                Vec::new()
            }
        }
    }
}
