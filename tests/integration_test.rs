use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sqlx::sqlite::SqlitePoolOptions;

use stationdash::routes;
use stationdash::schema;
use stationdash::store::{HistoryStore, SqliteBlobStore};
use stationdash::Config;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reading {
    temperature: f64,
    humidity: f64,
    pressure: f64,
    gas: f64,
    dew_point: f64,
    cloud_base: f64,
    rainfall: f64,
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    mock: bool,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    reading: Reading,
    notice: Option<String>,
}

/// Spin up the full app on an ephemeral port with an in-memory database and
/// an unroutable station URL, so every `/api/current` call exercises the
/// synthetic-fallback path. Returns the base URL.
async fn spawn_app() -> Result<String> {
    // ---
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    schema::create_schema(&pool).await?;

    let cfg = Config {
        db_url: "sqlite::memory:".into(),
        db_pool_max: 1,
        // TCP port 9 (discard) refuses immediately on loopback.
        station_url: "http://127.0.0.1:9/current".into(),
        history_key: "weather-history".into(),
        history_cap: 1008,
        poll_minutes: 15,
    };

    let store = HistoryStore::new(
        Arc::new(SqliteBlobStore::new(pool)),
        cfg.history_key.clone(),
        cfg.history_cap as usize,
    );

    let app = routes::router(store, cfg);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn health_endpoint_responds_ok() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let resp = client.get(format!("{base}/health")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn current_falls_back_to_mock_and_records_history() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let current: CurrentResponse = client
        .get(format!("{base}/api/current"))
        .send()
        .await?
        .json()
        .await?;

    // The station is unreachable, so the reading must be a flagged,
    // stamped synthetic one with a user-visible notice.
    assert!(current.reading.mock, "expected a synthetic fallback reading");
    assert!(current.reading.timestamp.is_some(), "reading must be stamped");
    assert!(current.notice.is_some(), "fallback must carry a notice");

    // Plausible synthetic values, internally consistent.
    let r = &current.reading;
    assert!(r.humidity >= 0.0 && r.humidity <= 100.0);
    assert!(r.pressure > 900.0 && r.pressure < 1100.0);
    assert!(r.gas > 0.0);
    assert!(r.rainfall >= 0.0);
    assert!(r.dew_point <= r.temperature);
    assert!(r.cloud_base >= 0.0);

    // A second poll lands in front of the first: newest-first history.
    let _: CurrentResponse = client
        .get(format!("{base}/api/current"))
        .send()
        .await?
        .json()
        .await?;

    let history: Vec<Reading> = client
        .get(format!("{base}/api/history"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(history.len(), 2);
    assert!(
        history[0].timestamp >= history[1].timestamp,
        "history must be newest-first"
    );

    Ok(())
}

#[tokio::test]
async fn average_windowing_and_clear() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    // Empty store: no window, no average.
    let resp = client
        .get(format!("{base}/api/history/average?hours=24"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let current: CurrentResponse = client
        .get(format!("{base}/api/current"))
        .send()
        .await?
        .json()
        .await?;

    // One reading in the last 24h: the average is that reading.
    let resp = client
        .get(format!("{base}/api/history/average?hours=24"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let avg: serde_json::Value = resp.json().await?;
    assert_eq!(avg["samples"], 1);
    let diff = avg["temperature"].as_f64().unwrap() - current.reading.temperature;
    assert!(diff.abs() < 1e-9);

    // hours=0 puts the cutoff at "now", after the recorded timestamp.
    let resp = client
        .get(format!("{base}/api/history/average?hours=0"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Windowed history honors the same cutoff.
    let windowed: Vec<Reading> = client
        .get(format!("{base}/api/history?hours=24"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(windowed.len(), 1);

    // Clearing drops the blob; the history reads back empty.
    let resp = client.delete(format!("{base}/api/history")).send().await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let history: Vec<Reading> = client
        .get(format!("{base}/api/history"))
        .send()
        .await?
        .json()
        .await?;
    assert!(history.is_empty());

    Ok(())
}
