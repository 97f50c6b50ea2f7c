//! Current-reading endpoint: the dashboard's main poll target.
//!
//! Each request runs one fetch-validate-record cycle against the station.
//! When the station is unreachable or its payload fails validation, the
//! response carries a synthetic reading plus a non-fatal notice the page can
//! surface as a toast.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::models::Reading;
use crate::source;
use crate::store::HistoryStore;
use crate::Config;

// ---

pub fn router() -> Router<(HistoryStore, Config)> {
    // ---
    Router::new().route("/api/current", get(handler))
}

/// JSON response body for `GET /api/current`.
#[derive(Serialize)]
struct CurrentResponse {
    reading: Reading,
    /// Present only when the reading is a synthetic fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

async fn handler(
    State((store, config)): State<(HistoryStore, Config)>,
) -> Json<CurrentResponse> {
    // ---
    info!("GET /api/current");

    let (reading, fallback) = source::fetch_or_synthetic(&config.station_url).await;
    let notice =
        fallback.map(|e| format!("Station unavailable, showing simulated data ({e})"));

    // Stamp here so the response carries the same timestamp that gets
    // persisted; record() would otherwise stamp only its own copy.
    let reading = reading.stamped(Utc::now());
    store.record(reading.clone()).await;

    Json(CurrentResponse { reading, notice })
}
