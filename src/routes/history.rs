//! History endpoints: retained sequence, windowed averages, and clearing.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::models::Reading;
use crate::store::HistoryStore;
use crate::Config;

// ---

pub fn router() -> Router<(HistoryStore, Config)> {
    // ---
    Router::new()
        .route("/api/history", get(get_history).delete(delete_history))
        .route("/api/history/average", get(get_average))
}

/// Query parameters for `GET /api/history`.
#[derive(Debug, Deserialize)]
struct HistoryQuery {
    /// Window in hours back from now; omitted means the full retained sequence.
    hours: Option<u32>,
}

/// Handle `GET /api/history` — readings newest-first, optionally windowed.
async fn get_history(
    Query(params): Query<HistoryQuery>,
    State((store, _)): State<(HistoryStore, Config)>,
) -> Json<Vec<Reading>> {
    // ---
    info!("GET /api/history - {:?}", params);

    let readings = match params.hours {
        Some(hours) => store.for_window(hours).await,
        None => store.all().await,
    };
    Json(readings)
}

/// Query parameters for `GET /api/history/average`.
#[derive(Debug, Deserialize)]
struct AverageQuery {
    #[serde(default = "default_average_hours")]
    hours: u32,
}

fn default_average_hours() -> u32 {
    24
}

/// Handle `GET /api/history/average`.
///
/// Returns the per-field mean over the window, or `204 No Content` when the
/// window holds no readings (an empty window is not an all-zero average).
async fn get_average(
    Query(params): Query<AverageQuery>,
    State((store, _)): State<(HistoryStore, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/history/average - {:?}", params);

    match store.average(params.hours).await {
        Some(avg) => (StatusCode::OK, Json(avg)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Handle `DELETE /api/history` — drop the persisted blob entirely.
async fn delete_history(State((store, _)): State<(HistoryStore, Config)>) -> StatusCode {
    // ---
    info!("DELETE /api/history");

    store.clear().await;
    StatusCode::NO_CONTENT
}
