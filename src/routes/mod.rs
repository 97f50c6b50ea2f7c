use axum::Router;

use crate::store::HistoryStore;
use crate::Config;

mod current;
mod health;
mod history;

// ---

pub fn router(store: HistoryStore, config: Config) -> Router {
    // ---
    Router::new()
        .merge(current::router())
        .merge(history::router())
        .merge(health::router())
        .with_state((store, config))
}
