//! Library surface for the `stationdash` backend.
//!
//! The binary in `main.rs` and the integration tests both assemble the
//! application from these modules: configuration, the data model, the
//! history store, the station source, the background poller, and the HTTP
//! routes (EMBP gateway in `routes`).

pub mod config;
pub mod models;
pub mod poller;
pub mod routes;
pub mod schema;
pub mod source;
pub mod store;

pub use config::Config;
pub use models::{Reading, WindowAverage};
