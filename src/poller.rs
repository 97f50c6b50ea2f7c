//! Fixed-interval background sampling.
//!
//! Polls the station on a fixed cadence and records each reading (station or
//! synthetic fallback) into the history store. No backoff, no jitter, no
//! retry: a failed cycle just waits for the next tick.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::source;
use crate::store::HistoryStore;

// ---

/// Spawn the sampling loop. The interval's first tick fires immediately, so
/// the history gets a sample right after startup.
pub fn spawn(store: HistoryStore, station_url: String, poll_minutes: u32) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let period = Duration::from_secs(u64::from(poll_minutes) * 60);
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            let (reading, fallback) = source::fetch_or_synthetic(&station_url).await;
            tracing::info!(
                "Sampled reading: {:.1}°C, {:.0}%, {:.1} hPa{}",
                reading.temperature,
                reading.humidity,
                reading.pressure,
                if fallback.is_some() { " (mock)" } else { "" }
            );

            store.record(reading).await;
        }
    })
}
