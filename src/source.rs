//! Weather-station reading source.
//!
//! Fetches the current reading from the station endpoint and validates the
//! payload into a typed [`Reading`]. Both failure modes are recoverable:
//! callers substitute a synthetic reading (marked `mock`) and carry on, so
//! the dashboard never goes blank just because the station is down.

use rand::Rng;
use thiserror::Error;

use crate::models::Reading;

// ---

/// Why a station fetch did not produce a usable reading.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request itself failed (unreachable host, non-JSON body, etc.).
    #[error("station request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The station answered, but the payload failed validation.
    #[error("station payload rejected: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Fetch the current reading from the station endpoint.
///
/// The payload is accepted only if all measurement fields are present and
/// numeric; anything else is a [`SourceError::Payload`].
pub async fn fetch_station_reading(station_url: &str) -> Result<Reading, SourceError> {
    // ---
    tracing::debug!("Fetching current reading from: {}", station_url);

    let client = reqwest::Client::new();
    let payload: serde_json::Value = client.get(station_url).send().await?.json().await?;

    tracing::debug!("Station raw payload: {}", payload);

    Ok(Reading::from_payload(payload)?)
}

/// Fetch from the station, falling back to a synthetic reading on any
/// [`SourceError`]. Returns the reading together with the error that forced
/// the fallback, if any, so callers can raise a non-fatal notice.
pub async fn fetch_or_synthetic(station_url: &str) -> (Reading, Option<SourceError>) {
    // ---
    match fetch_station_reading(station_url).await {
        Ok(reading) => (reading, None),
        Err(e) => {
            tracing::warn!("Falling back to synthetic reading: {}", e);
            (synthetic_reading(), Some(e))
        }
    }
}

/// Generate a plausible synthetic reading for when the station is
/// unavailable, flagged as `mock`. Left unstamped; the history store stamps
/// it at record time like any station reading.
pub fn synthetic_reading() -> Reading {
    // ---
    let mut rng = rand::thread_rng();

    let temperature = rng.gen_range(8.0..28.0);
    let humidity = rng.gen_range(30.0..90.0);
    // Dew point from the humidity deficit; cloud base at 125 m per °C of spread.
    let dew_point = temperature - (100.0 - humidity) / 5.0;
    let cloud_base = (temperature - dew_point) * 125.0;

    Reading {
        temperature,
        humidity,
        pressure: rng.gen_range(990.0..1030.0),
        gas: rng.gen_range(50_000.0..150_000.0),
        dew_point,
        cloud_base,
        rainfall: rng.gen_range(0.0..2.0),
        timestamp: None,
        mock: true,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_synthetic_reading_is_flagged_and_consistent() {
        // ---
        for _ in 0..100 {
            let r = synthetic_reading();

            assert!(r.mock);
            assert_eq!(r.timestamp, None);

            assert!((8.0..28.0).contains(&r.temperature));
            assert!((30.0..90.0).contains(&r.humidity));
            assert!((990.0..1030.0).contains(&r.pressure));
            assert!(r.rainfall >= 0.0);

            // Dew point never exceeds the air temperature, and the cloud
            // base tracks the spread.
            assert!(r.dew_point <= r.temperature);
            let spread = r.temperature - r.dew_point;
            assert!((r.cloud_base - spread * 125.0).abs() < 1e-9);
        }
    }
}
