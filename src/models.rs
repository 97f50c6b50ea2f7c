//! Simple data models for the dashboard pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One sampled set of environmental measurements.
///
/// Field names serialize as camelCase to match the station wire format and
/// the persisted blob layout. `timestamp` is optional on input; the history
/// store stamps it before persistence. `mock` marks a synthetic reading
/// generated while the station was unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    // ---
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Barometric pressure in hPa.
    pub pressure: f64,
    /// Gas sensor resistance in Ω.
    pub gas: f64,
    /// Dew point in °C.
    pub dew_point: f64,
    /// Estimated cloud base in meters.
    pub cloud_base: f64,
    /// Rainfall in mm.
    pub rainfall: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mock: bool,
}

impl Reading {
    /// Validate an untyped station payload into a typed `Reading`.
    ///
    /// A payload is accepted only if temperature, humidity, pressure, gas,
    /// dewPoint, cloudBase and rainfall are all present and numeric; any
    /// other shape is rejected. Timestamp and mock flag are optional.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        // ---
        serde_json::from_value(payload)
    }

    /// Stamp with the given instant if no timestamp is set yet.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        // ---
        if self.timestamp.is_none() {
            self.timestamp = Some(now);
        }
        self
    }
}

/// Arithmetic mean of every numeric field over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAverage {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub gas: f64,
    pub dew_point: f64,
    pub cloud_base: f64,
    pub rainfall: f64,
    /// Number of readings the averages were computed from.
    pub samples: usize,
}

impl WindowAverage {
    /// Average the numeric fields of `readings`; `None` when empty so an
    /// empty window stays distinguishable from an all-zero average.
    pub fn of(readings: &[Reading]) -> Option<Self> {
        // ---
        if readings.is_empty() {
            return None;
        }

        let n = readings.len() as f64;
        let sum = |f: fn(&Reading) -> f64| readings.iter().map(f).sum::<f64>() / n;

        Some(WindowAverage {
            temperature: sum(|r| r.temperature),
            humidity: sum(|r| r.humidity),
            pressure: sum(|r| r.pressure),
            gas: sum(|r| r.gas),
            dew_point: sum(|r| r.dew_point),
            cloud_base: sum(|r| r.cloud_base),
            rainfall: sum(|r| r.rainfall),
            samples: readings.len(),
        })
    }
}
