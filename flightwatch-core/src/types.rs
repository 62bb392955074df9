//! Shared types and error enum for flightwatch-core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors produced by the flightwatch pipeline.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),
    #[error("detail fetch failed: {0}")]
    DetailFetch(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;

// ---------------------------------------------------------------------------
// Geographic primitives
// ---------------------------------------------------------------------------

/// A single (latitude, longitude) trail point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        TrackPoint { lat, lon }
    }
}

/// Rectangular lat/lon region of interest.
///
/// Selects which aircraft to query and which trail points to keep.
/// Invariant: `min_lat < max_lat` and `min_lon < max_lon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        if !(min_lat < max_lat) || !(min_lon < max_lon) {
            return Err(WatchError::Config(format!(
                "invalid bounding box: lat {min_lat}..{max_lat}, lon {min_lon}..{max_lon}"
            )));
        }
        Ok(BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Closed-interval containment check.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

// ---------------------------------------------------------------------------
// Flight observations
// ---------------------------------------------------------------------------

/// One observation of one aircraft at one collection instant.
///
/// Created only by a collection pass and immutable afterward; a repeated
/// observation of the same `icao` replaces the previous record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Aircraft identity — the dedup key for the window.
    pub icao: String,
    pub callsign: String,
    /// Aircraft model; empty when the provider has none.
    pub model: String,
    /// Operating airline; empty when the provider has none.
    pub airline: String,
    /// Trail already filtered to the bounding box, in chronological order.
    /// Empty is valid: the aircraft was observed but its trail lies outside.
    pub trail: Vec<TrackPoint>,
    /// Unix epoch seconds of the collection pass; identical across one batch.
    pub collected_at: f64,
}

impl FlightRecord {
    /// Seconds elapsed since this record was collected.
    pub fn age(&self, now: f64) -> f64 {
        now - self.collected_at
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
