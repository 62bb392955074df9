//! Flight feed client — bounding-box query plus per-flight detail.
//!
//! `FeedClient` is the seam the collection pass drives; `Fr24Client` is the
//! HTTP implementation against FlightRadar24-style endpoints. The pass owns
//! the skip/rate-limit policy, the client does not.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use flightwatch_core::types::{BoundingBox, Result, TrackPoint, WatchError};

/// The provider blocks non-browser user agents on the public feed.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Brief entry from the bounding-box feed: enough to identify the flight
/// and ask for detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Feed-internal flight id, used for the detail query.
    pub id: String,
    pub icao: String,
    pub callsign: String,
}

/// Full per-flight detail. Unknown model/airline come back empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightDetail {
    pub model: String,
    pub airline: String,
    /// Raw trail, not yet bounding-box filtered.
    pub trail: Vec<TrackPoint>,
}

/// External feed the collection pass polls.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// All aircraft currently inside `bbox`. Failure here is fatal to the
    /// pass and surfaces as [`WatchError::FeedUnavailable`].
    async fn query_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<FeedEntry>>;

    /// Full detail for one feed entry. Errors are recovered per-aircraft by
    /// the caller, never fatal.
    async fn fetch_detail(&self, id: &str) -> Result<FlightDetail>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// reqwest-backed client for the public FlightRadar24 endpoints.
pub struct Fr24Client {
    client: reqwest::Client,
    feed_url: String,
    detail_url: String,
}

impl Fr24Client {
    pub fn new(feed_url: &str, detail_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_UA)
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Config(format!("http client: {e}")))?;

        Ok(Fr24Client {
            client,
            feed_url: feed_url.trim_end_matches('/').to_string(),
            detail_url: detail_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FeedClient for Fr24Client {
    async fn query_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<FeedEntry>> {
        // Provider expects max_lat,min_lat,min_lon,max_lon
        let url = format!(
            "{}?bounds={},{},{},{}",
            self.feed_url, bbox.max_lat, bbox.min_lat, bbox.min_lon, bbox.max_lon
        );

        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| WatchError::FeedUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| WatchError::FeedUnavailable(e.to_string()))?;

        Ok(parse_feed(&body))
    }

    async fn fetch_detail(&self, id: &str) -> Result<FlightDetail> {
        let url = format!("{}/?flight={id}", self.detail_url);

        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| WatchError::DetailFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| WatchError::DetailFetch(e.to_string()))?;

        Ok(parse_detail(&body))
    }
}

// ---------------------------------------------------------------------------
// Response parsing (pure, testable without a network)
// ---------------------------------------------------------------------------

/// Keys of the feed response that are metadata rather than flights.
const FEED_META_KEYS: &[&str] = &["full_count", "version"];

/// Parse a feed.js response: every non-meta key is a flight id mapping to an
/// array where index 0 is the ICAO hex and index 16 the callsign. Malformed
/// values are skipped, not fatal.
pub(crate) fn parse_feed(body: &Value) -> Vec<FeedEntry> {
    let Some(map) = body.as_object() else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (key, val) in map {
        if FEED_META_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(arr) = val.as_array() else {
            continue;
        };
        if arr.len() < 17 {
            continue;
        }
        let icao = arr[0].as_str().unwrap_or("").to_string();
        if icao.is_empty() {
            continue;
        }
        let callsign = arr[16].as_str().unwrap_or("").to_string();
        entries.push(FeedEntry {
            id: key.clone(),
            icao,
            callsign,
        });
    }
    entries
}

/// Parse a clickhandler detail response. Missing model/airline map to empty
/// strings; trail points with missing coordinates are skipped.
pub(crate) fn parse_detail(body: &Value) -> FlightDetail {
    let model = body
        .pointer("/aircraft/model/text")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let airline = body
        .pointer("/airline/name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let mut trail = Vec::new();
    if let Some(points) = body.get("trail").and_then(Value::as_array) {
        for point in points {
            let lat = point.get("lat").and_then(Value::as_f64);
            let lon = point.get("lng").and_then(Value::as_f64);
            if let (Some(lat), Some(lon)) = (lat, lon) {
                trail.push(TrackPoint::new(lat, lon));
            }
        }
    }

    FlightDetail {
        model,
        airline,
        trail,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
