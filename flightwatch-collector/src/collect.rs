//! One collection pass: feed query, fault-isolated detail fetches, geofencing.
//!
//! A failed bounding-box query aborts the pass; a failed detail fetch only
//! skips that aircraft and is reported as a diagnostic. Successive detail
//! fetches are spaced by a minimum interval so the provider does not block
//! us, after successes and failures alike.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use flightwatch_core::geo;
use flightwatch_core::types::{BoundingBox, FlightRecord, Result};

use crate::feed::FeedClient;

/// Diagnostic for one skipped aircraft. Collected alongside the batch,
/// never raised to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectError {
    /// Feed-internal flight id.
    pub id: String,
    pub icao: String,
    pub cause: String,
}

/// Output of one collection pass.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// One record per observed aircraft, all stamped with the same
    /// `collected_at`, no duplicate icao.
    pub batch: Vec<FlightRecord>,
    pub errors: Vec<CollectError>,
}

/// Run one collection pass over `bbox` at time `now` (epoch seconds).
///
/// Only a failed bounding-box query returns an error; everything else
/// degrades to diagnostics in the outcome.
pub async fn collect(
    feed: &dyn FeedClient,
    bbox: &BoundingBox,
    now: f64,
    spacing: Duration,
) -> Result<CollectOutcome> {
    let entries = feed.query_bounding_box(bbox).await?;
    info!(aircraft = entries.len(), "feed query complete");

    let mut outcome = CollectOutcome::default();
    // Last observation wins if the feed ever repeats an icao within a pass.
    let mut by_icao: HashMap<String, usize> = HashMap::new();

    for (i, entry) in entries.iter().enumerate() {
        match feed.fetch_detail(&entry.id).await {
            Ok(detail) => {
                let trail = geo::filter_inside(bbox, &detail.trail);
                debug!(
                    icao = %entry.icao,
                    raw_points = detail.trail.len(),
                    kept_points = trail.len(),
                    "detail fetched"
                );
                let record = FlightRecord {
                    icao: entry.icao.clone(),
                    callsign: entry.callsign.clone(),
                    model: detail.model,
                    airline: detail.airline,
                    trail,
                    collected_at: now,
                };
                match by_icao.entry(record.icao.clone()) {
                    Entry::Occupied(slot) => outcome.batch[*slot.get()] = record,
                    Entry::Vacant(slot) => {
                        slot.insert(outcome.batch.len());
                        outcome.batch.push(record);
                    }
                }
            }
            Err(e) => {
                warn!(id = %entry.id, icao = %entry.icao, error = %e, "skipping aircraft");
                outcome.errors.push(CollectError {
                    id: entry.id.clone(),
                    icao: entry.icao.clone(),
                    cause: e.to_string(),
                });
            }
        }

        if i + 1 < entries.len() && !spacing.is_zero() {
            tokio::time::sleep(spacing).await;
        }
    }

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
