//! Frequency statistics derived from the current window.
//!
//! Recomputed wholesale on every pass; no independent lifecycle.

use std::collections::HashMap;

use crate::types::FlightRecord;
use crate::window::Window;

/// (group key, count) rows sorted ascending by count, ties broken by
/// group key ascending. An empty key is a visible group: records with an
/// unknown airline or model still count toward the window total.
pub type FrequencyTable = Vec<(String, u64)>;

/// Number of window entries per airline.
pub fn airline_counts(window: &Window) -> FrequencyTable {
    counts_by(window, |rec| rec.airline.as_str())
}

/// Number of window entries per aircraft model.
pub fn model_counts(window: &Window) -> FrequencyTable {
    counts_by(window, |rec| rec.model.as_str())
}

fn counts_by<'a>(window: &'a Window, key: impl Fn(&'a FlightRecord) -> &'a str) -> FrequencyTable {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for rec in window.records() {
        *counts.entry(key(rec)).or_insert(0) += 1;
    }

    let mut table: FrequencyTable = counts
        .into_iter()
        .map(|(group, count)| (group.to_string(), count))
        .collect();
    table.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
