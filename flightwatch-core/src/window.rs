//! Rolling observation window keyed by ICAO.
//!
//! Pure logic — no I/O. Holds the most recent record per aircraft, bounded
//! by a one-hour retention horizon. The caller (collector CLI) loads it,
//! merges a collection batch in, and persists the result.

use std::collections::HashMap;

use crate::types::FlightRecord;

/// Maximum age, in seconds, an observation stays in the window.
/// Records with age >= this are evicted on the next merge.
pub const RETENTION_HORIZON_SECS: f64 = 3600.0;

/// Counters from a single merge, for logging and pass summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries dropped for exceeding the retention horizon.
    pub evicted: usize,
    /// Batch records that replaced a surviving same-icao entry.
    pub refreshed: usize,
    /// Batch records with an icao new to the window.
    pub inserted: usize,
}

/// Deduplicated, age-bounded set of most-recent observations, one per
/// aircraft. Owned exclusively by the processing pass between load and save.
#[derive(Debug, Clone, Default)]
pub struct Window {
    records: HashMap<String, FlightRecord>,
}

impl Window {
    pub fn new() -> Self {
        Window::default()
    }

    /// Build a window from loaded records. Later records win on a repeated
    /// icao, so a corrupt-free file always yields one entry per key.
    pub fn from_records(records: impl IntoIterator<Item = FlightRecord>) -> Self {
        let mut window = Window::new();
        for rec in records {
            window.records.insert(rec.icao.clone(), rec);
        }
        window
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, icao: &str) -> Option<&FlightRecord> {
        self.records.get(icao)
    }

    pub fn records(&self) -> impl Iterator<Item = &FlightRecord> {
        self.records.values()
    }

    /// Records sorted by icao, for deterministic export order.
    pub fn sorted_records(&self) -> Vec<&FlightRecord> {
        let mut rows: Vec<_> = self.records.values().collect();
        rows.sort_by(|a, b| a.icao.cmp(&b.icao));
        rows
    }

    /// Merge one collection batch taken at `now` (the batch's common
    /// `collected_at`; an empty batch still evicts against `now`).
    ///
    /// Entries aged >= [`RETENTION_HORIZON_SECS`] are evicted first, then
    /// every batch record is inserted, overwriting any surviving entry with
    /// the same icao — re-detection refreshes the observation regardless of
    /// relative recency. Merging the same batch twice at the same `now` is
    /// a no-op the second time.
    pub fn merge(&mut self, now: f64, batch: Vec<FlightRecord>) -> MergeStats {
        let mut stats = MergeStats::default();

        let before = self.records.len();
        self.records
            .retain(|_, rec| rec.age(now) < RETENTION_HORIZON_SECS);
        stats.evicted = before - self.records.len();

        for rec in batch {
            if self.records.insert(rec.icao.clone(), rec).is_some() {
                stats.refreshed += 1;
            } else {
                stats.inserted += 1;
            }
        }

        stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao: &str, airline: &str, model: &str, collected_at: f64) -> FlightRecord {
        FlightRecord {
            icao: icao.into(),
            callsign: format!("CS{icao}"),
            model: model.into(),
            airline: airline.into(),
            trail: Vec::new(),
            collected_at,
        }
    }

    #[test]
    fn test_merge_into_empty_window() {
        let mut window = Window::new();
        let batch = vec![
            record("A1B2C3", "SkyX", "B738", 0.0),
            record("D4E5F6", "SkyX", "A320", 0.0),
        ];
        let stats = window.merge(0.0, batch);

        assert_eq!(window.len(), 2);
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.refreshed, 0);
        assert_eq!(stats.evicted, 0);
    }

    #[test]
    fn test_empty_batch_still_evicts() {
        let mut window = Window::from_records(vec![record("A1B2C3", "SkyX", "B738", 0.0)]);
        let stats = window.merge(3601.0, Vec::new());

        assert!(window.is_empty());
        assert_eq!(stats.evicted, 1);
    }

    #[test]
    fn test_eviction_boundary() {
        // age == horizon is evicted, one second younger is retained
        let mut window = Window::from_records(vec![
            record("AGE3600", "X", "X", 0.0),
            record("AGE3599", "X", "X", 1.0),
        ]);
        window.merge(3600.0, Vec::new());

        assert!(window.get("AGE3600").is_none());
        assert!(window.get("AGE3599").is_some());
    }

    #[test]
    fn test_batch_overwrites_survivor() {
        let mut window = Window::from_records(vec![record("A1B2C3", "SkyX", "B738", 0.0)]);
        let stats = window.merge(10.0, vec![record("A1B2C3", "SkyX", "A320", 10.0)]);

        assert_eq!(window.len(), 1);
        assert_eq!(window.get("A1B2C3").unwrap().model, "A320");
        assert_eq!(window.get("A1B2C3").unwrap().collected_at, 10.0);
        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.inserted, 0);
    }

    #[test]
    fn test_untouched_survivors_retained() {
        let mut window = Window::from_records(vec![
            record("OLD111", "A", "M1", 100.0),
            record("OLD222", "B", "M2", 100.0),
        ]);
        window.merge(200.0, vec![record("OLD111", "A", "M1", 200.0)]);

        assert_eq!(window.len(), 2);
        assert_eq!(window.get("OLD222").unwrap().collected_at, 100.0);
    }

    #[test]
    fn test_merge_idempotent_at_same_time() {
        let mut window = Window::from_records(vec![record("KEEP01", "A", "M", 50.0)]);
        let batch = vec![record("A1B2C3", "SkyX", "B738", 100.0)];

        window.merge(100.0, batch.clone());
        let snapshot: Vec<FlightRecord> =
            window.sorted_records().into_iter().cloned().collect();

        let stats = window.merge(100.0, batch);
        let again: Vec<FlightRecord> = window.sorted_records().into_iter().cloned().collect();

        assert_eq!(snapshot, again);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.refreshed, 1);
    }

    #[test]
    fn test_one_entry_per_key() {
        let mut window = Window::from_records(vec![
            record("AAA111", "A", "M", 0.0),
            record("BBB222", "B", "M", 0.0),
        ]);
        window.merge(
            10.0,
            vec![
                record("BBB222", "B", "M", 10.0),
                record("CCC333", "C", "M", 10.0),
            ],
        );

        assert_eq!(window.len(), 3);
        for icao in ["AAA111", "BBB222", "CCC333"] {
            assert!(window.get(icao).is_some());
        }
    }

    #[test]
    fn test_from_records_last_wins() {
        let window = Window::from_records(vec![
            record("A1B2C3", "SkyX", "B738", 0.0),
            record("A1B2C3", "SkyX", "A320", 5.0),
        ]);
        assert_eq!(window.len(), 1);
        assert_eq!(window.get("A1B2C3").unwrap().model, "A320");
    }

    #[test]
    fn test_sorted_records_by_icao() {
        let window = Window::from_records(vec![
            record("ZZZ999", "A", "M", 0.0),
            record("AAA111", "B", "M", 0.0),
            record("MMM555", "C", "M", 0.0),
        ]);
        let icaos: Vec<&str> = window
            .sorted_records()
            .iter()
            .map(|r| r.icao.as_str())
            .collect();
        assert_eq!(icaos, vec!["AAA111", "MMM555", "ZZZ999"]);
    }
}
