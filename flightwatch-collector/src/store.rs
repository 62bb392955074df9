//! Flat tabular persistence — window CSV plus the two frequency exports.
//!
//! Every write goes to a temporary file in the data directory and is then
//! renamed over the target. A pass either commits fully or leaves the prior
//! files untouched, and a concurrent reader (the dashboard) always sees a
//! consistent snapshot.

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use flightwatch_core::aggregate::FrequencyTable;
use flightwatch_core::types::{FlightRecord, Result, TrackPoint, WatchError};
use flightwatch_core::window::Window;

pub const WINDOW_FILE: &str = "window.csv";
pub const AIRLINE_FILE: &str = "airline_counts.csv";
pub const MODEL_FILE: &str = "model_counts.csv";

fn persist(e: impl Display) -> WatchError {
    WatchError::Persistence(e.to_string())
}

/// One window row on disk. The trail column is a JSON array of
/// [lat, lon] pairs so point order and f64 precision survive round-trips.
#[derive(Debug, Serialize, Deserialize)]
struct WindowRow {
    icao: String,
    callsign: String,
    model: String,
    airline: String,
    trail: String,
    collected_at: f64,
}

/// Encode a trail as a JSON array of [lat, lon] pairs.
pub fn encode_trail(trail: &[TrackPoint]) -> Result<String> {
    let pairs: Vec<[f64; 2]> = trail.iter().map(|p| [p.lat, p.lon]).collect();
    serde_json::to_string(&pairs).map_err(persist)
}

/// Decode a trail column written by [`encode_trail`].
pub fn decode_trail(text: &str) -> Result<Vec<TrackPoint>> {
    let pairs: Vec<[f64; 2]> = serde_json::from_str(text).map_err(persist)?;
    Ok(pairs
        .into_iter()
        .map(|[lat, lon]| TrackPoint::new(lat, lon))
        .collect())
}

/// Loads and saves the persisted window and its derived exports under one
/// data directory.
pub struct WindowStore {
    dir: PathBuf,
}

impl WindowStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        WindowStore { dir: dir.into() }
    }

    pub fn window_path(&self) -> PathBuf {
        self.dir.join(WINDOW_FILE)
    }

    /// Load the persisted window. A missing file is an empty window;
    /// a corrupt file is a fatal persistence error (the file is left as-is).
    pub fn load(&self) -> Result<Window> {
        let path = self.window_path();
        if !path.exists() {
            return Ok(Window::new());
        }

        let mut reader = csv::Reader::from_path(&path).map_err(persist)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<WindowRow>() {
            let row = row.map_err(persist)?;
            records.push(FlightRecord {
                icao: row.icao,
                callsign: row.callsign,
                model: row.model,
                airline: row.airline,
                trail: decode_trail(&row.trail)?,
                collected_at: row.collected_at,
            });
        }
        Ok(Window::from_records(records))
    }

    /// Persist the window, rows ordered by icao. Commit boundary: written
    /// to a temp file, then renamed over the target.
    pub fn save(&self, window: &Window) -> Result<()> {
        let rows: std::result::Result<Vec<WindowRow>, WatchError> = window
            .sorted_records()
            .into_iter()
            .map(|rec| {
                Ok(WindowRow {
                    icao: rec.icao.clone(),
                    callsign: rec.callsign.clone(),
                    model: rec.model.clone(),
                    airline: rec.airline.clone(),
                    trail: encode_trail(&rec.trail)?,
                    collected_at: rec.collected_at,
                })
            })
            .collect();
        let rows = rows?;

        self.write_atomic(WINDOW_FILE, |writer| {
            for row in &rows {
                writer.serialize(row).map_err(persist)?;
            }
            Ok(())
        })
    }

    /// Write one frequency table as (group, count) CSV rows, already in
    /// ascending count order.
    pub fn export_frequencies(&self, file_name: &str, table: &FrequencyTable) -> Result<()> {
        self.write_atomic(file_name, |writer| {
            writer
                .write_record(["group", "count"])
                .map_err(persist)?;
            for (group, count) in table {
                writer
                    .write_record([group.as_str(), &count.to_string()])
                    .map_err(persist)?;
            }
            Ok(())
        })
    }

    fn write_atomic(
        &self,
        file_name: &str,
        fill: impl FnOnce(&mut csv::Writer<fs::File>) -> Result<()>,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{file_name}.tmp"));

        let result = (|| {
            let mut writer = csv::Writer::from_path(&tmp).map_err(persist)?;
            fill(&mut writer)?;
            writer.flush().map_err(persist)?;
            Ok(())
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        fs::rename(&tmp, self.dir.join(file_name))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao: &str, trail: Vec<TrackPoint>) -> FlightRecord {
        FlightRecord {
            icao: icao.into(),
            callsign: "SKX101".into(),
            model: "Boeing 737-800".into(),
            airline: "SkyX".into(),
            trail,
            collected_at: 1700000000.25,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());

        let window = Window::from_records(vec![
            record("A1B2C3", vec![TrackPoint::new(43.1, 33.2)]),
            record("D4E5F6", vec![]),
        ]);
        store.save(&window).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("A1B2C3").unwrap(), window.get("A1B2C3").unwrap());
        assert_eq!(loaded.get("D4E5F6").unwrap(), window.get("D4E5F6").unwrap());
    }

    #[test]
    fn test_trail_roundtrip_preserves_order_and_precision() {
        let trail = vec![
            TrackPoint::new(43.123456789012345, 33.987654321098765),
            TrackPoint::new(-0.000001, 179.999999),
            TrackPoint::new(41.0, 28.0),
        ];
        let decoded = decode_trail(&encode_trail(&trail).unwrap()).unwrap();
        assert_eq!(decoded, trail);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_trail("not json").is_err());
        assert!(decode_trail("[[1.0]]").is_err());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());
        store
            .save(&Window::from_records(vec![record("A1B2C3", vec![])]))
            .unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![WINDOW_FILE.to_string()]);
    }

    #[test]
    fn test_corrupt_window_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());
        fs::write(
            store.window_path(),
            "icao,callsign,model,airline,trail,collected_at\nA1B2C3,CS,M,X,broken,1.0\n",
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(WatchError::Persistence(_))
        ));
    }

    #[test]
    fn test_export_frequencies() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());

        let table: FrequencyTable = vec![("Nord".into(), 1), ("SkyX".into(), 3)];
        store.export_frequencies(AIRLINE_FILE, &table).unwrap();

        let text = fs::read_to_string(dir.path().join(AIRLINE_FILE)).unwrap();
        assert_eq!(text, "group,count\nNord,1\nSkyX,3\n");
    }

    #[test]
    fn test_export_handles_commas_in_group() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());

        let table: FrequencyTable = vec![("Air, Sea & Sky".into(), 2)];
        store.export_frequencies(MODEL_FILE, &table).unwrap();

        let text = fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap();
        assert_eq!(text, "group,count\n\"Air, Sea & Sky\",2\n");
    }

    #[test]
    fn test_save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = WindowStore::new(dir.path());

        store
            .save(&Window::from_records(vec![
                record("A1B2C3", vec![]),
                record("D4E5F6", vec![]),
            ]))
            .unwrap();
        store
            .save(&Window::from_records(vec![record("A1B2C3", vec![])]))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("D4E5F6").is_none());
    }
}
