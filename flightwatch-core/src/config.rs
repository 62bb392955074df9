//! Configuration file management for flightwatch.
//!
//! Reads/writes `~/.flightwatch/config.yaml` with the bounding box,
//! collector pacing, feed endpoints, and data directory.

use std::path::PathBuf;

use crate::types::{BoundingBox, Result, WatchError};

/// Default bounding box: the Black Sea area.
pub const DEFAULT_MIN_LAT: f64 = 41.0;
pub const DEFAULT_MAX_LAT: f64 = 46.0;
pub const DEFAULT_MIN_LON: f64 = 28.0;
pub const DEFAULT_MAX_LON: f64 = 42.0;

/// Full configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub bounds: BoundsConfig,
    pub collector: CollectorConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone)]
pub struct BoundsConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundsConfig {
    /// Validate the configured bounds into a usable box.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::new(self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Minimum milliseconds between per-flight detail fetches.
    pub spacing_ms: u64,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
    pub feed_url: String,
    pub detail_url: String,
}

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bounds: BoundsConfig {
                min_lat: DEFAULT_MIN_LAT,
                max_lat: DEFAULT_MAX_LAT,
                min_lon: DEFAULT_MIN_LON,
                max_lon: DEFAULT_MAX_LON,
            },
            collector: CollectorConfig {
                spacing_ms: 600,
                timeout_secs: 30,
                feed_url: "https://data-cloud.flightradar24.com/zones/fcgi/feed.js".into(),
                detail_url: "https://data-live.flightradar24.com/clickhandler/".into(),
            },
            data: DataConfig { dir: "data".into() },
        }
    }
}

/// Get the config directory path (`~/.flightwatch/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".flightwatch")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.flightwatch/config.yaml`.
///
/// Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path. Missing file yields defaults.
pub fn load_config_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return Config::default(),
    };

    parse_config(&text).unwrap_or_default()
}

/// Save config to `~/.flightwatch/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| WatchError::Config(e.to_string()))?;

    let path = config_file();
    let text = serialize_config(config);
    std::fs::write(&path, text).map_err(|e| WatchError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse simple YAML-like config text.
fn parse_config(text: &str) -> Option<Config> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        if let Some((key, val)) = stripped.split_once(':') {
            let key = key.trim();
            let val = val.trim();

            if !is_indented {
                if val.is_empty() {
                    current_section = Some(key.to_string());
                } else {
                    current_section = None;
                }
            } else if let Some(ref section) = current_section {
                match section.as_str() {
                    "bounds" => {
                        if let Some(v) = parse_float_value(val) {
                            match key {
                                "min_lat" => config.bounds.min_lat = v,
                                "max_lat" => config.bounds.max_lat = v,
                                "min_lon" => config.bounds.min_lon = v,
                                "max_lon" => config.bounds.max_lon = v,
                                _ => {}
                            }
                        }
                    }
                    "collector" => match key {
                        "spacing_ms" => {
                            if let Ok(v) = val.parse::<u64>() {
                                config.collector.spacing_ms = v;
                            }
                        }
                        "timeout_secs" => {
                            if let Ok(v) = val.parse::<u64>() {
                                config.collector.timeout_secs = v;
                            }
                        }
                        "feed_url" => {
                            if let Some(v) = parse_string_value(val) {
                                config.collector.feed_url = v;
                            }
                        }
                        "detail_url" => {
                            if let Some(v) = parse_string_value(val) {
                                config.collector.detail_url = v;
                            }
                        }
                        _ => {}
                    },
                    "data" => {
                        if key == "dir" {
                            if let Some(v) = parse_string_value(val) {
                                config.data.dir = v;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    Some(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if (val.starts_with('"') && val.ends_with('"'))
        || (val.starts_with('\'') && val.ends_with('\''))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# flightwatch configuration".to_string(), String::new()];

    lines.push("bounds:".into());
    lines.push(format!("  min_lat: {}", config.bounds.min_lat));
    lines.push(format!("  max_lat: {}", config.bounds.max_lat));
    lines.push(format!("  min_lon: {}", config.bounds.min_lon));
    lines.push(format!("  max_lon: {}", config.bounds.max_lon));
    lines.push(String::new());

    lines.push("collector:".into());
    lines.push(format!("  spacing_ms: {}", config.collector.spacing_ms));
    lines.push(format!("  timeout_secs: {}", config.collector.timeout_secs));
    lines.push(format!("  feed_url: \"{}\"", config.collector.feed_url));
    lines.push(format!("  detail_url: \"{}\"", config.collector.detail_url));
    lines.push(String::new());

    lines.push("data:".into());
    lines.push(format!("  dir: \"{}\"", config.data.dir));
    lines.push(String::new());

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
