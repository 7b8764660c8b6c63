//! Dashboard configuration, read from an optional JSON file.

use crate::dashboard::PipelineSettings;
use crate::stats::LayoutSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "gtd_dashboard.json";

/// Published Global Terrorism Database extract (Jan to June 2021).
pub const DEFAULT_SOURCE: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQNOXPTcP-C5DE9PnclYdLMO31le21XLbZSsrW0gB1jcxX9KxsmpjVt5IwSSPNtqrr0fUXiZDP1imAb/pub?gid=1101721916&single=true&output=csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV URL or local file path.
    pub source: String,
    pub fetch_timeout_secs: u64,
    pub rolling_window: usize,
    pub layout: LayoutSettings,
    pub window_width: f32,
    pub window_height: f32,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            fetch_timeout_secs: 60,
            rolling_window: 7,
            layout: LayoutSettings::default(),
            window_width: 1400.0,
            window_height: 900.0,
            export_width: 1200,
            export_height: 800,
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            rolling_window: self.rolling_window,
            layout: self.layout,
        }
    }

    pub fn export_size(&self) -> (u32, u32) {
        (self.export_width, self.export_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"source": "incidents.csv", "layout": {{"iterations": 80, "seed": 7}}}}"#
        )
        .unwrap();

        let config = DashboardConfig::load_or_default(file.path()).unwrap();

        assert_eq!(config.source, "incidents.csv");
        assert_eq!(config.layout.iterations, 80);
        assert_eq!(config.rolling_window, 7);
        assert_eq!(config.pipeline_settings().layout.seed, 7);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = DashboardConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
