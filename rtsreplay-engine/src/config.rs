// Copyright 2025 Rtsreplay (https://github.com/rtsreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How a multi-event batch produced by one dispatch step is spliced into
/// the front of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    /// The batch is processed in production order: the first event a
    /// handler produced is the next event dispatched.
    #[default]
    Production,
    /// The batch lands reversed: the first event produced is dispatched
    /// last within the batch. Matches the historic splice that pushed
    /// each produced event to the queue front individually.
    LegacyReversed,
}

/// Configuration for the dispatch engine.
///
/// # Example TOML Configuration
///
/// ```toml
/// queue_order = "production"
/// trace_dispatch = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Splice order for handler-produced event batches.
    #[serde(default)]
    pub queue_order: QueueOrder,

    /// Emit a debug record for every dispatched event.
    #[serde(default)]
    pub trace_dispatch: bool,
}

impl EngineConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration file, picking the parser by extension
    /// (`.json` is JSON, anything else is TOML).
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&raw),
            _ => Self::from_toml(&raw),
        }
    }
}

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_production_order() {
        let config = EngineConfig::default();
        assert_eq!(config.queue_order, QueueOrder::Production);
        assert!(!config.trace_dispatch);
    }

    #[test]
    fn test_parse_json_config() {
        let config =
            EngineConfig::from_json(r#"{"queue_order": "legacy_reversed", "trace_dispatch": true}"#)
                .unwrap();
        assert_eq!(config.queue_order, QueueOrder::LegacyReversed);
        assert!(config.trace_dispatch);
    }

    #[test]
    fn test_parse_toml_config() {
        let config = EngineConfig::from_toml("queue_order = \"production\"").unwrap();
        assert_eq!(config.queue_order, QueueOrder::Production);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "queue_order = \"legacy_reversed\"").unwrap();

        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.queue_order, QueueOrder::LegacyReversed);
    }
}
