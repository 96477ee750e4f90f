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

//! Run context shared between the engine and plugins.

use crate::event::EventRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Exit record for one plugin after a run.
///
/// Plugins that never signal an exit are recorded with the default
/// successful outcome `(0, {})`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOutcome {
    /// Exit code; zero is success.
    pub code: i32,
    /// Free-form details supplied by the exiting plugin.
    pub details: serde_json::Map<String, Value>,
}

impl PluginOutcome {
    /// Create an outcome with the given code and details.
    pub fn new(code: i32, details: serde_json::Map<String, Value>) -> Self {
        Self { code, details }
    }

    /// The default successful outcome.
    pub fn success() -> Self {
        Self {
            code: 0,
            details: serde_json::Map::new(),
        }
    }

    /// Whether this outcome has a zero exit code.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Replay state offered to every handler invocation.
///
/// Owns the ordered input event sequence, read once at run start, and the
/// per-plugin outcome mapping, written only by the engine. The metadata
/// map is a scratch area plugins use to publish data to each other and to
/// the caller.
#[derive(Default)]
pub struct ReplayContext {
    /// Ordered, already-materialized input events.
    pub events: Vec<EventRef>,
    /// Outcome per plugin name, populated by the engine during a run.
    pub plugin_results: HashMap<String, PluginOutcome>,
    /// Shared scratch state for plugins.
    pub metadata: HashMap<String, Value>,
}

impl ReplayContext {
    /// Create a context over the given input events.
    pub fn new(events: Vec<EventRef>) -> Self {
        Self {
            events,
            plugin_results: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Record a plugin outcome. A later record for the same name replaces
    /// the earlier one.
    pub fn record_outcome(&mut self, plugin: impl Into<String>, outcome: PluginOutcome) {
        self.plugin_results.insert(plugin.into(), outcome);
    }

    /// Look up the recorded outcome for a plugin name.
    pub fn outcome(&self, plugin: &str) -> Option<&PluginOutcome> {
        self.plugin_results.get(plugin)
    }

    /// Store a metadata value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Read a metadata value.
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GameStartEvent, IntoEventRef};

    #[test]
    fn test_outcome_roundtrip() {
        let mut ctx = ReplayContext::default();
        assert!(ctx.outcome("tracker").is_none());

        let mut details = serde_json::Map::new();
        details.insert("msg".to_string(), Value::from("no tracker events"));
        ctx.record_outcome("tracker", PluginOutcome::new(1, details));

        let outcome = ctx.outcome("tracker").unwrap();
        assert_eq!(outcome.code, 1);
        assert!(!outcome.is_success());
        assert_eq!(outcome.details["msg"], "no tracker events");
    }

    #[test]
    fn test_later_outcome_replaces_earlier() {
        let mut ctx = ReplayContext::default();
        ctx.record_outcome("apm", PluginOutcome::new(1, serde_json::Map::new()));
        ctx.record_outcome("apm", PluginOutcome::success());
        assert!(ctx.outcome("apm").unwrap().is_success());
    }

    #[test]
    fn test_metadata_scratch() {
        let mut ctx = ReplayContext::new(vec![GameStartEvent { frame: 0 }.into_event()]);
        ctx.set_metadata("expansions", 3);
        assert_eq!(ctx.get_metadata("expansions"), Some(&Value::from(3)));
        assert_eq!(ctx.events.len(), 1);
    }
}
