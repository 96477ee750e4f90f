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

//! Engine-generated events: run bookends and the plugin exit control event.

use rtsreplay_core::{CategorySet, ReplayEvent};
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Identity token assigned to a plugin at registration.
///
/// Tokens are minted by one engine and are only meaningful to it; exit
/// control events name their target plugin by token, never by name, so
/// two plugins sharing a display name remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(pub(crate) u32);

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plugin#{}", self.0)
    }
}

/// Dispatched once before the first replay event of every run.
///
/// Plugins opt in with `Hook::specific("InitGame")` to reset per-run state.
#[derive(Debug, Clone, Default)]
pub struct InitGame;

impl InitGame {
    /// Concrete kind name of the init bookend.
    pub const NAME: &'static str = "InitGame";
}

impl ReplayEvent for InitGame {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn categories(&self) -> CategorySet {
        CategorySet::EVENT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Dispatched once after the last replay event of every run.
///
/// Plugins opt in with `Hook::specific("EndGame")` to post-process
/// aggregated data.
#[derive(Debug, Clone, Default)]
pub struct EndGame;

impl EndGame {
    /// Concrete kind name of the end bookend.
    pub const NAME: &'static str = "EndGame";
}

impl ReplayEvent for EndGame {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn categories(&self) -> CategorySet {
        CategorySet::EVENT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Control event that retires a plugin from the current run.
///
/// Yield one from a handler to stop receiving events, or to retire
/// another plugin whose token you hold. The engine intercepts it when it
/// reaches the queue front: the plugin leaves the active list, the
/// handler cache is cleared, and `(code, details)` is recorded as the
/// plugin's outcome. It is never offered to handlers, and retirement is
/// not immediate: events spliced ahead of it are still dispatched to the
/// exiting plugin.
#[derive(Debug, Clone)]
pub struct PluginExit {
    /// Token of the plugin to retire.
    pub plugin: PluginId,
    /// Exit code recorded in the outcome map; zero is success.
    pub code: i32,
    /// Free-form details recorded alongside the code.
    pub details: serde_json::Map<String, Value>,
}

impl PluginExit {
    /// Reserved event name recognized by the engine.
    pub const NAME: &'static str = "PluginExit";

    /// Create an exit for the given plugin token.
    pub fn new(plugin: PluginId, code: i32) -> Self {
        Self {
            plugin,
            code,
            details: serde_json::Map::new(),
        }
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl ReplayEvent for PluginExit {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn categories(&self) -> CategorySet {
        CategorySet::EVENT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsreplay_core::{EventRef, IntoEventRef};

    #[test]
    fn test_bookend_names() {
        assert_eq!(InitGame.name(), "InitGame");
        assert_eq!(EndGame.name(), "EndGame");
    }

    #[test]
    fn test_exit_builder() {
        let exit = PluginExit::new(PluginId(3), 1).with_detail("msg", "tracker events required");
        assert_eq!(exit.plugin, PluginId(3));
        assert_eq!(exit.code, 1);
        assert_eq!(exit.details["msg"], "tracker events required");
    }

    #[test]
    fn test_exit_recognizable_through_event_ref() {
        let event: EventRef = PluginExit::new(PluginId(0), 0).into_event();
        assert_eq!(event.name(), PluginExit::NAME);
        assert!(event.downcast_ref::<PluginExit>().is_some());
    }
}
