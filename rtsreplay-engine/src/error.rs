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

//! Engine error types.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal conditions that abort a run.
///
/// There is no partial-result recovery: when a run returns an error the
/// context outcome map is left only partially populated and the run is
/// not retried.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A handler returned an error. The engine performs no interception
    /// or recovery around handler invocation.
    #[error("handler fault in plugin '{plugin}' while dispatching '{event}'")]
    HandlerFault {
        plugin: String,
        event: String,
        #[source]
        source: anyhow::Error,
    },

    /// A plugin exit named a plugin that is not in the active list, for
    /// example a duplicate exit.
    #[error("plugin '{plugin}' is not active")]
    PluginNotActive { plugin: String },

    /// An event used the reserved control-event name without carrying a
    /// control payload.
    #[error("event named '{name}' does not carry a plugin exit payload")]
    MalformedControlEvent { name: String },
}
