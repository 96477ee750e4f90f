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

//! Rtsreplay Engine
//!
//! The engine runs through all events of a replay in order. For each
//! event, handlers from registered plugins execute in plugin-registration
//! order, and within one plugin from the most general category handler to
//! the most specific, ending with the handler for the event's own
//! concrete kind.
//!
//! For a `CommandEvent` (an ability command, so also a player action and
//! a game event), a plugin declaring `Hook::AbilityEvent` and a second
//! plugin declaring `Hook::Event` plus `Hook::specific("CommandEvent")`
//! produce the call order:
//!
//! 1. first plugin, `handle_ability_event`
//! 2. second plugin, `handle_event`
//! 3. second plugin, `handle_specific`
//!
//! The engine brackets every run with an `InitGame` and an `EndGame`
//! event, which dispatch through the same path as replay events; plugins
//! opt in with `Hook::specific("InitGame")` to reset state and
//! `Hook::specific("EndGame")` to post-process aggregated data.
//!
//! Handlers may return additional events, which are processed directly
//! after the current event, before anything already queued. This is the
//! message-passing channel between plugins: an expansion tracker can
//! surface a custom `ExpansionEvent` that any later-registered plugin
//! handles by name. A plugin that wants to stop processing yields a
//! [`PluginExit`] carrying its identity token; its exit code and details
//! land in the context outcome map, and plugins that never exit are
//! recorded as `(0, {})`.
//!
//! # Example
//!
//! ```
//! use rtsreplay_core::{ChatEvent, EventRef, IntoEventRef, ReplayContext};
//! use rtsreplay_engine::{DispatchEngine, HandlerResult, Hook, Plugin};
//!
//! struct ChatCounter {
//!     lines: u64,
//! }
//!
//! impl Plugin for ChatCounter {
//!     fn name(&self) -> &str {
//!         "chat-counter"
//!     }
//!
//!     fn hooks(&self) -> Vec<Hook> {
//!         vec![Hook::MessageEvent]
//!     }
//!
//!     fn handle_message_event(
//!         &mut self,
//!         _event: &EventRef,
//!         ctx: &mut ReplayContext,
//!     ) -> HandlerResult {
//!         self.lines += 1;
//!         ctx.set_metadata("chat_lines", self.lines);
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let mut engine = DispatchEngine::new();
//! engine.register_plugin(ChatCounter { lines: 0 });
//!
//! let mut ctx = ReplayContext::new(vec![ChatEvent {
//!     frame: 16,
//!     pid: 1,
//!     text: "glhf".to_string(),
//!     to_all: true,
//! }
//! .into_event()]);
//!
//! engine.run(&mut ctx)?;
//!
//! assert_eq!(ctx.get_metadata("chat_lines"), Some(&serde_json::json!(1)));
//! assert!(ctx.outcome("chat-counter").unwrap().is_success());
//! # Ok::<(), rtsreplay_engine::EngineError>(())
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod plugin;
mod registry;

pub use config::{ConfigError, EngineConfig, QueueOrder};
pub use dispatcher::{DispatchEngine, DispatchEngineBuilder};
pub use error::{EngineError, Result};
pub use events::{EndGame, InitGame, PluginExit, PluginId};
pub use plugin::{HandlerResult, Hook, Plugin};
