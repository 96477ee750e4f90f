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

//! Plugin trait and capability declaration.

use crate::events::PluginId;
use rtsreplay_core::{Category, EventRef, ReplayContext};

/// A handler slot a plugin can opt into.
///
/// The seven category slots receive every event belonging to that
/// category; [`Hook::Specific`] receives only events of one concrete
/// kind, matched by name. The engine snapshots a plugin's declared hooks
/// once at registration; capabilities are static for the engine's
/// purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Every event, regardless of kind.
    Event,
    /// Message-stream events.
    MessageEvent,
    /// Game-stream events.
    GameEvent,
    /// Tracker-stream events.
    TrackerEvent,
    /// Player-action events.
    PlayerActionEvent,
    /// Ability command events.
    AbilityEvent,
    /// Control-group hotkey events.
    HotkeyEvent,
    /// A single concrete event kind, matched by name.
    Specific(String),
}

impl Hook {
    /// Declare a concrete-kind hook.
    pub fn specific(name: impl Into<String>) -> Hook {
        Hook::Specific(name.into())
    }

    pub(crate) fn category(&self) -> Option<Category> {
        match self {
            Hook::Event => Some(Category::Event),
            Hook::MessageEvent => Some(Category::Message),
            Hook::GameEvent => Some(Category::Game),
            Hook::TrackerEvent => Some(Category::Tracker),
            Hook::PlayerActionEvent => Some(Category::PlayerAction),
            Hook::AbilityEvent => Some(Category::Ability),
            Hook::HotkeyEvent => Some(Category::Hotkey),
            Hook::Specific(_) => None,
        }
    }
}

/// Events produced by one handler invocation, or the fault that aborts
/// the run.
///
/// An empty vector means the handler produced nothing. Produced events
/// are spliced in front of the queue and processed before anything that
/// was already waiting.
pub type HandlerResult = anyhow::Result<Vec<EventRef>>;

/// A replay-processing plugin.
///
/// Plugins declare which slots they handle via [`hooks`](Plugin::hooks)
/// and override the matching entry points. For one event, a plugin's
/// category handlers run in precedence order (most general first) and its
/// specific handler runs last; across plugins, registration order wins.
///
/// A handler that wants the plugin to stop being dispatched to yields a
/// [`PluginExit`](crate::events::PluginExit) naming the token received in
/// [`registered`](Plugin::registered). The engine performs no recovery
/// around handlers: returning `Err` aborts the whole run.
#[allow(unused_variables)]
pub trait Plugin: Send {
    /// Stable name, used as the key in the context outcome map.
    fn name(&self) -> &str;

    /// Capability table: the slots this plugin handles.
    fn hooks(&self) -> Vec<Hook>;

    /// Called once at registration with the plugin's identity token.
    fn registered(&mut self, id: PluginId) {}

    /// Universal slot: every dispatched event.
    fn handle_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Message-stream events.
    fn handle_message_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Game-stream events.
    fn handle_game_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Tracker-stream events.
    fn handle_tracker_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Player-action events.
    fn handle_player_action_event(
        &mut self,
        event: &EventRef,
        ctx: &mut ReplayContext,
    ) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Ability command events.
    fn handle_ability_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Control-group hotkey events.
    fn handle_hotkey_event(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }

    /// Concrete kinds declared via [`Hook::Specific`]. A plugin declaring
    /// several concrete kinds receives them all here and matches on
    /// `event.name()`.
    fn handle_specific(&mut self, event: &EventRef, ctx: &mut ReplayContext) -> HandlerResult {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsreplay_core::IntoEventRef;

    #[test]
    fn test_hook_category_mapping() {
        assert_eq!(Hook::Event.category(), Some(Category::Event));
        assert_eq!(Hook::AbilityEvent.category(), Some(Category::Ability));
        assert_eq!(Hook::specific("InitGame").category(), None);
    }

    #[test]
    fn test_default_handlers_produce_nothing() {
        struct Idle;

        impl Plugin for Idle {
            fn name(&self) -> &str {
                "idle"
            }

            fn hooks(&self) -> Vec<Hook> {
                vec![Hook::Event]
            }
        }

        let mut plugin = Idle;
        let mut ctx = ReplayContext::default();
        let event: EventRef = crate::events::InitGame.into_event();
        let produced = plugin.handle_event(&event, &mut ctx).unwrap();
        assert!(produced.is_empty());
    }
}
