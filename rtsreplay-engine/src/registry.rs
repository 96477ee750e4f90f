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

//! Plugin registry and handler resolution.
//!
//! Resolution turns one event plus the active plugin list into the
//! ordered handler invocations for that event: plugins in registration
//! order, and within a plugin the category slots in precedence order
//! followed by the specific slot. The result depends only on the active
//! list, which is what makes it cacheable by event name.

use crate::events::PluginId;
use crate::plugin::{HandlerResult, Hook, Plugin};
use rtsreplay_core::{Category, EventRef, ReplayContext, ReplayEvent};
use std::collections::HashSet;

/// Which entry point a resolved handler refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Category(Category),
    Specific,
}

/// One resolved invocation: which plugin, which slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HandlerEntry {
    pub plugin: PluginId,
    pub slot: Slot,
}

/// Capability snapshot taken once at registration.
#[derive(Debug, Clone)]
pub(crate) struct Capabilities {
    categories: [bool; 7],
    named: HashSet<String>,
}

impl Capabilities {
    pub(crate) fn from_hooks(hooks: &[Hook]) -> Self {
        let mut categories = [false; 7];
        let mut named = HashSet::new();
        for hook in hooks {
            match hook.category() {
                Some(category) => categories[category as usize] = true,
                None => {
                    if let Hook::Specific(name) = hook {
                        named.insert(name.clone());
                    }
                }
            }
        }
        Self { categories, named }
    }

    fn has_category(&self, category: Category) -> bool {
        self.categories[category as usize]
    }

    fn has_specific(&self, name: &str) -> bool {
        self.named.contains(name)
    }
}

/// A plugin with its registration metadata.
pub(crate) struct RegisteredPlugin {
    pub id: PluginId,
    pub name: String,
    pub capabilities: Capabilities,
    pub plugin: Box<dyn Plugin>,
}

impl RegisteredPlugin {
    /// Invoke the entry point a resolved slot refers to.
    pub(crate) fn invoke(
        &mut self,
        slot: Slot,
        event: &EventRef,
        ctx: &mut ReplayContext,
    ) -> HandlerResult {
        match slot {
            Slot::Category(Category::Event) => self.plugin.handle_event(event, ctx),
            Slot::Category(Category::Message) => self.plugin.handle_message_event(event, ctx),
            Slot::Category(Category::Game) => self.plugin.handle_game_event(event, ctx),
            Slot::Category(Category::Tracker) => self.plugin.handle_tracker_event(event, ctx),
            Slot::Category(Category::PlayerAction) => {
                self.plugin.handle_player_action_event(event, ctx)
            }
            Slot::Category(Category::Ability) => self.plugin.handle_ability_event(event, ctx),
            Slot::Category(Category::Hotkey) => self.plugin.handle_hotkey_event(event, ctx),
            Slot::Specific => self.plugin.handle_specific(event, ctx),
        }
    }
}

/// Ordered collection of registered plugins.
///
/// Registration order is semantically significant: it is the cross-plugin
/// tie-break for handler execution. The registry only ever grows; runs
/// track exits in their own active list without touching it, so one run's
/// exits never leak into the next.
#[derive(Default)]
pub(crate) struct PluginRegistry {
    plugins: Vec<RegisteredPlugin>,
}

impl PluginRegistry {
    /// Append a plugin, snapshot its capability table, and hand it its
    /// identity token.
    pub(crate) fn register(&mut self, mut plugin: Box<dyn Plugin>) -> PluginId {
        let id = PluginId(self.plugins.len() as u32);
        let capabilities = Capabilities::from_hooks(&plugin.hooks());
        let name = plugin.name().to_string();
        plugin.registered(id);
        self.plugins.push(RegisteredPlugin {
            id,
            name,
            capabilities,
            plugin,
        });
        id
    }

    /// Registration-order token list; runs copy this as their initial
    /// active list.
    pub(crate) fn ids(&self) -> Vec<PluginId> {
        self.plugins.iter().map(|p| p.id).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Access by token. Tokens minted by this registry are always valid
    /// indices; [`lookup`](Self::lookup) is the fallible form for tokens
    /// arriving from control events.
    pub(crate) fn get(&self, id: PluginId) -> &RegisteredPlugin {
        &self.plugins[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: PluginId) -> &mut RegisteredPlugin {
        &mut self.plugins[id.0 as usize]
    }

    pub(crate) fn lookup(&self, id: PluginId) -> Option<&RegisteredPlugin> {
        self.plugins.get(id.0 as usize)
    }

    /// Resolve the ordered handler list for one event against the given
    /// active plugins.
    pub(crate) fn resolve(
        &self,
        event: &dyn ReplayEvent,
        active: &[PluginId],
    ) -> Vec<HandlerEntry> {
        let categories = event.categories();
        let name = event.name();

        let mut entries = Vec::new();
        for &id in active {
            let registered = self.get(id);
            for category in Category::PRECEDENCE {
                if categories.contains(category) && registered.capabilities.has_category(category)
                {
                    entries.push(HandlerEntry {
                        plugin: id,
                        slot: Slot::Category(category),
                    });
                }
            }
            if registered.capabilities.has_specific(name) {
                entries.push(HandlerEntry {
                    plugin: id,
                    slot: Slot::Specific,
                });
            }
        }
        entries
    }
}
