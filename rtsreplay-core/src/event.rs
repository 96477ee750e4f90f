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

//! Replay event model: the category taxonomy and the erased event trait.
//!
//! Every event carries a stable `name` identifying its concrete kind and a
//! fixed set of category memberships declared at the type's definition.
//! Categories are what let plugins handle whole families of events
//! (`handle_game_event`) instead of single kinds (`handle_specific`).

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// The seven fixed classifications an event may belong to.
///
/// Dispatch visits categories in [`Category::PRECEDENCE`] order, most
/// general first, so a plugin's broad handlers always run before its
/// narrow ones for the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    /// Universal: every event belongs to this category.
    Event = 0,
    /// Chat and other in-band message traffic.
    Message = 1,
    /// Events recorded in the game stream.
    Game = 2,
    /// Events recorded in the tracker stream.
    Tracker = 3,
    /// Game events that represent a deliberate player action.
    PlayerAction = 4,
    /// Player actions that issue an ability command.
    Ability = 5,
    /// Player actions that manipulate control-group hotkeys.
    Hotkey = 6,
}

impl Category {
    /// Fixed dispatch precedence, most general to most specific.
    pub const PRECEDENCE: [Category; 7] = [
        Category::Event,
        Category::Message,
        Category::Game,
        Category::Tracker,
        Category::PlayerAction,
        Category::Ability,
        Category::Hotkey,
    ];

    /// Handler-facing name of this category.
    pub fn name(self) -> &'static str {
        match self {
            Category::Event => "Event",
            Category::Message => "MessageEvent",
            Category::Game => "GameEvent",
            Category::Tracker => "TrackerEvent",
            Category::PlayerAction => "PlayerActionEvent",
            Category::Ability => "AbilityEvent",
            Category::Hotkey => "HotkeyEvent",
        }
    }

    /// Full membership set implied by this category, including the
    /// ancestors it structurally entails (an ability event is always a
    /// player action, and every player action is a game event).
    pub fn as_set(self) -> CategorySet {
        match self {
            Category::Event => CategorySet::EVENT,
            Category::Message => CategorySet::MESSAGE,
            Category::Game => CategorySet::GAME,
            Category::Tracker => CategorySet::TRACKER,
            Category::PlayerAction => CategorySet::PLAYER_ACTION,
            Category::Ability => CategorySet::ABILITY,
            Category::Hotkey => CategorySet::HOTKEY,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed category membership of an event kind.
///
/// Declared once per concrete event type; never runtime state. The
/// universal [`Category::Event`] bit is present in every set produced by
/// the public constructors, so membership checks against it always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySet(u8);

impl CategorySet {
    /// Universal membership shared by every event.
    pub const EVENT: CategorySet = CategorySet(1);
    /// Message-stream events.
    pub const MESSAGE: CategorySet = CategorySet(1 | 1 << 1);
    /// Game-stream events.
    pub const GAME: CategorySet = CategorySet(1 | 1 << 2);
    /// Tracker-stream events.
    pub const TRACKER: CategorySet = CategorySet(1 | 1 << 3);
    /// Player actions; structurally also game events.
    pub const PLAYER_ACTION: CategorySet = CategorySet(Self::GAME.0 | 1 << 4);
    /// Ability commands; structurally player actions and game events.
    pub const ABILITY: CategorySet = CategorySet(Self::PLAYER_ACTION.0 | 1 << 5);
    /// Hotkey actions; structurally player actions and game events.
    pub const HOTKEY: CategorySet = CategorySet(Self::PLAYER_ACTION.0 | 1 << 6);

    /// Whether this set contains the given category.
    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    /// Union of two membership sets.
    pub fn union(self, other: CategorySet) -> CategorySet {
        CategorySet(self.0 | other.0)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        CategorySet::EVENT
    }
}

impl BitOr for CategorySet {
    type Output = CategorySet;

    fn bitor(self, rhs: CategorySet) -> CategorySet {
        self.union(rhs)
    }
}

/// A replay event with a stable concrete-kind name and fixed category
/// membership.
///
/// Implementations are plain data; the engine never mutates an event and
/// handlers receive shared references. [`as_any`](ReplayEvent::as_any)
/// gives handlers typed access to the payload once they have matched the
/// kind by name or category.
pub trait ReplayEvent: Send + Sync + 'static {
    /// Stable name of the concrete event kind.
    fn name(&self) -> &str;

    /// Fixed category membership of this kind.
    fn categories(&self) -> CategorySet {
        CategorySet::EVENT
    }

    /// Payload access for handlers that know the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ReplayEvent {
    /// Downcast to a concrete event type.
    pub fn downcast_ref<E: ReplayEvent>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Shared handle to an erased event, as carried by the dispatch queue.
pub type EventRef = Arc<dyn ReplayEvent>;

/// Wrap a concrete event into a queue-ready [`EventRef`].
pub trait IntoEventRef {
    fn into_event(self) -> EventRef;
}

impl<E: ReplayEvent> IntoEventRef for E {
    fn into_event(self) -> EventRef {
        Arc::new(self)
    }
}

/// Lobby options recorded for one player before launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOptionsEvent {
    pub frame: u64,
    pub pid: u8,
}

impl ReplayEvent for UserOptionsEvent {
    fn name(&self) -> &str {
        "UserOptionsEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::GAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marks the frame at which the game simulation began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartEvent {
    pub frame: u64,
}

impl ReplayEvent for GameStartEvent {
    fn name(&self) -> &str {
        "GameStartEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::GAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A player left or dropped from the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeaveEvent {
    pub frame: u64,
    pub pid: u8,
}

impl ReplayEvent for PlayerLeaveEvent {
    fn name(&self) -> &str {
        "PlayerLeaveEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::GAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// In-game chat, either to all players or to allies only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub frame: u64,
    pub pid: u8,
    pub text: String,
    pub to_all: bool,
}

impl ReplayEvent for ChatEvent {
    fn name(&self) -> &str {
        "ChatEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::MESSAGE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tracker record of a unit entering the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBornEvent {
    pub frame: u64,
    pub unit_type: String,
    pub pid: u8,
    pub x: u16,
    pub y: u16,
}

impl ReplayEvent for UnitBornEvent {
    fn name(&self) -> &str {
        "UnitBornEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::TRACKER
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A player issued an ability command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub frame: u64,
    pub pid: u8,
    pub ability: String,
}

impl ReplayEvent for CommandEvent {
    fn name(&self) -> &str {
        "CommandEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::ABILITY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// How a control-group event manipulates its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlGroupUpdate {
    /// Overwrite the group with the current selection.
    Set,
    /// Add the current selection to the group.
    Append,
    /// Restore the group as the current selection.
    Recall,
}

/// A player set, extended, or recalled a control-group hotkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlGroupEvent {
    pub frame: u64,
    pub pid: u8,
    pub group: u8,
    pub update: ControlGroupUpdate,
}

impl ReplayEvent for ControlGroupEvent {
    fn name(&self) -> &str {
        "ControlGroupEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::HOTKEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_set_is_universal() {
        for category in Category::PRECEDENCE {
            assert!(category.as_set().contains(Category::Event));
        }
    }

    #[test]
    fn test_ability_membership_chain() {
        let event = CommandEvent {
            frame: 100,
            pid: 1,
            ability: "Blink".to_string(),
        };

        let set = event.categories();
        assert!(set.contains(Category::Event));
        assert!(set.contains(Category::Game));
        assert!(set.contains(Category::PlayerAction));
        assert!(set.contains(Category::Ability));
        assert!(!set.contains(Category::Hotkey));
        assert!(!set.contains(Category::Message));
    }

    #[test]
    fn test_hotkey_membership_chain() {
        let event = ControlGroupEvent {
            frame: 50,
            pid: 2,
            group: 4,
            update: ControlGroupUpdate::Set,
        };

        let set = event.categories();
        assert!(set.contains(Category::Game));
        assert!(set.contains(Category::PlayerAction));
        assert!(set.contains(Category::Hotkey));
        assert!(!set.contains(Category::Ability));
    }

    #[test]
    fn test_tracker_is_not_a_game_event() {
        let event = UnitBornEvent {
            frame: 10,
            unit_type: "Probe".to_string(),
            pid: 1,
            x: 20,
            y: 31,
        };

        let set = event.categories();
        assert!(set.contains(Category::Tracker));
        assert!(!set.contains(Category::Game));
        assert!(!set.contains(Category::PlayerAction));
    }

    #[test]
    fn test_downcast_through_event_ref() {
        let event: EventRef = ChatEvent {
            frame: 7,
            pid: 1,
            text: "glhf".to_string(),
            to_all: true,
        }
        .into_event();

        assert_eq!(event.name(), "ChatEvent");
        let chat = event.downcast_ref::<ChatEvent>().unwrap();
        assert_eq!(chat.text, "glhf");
        assert!(event.downcast_ref::<GameStartEvent>().is_none());
    }

    #[test]
    fn test_union_composes_sets() {
        let set = CategorySet::MESSAGE | CategorySet::TRACKER;
        assert!(set.contains(Category::Message));
        assert!(set.contains(Category::Tracker));
        assert!(set.contains(Category::Event));
        assert!(!set.contains(Category::Game));
    }
}
