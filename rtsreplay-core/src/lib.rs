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

//! Rtsreplay Core
//!
//! Fundamental data structures for replay event streams: the category
//! taxonomy, the erased event trait, representative concrete event kinds,
//! and the run context plugins observe and mutate.

pub mod context;
pub mod event;

pub use context::{PluginOutcome, ReplayContext};
pub use event::{
    Category, CategorySet, ChatEvent, CommandEvent, ControlGroupEvent, ControlGroupUpdate,
    EventRef, GameStartEvent, IntoEventRef, PlayerLeaveEvent, ReplayEvent, UnitBornEvent,
    UserOptionsEvent,
};
