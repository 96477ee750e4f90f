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

//! Minimal dispatch pipeline: one plugin that surfaces marker events and
//! handles them by name.
//!
//! Run with `cargo run --example replay_pipeline`.

use rtsreplay_core::{
    CategorySet, EventRef, GameStartEvent, IntoEventRef, PlayerLeaveEvent, ReplayContext,
    ReplayEvent, UserOptionsEvent,
};
use rtsreplay_engine::{DispatchEngine, HandlerResult, Hook, Plugin};
use std::any::Any;

/// Marker event carrying the name of the event whose handler produced it.
struct MarkerEvent {
    source: String,
}

impl ReplayEvent for MarkerEvent {
    fn name(&self) -> &str {
        "MarkerEvent"
    }

    fn categories(&self) -> CategorySet {
        CategorySet::EVENT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Surfaces a marker at the run bookends and on game start, then prints
/// each marker as it comes back through the queue.
struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn name(&self) -> &str {
        "marker"
    }

    fn hooks(&self) -> Vec<Hook> {
        vec![
            Hook::specific("InitGame"),
            Hook::specific("GameStartEvent"),
            Hook::specific("EndGame"),
            Hook::specific("MarkerEvent"),
        ]
    }

    fn handle_specific(&mut self, event: &EventRef, _ctx: &mut ReplayContext) -> HandlerResult {
        if let Some(marker) = event.downcast_ref::<MarkerEvent>() {
            println!("marker from {}", marker.source);
            return Ok(Vec::new());
        }
        Ok(vec![MarkerEvent {
            source: event.name().to_string(),
        }
        .into_event()])
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut engine = DispatchEngine::builder()
        .with_trace_dispatch(true)
        .with_plugin(MarkerPlugin)
        .build();

    let mut ctx = ReplayContext::new(vec![
        UserOptionsEvent { frame: 0, pid: 1 }.into_event(),
        UserOptionsEvent { frame: 0, pid: 2 }.into_event(),
        GameStartEvent { frame: 0 }.into_event(),
        PlayerLeaveEvent {
            frame: 13440,
            pid: 2,
        }
        .into_event(),
    ]);

    engine.run(&mut ctx)?;

    for (plugin, outcome) in &ctx.plugin_results {
        println!("{plugin}: code {}", outcome.code);
    }
    Ok(())
}
