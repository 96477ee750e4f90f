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

//! The dispatch engine: plugin registration and the run loop.

use crate::config::{EngineConfig, QueueOrder};
use crate::error::{EngineError, Result};
use crate::events::{EndGame, InitGame, PluginExit, PluginId};
use crate::plugin::Plugin;
use crate::registry::{HandlerEntry, PluginRegistry};
use rtsreplay_core::{EventRef, IntoEventRef, PluginOutcome, ReplayContext, ReplayEvent};
use std::collections::{HashMap, VecDeque};

/// Engine that drives a replay event stream through registered plugins.
///
/// The engine owns the plugin registry for its whole lifetime and can run
/// any number of replays; plugin state accumulates across runs. Each run
/// works on its own active-plugin list, handler cache, and event queue,
/// so a plugin exit during one run never affects the next.
#[derive(Default)]
pub struct DispatchEngine {
    registry: PluginRegistry,
    config: EngineConfig,
}

impl DispatchEngine {
    /// Create an engine with no plugins and the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine owning the given plugins, registered in iteration
    /// order.
    pub fn with_plugins(plugins: impl IntoIterator<Item = Box<dyn Plugin>>) -> Self {
        let mut engine = Self::new();
        engine.register_plugins(plugins);
        engine
    }

    /// Create an empty engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: PluginRegistry::default(),
            config,
        }
    }

    /// Start building an engine with custom settings.
    pub fn builder() -> DispatchEngineBuilder {
        DispatchEngineBuilder::new()
    }

    /// Append a plugin to the registry.
    ///
    /// Registration order is the cross-plugin tie-break for handler
    /// execution. No deduplication is performed; registering the same
    /// logical plugin twice dispatches it twice. The returned token is
    /// the plugin's identity for exit control events.
    pub fn register_plugin(&mut self, plugin: impl Plugin + 'static) -> PluginId {
        self.registry.register(Box::new(plugin))
    }

    /// Register several plugins, in iteration order.
    pub fn register_plugins(
        &mut self,
        plugins: impl IntoIterator<Item = Box<dyn Plugin>>,
    ) -> Vec<PluginId> {
        plugins
            .into_iter()
            .map(|plugin| self.registry.register(plugin))
            .collect()
    }

    /// Number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the context's event stream through all registered plugins.
    ///
    /// The queue starts as `[InitGame] ++ ctx.events ++ [EndGame]` and
    /// drains from the front. Events produced by the handlers of one step
    /// are spliced in front of everything already queued, so they are
    /// processed next. An exit control event retires its plugin, clears
    /// the handler cache, and records the plugin's outcome; plugins still
    /// active when the queue empties are recorded as `(0, {})`.
    ///
    /// The outcome map in `ctx` is the run's sole observable result. Any
    /// handler fault aborts the run and leaves it partially populated.
    pub fn run(&mut self, ctx: &mut ReplayContext) -> Result<()> {
        let mut active: Vec<PluginId> = self.registry.ids();
        let mut cache: HashMap<String, Vec<HandlerEntry>> = HashMap::new();

        let mut queue: VecDeque<EventRef> = VecDeque::with_capacity(ctx.events.len() + 2);
        queue.push_back(InitGame.into_event());
        queue.extend(ctx.events.iter().cloned());
        queue.push_back(EndGame.into_event());

        tracing::info!(
            plugins = active.len(),
            events = queue.len(),
            "dispatch run started"
        );

        while let Some(event) = queue.pop_front() {
            if event.name() == PluginExit::NAME {
                let exit = event.downcast_ref::<PluginExit>().ok_or_else(|| {
                    EngineError::MalformedControlEvent {
                        name: event.name().to_string(),
                    }
                })?;
                self.retire(exit, &mut active, &mut cache, ctx)?;
                continue;
            }

            if !cache.contains_key(event.name()) {
                let resolved = self.registry.resolve(&*event, &active);
                cache.insert(event.name().to_string(), resolved);
            }
            let entries = &cache[event.name()];

            if self.config.trace_dispatch {
                tracing::debug!(
                    event = event.name(),
                    handlers = entries.len(),
                    queued = queue.len(),
                    "dispatching event"
                );
            }

            let mut produced: Vec<EventRef> = Vec::new();
            for entry in entries {
                let registered = self.registry.get_mut(entry.plugin);
                match registered.invoke(entry.slot, &event, ctx) {
                    Ok(mut events) => produced.append(&mut events),
                    Err(source) => {
                        return Err(EngineError::HandlerFault {
                            plugin: self.registry.get(entry.plugin).name.clone(),
                            event: event.name().to_string(),
                            source,
                        });
                    }
                }
            }

            match self.config.queue_order {
                QueueOrder::Production => {
                    for event in produced.into_iter().rev() {
                        queue.push_front(event);
                    }
                }
                QueueOrder::LegacyReversed => {
                    for event in produced {
                        queue.push_front(event);
                    }
                }
            }
        }

        // Plugins that never signalled an exit completed successfully.
        for id in active {
            let name = self.registry.get(id).name.clone();
            ctx.record_outcome(name, PluginOutcome::success());
        }

        tracing::info!(outcomes = ctx.plugin_results.len(), "dispatch run finished");
        Ok(())
    }

    /// Apply an exit control event: remove the plugin from the active
    /// list by identity and record its outcome. Exit changes which
    /// plugins every future resolution visits, so the whole cache goes,
    /// not just entries the plugin contributed to.
    fn retire(
        &self,
        exit: &PluginExit,
        active: &mut Vec<PluginId>,
        cache: &mut HashMap<String, Vec<HandlerEntry>>,
        ctx: &mut ReplayContext,
    ) -> Result<()> {
        let registered =
            self.registry
                .lookup(exit.plugin)
                .ok_or_else(|| EngineError::PluginNotActive {
                    plugin: exit.plugin.to_string(),
                })?;

        let position = active
            .iter()
            .position(|&id| id == exit.plugin)
            .ok_or_else(|| EngineError::PluginNotActive {
                plugin: registered.name.clone(),
            })?;
        active.remove(position);
        cache.clear();

        tracing::debug!(plugin = %registered.name, code = exit.code, "plugin exited");
        ctx.record_outcome(
            registered.name.clone(),
            PluginOutcome::new(exit.code, exit.details.clone()),
        );
        Ok(())
    }
}

/// Builder for engines with custom settings.
pub struct DispatchEngineBuilder {
    config: EngineConfig,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Default for DispatchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            plugins: Vec::new(),
        }
    }

    /// Set the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the batch splice order.
    pub fn with_queue_order(mut self, queue_order: QueueOrder) -> Self {
        self.config.queue_order = queue_order;
        self
    }

    /// Enable per-event dispatch tracing.
    pub fn with_trace_dispatch(mut self, trace_dispatch: bool) -> Self {
        self.config.trace_dispatch = trace_dispatch;
        self
    }

    /// Queue a plugin for registration.
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Build the engine, registering queued plugins in order.
    pub fn build(self) -> DispatchEngine {
        let mut engine = DispatchEngine::with_config(self.config);
        engine.register_plugins(self.plugins);
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{HandlerResult, Hook};

    struct Idle {
        name: &'static str,
    }

    impl Plugin for Idle {
        fn name(&self) -> &str {
            self.name
        }

        fn hooks(&self) -> Vec<Hook> {
            Vec::new()
        }
    }

    #[test]
    fn test_run_with_no_plugins() {
        let mut engine = DispatchEngine::new();
        let mut ctx = ReplayContext::default();
        engine.run(&mut ctx).unwrap();
        assert!(ctx.plugin_results.is_empty());
    }

    #[test]
    fn test_with_plugins_registers_in_iteration_order() {
        let engine = DispatchEngine::with_plugins(vec![
            Box::new(Idle { name: "a" }) as Box<dyn Plugin>,
            Box::new(Idle { name: "b" }),
        ]);
        assert_eq!(engine.plugin_count(), 2);
    }

    #[test]
    fn test_quiet_plugins_record_default_success() {
        let mut engine = DispatchEngine::new();
        engine.register_plugin(Idle { name: "a" });
        engine.register_plugin(Idle { name: "b" });

        let mut ctx = ReplayContext::default();
        engine.run(&mut ctx).unwrap();

        assert_eq!(ctx.plugin_results.len(), 2);
        assert!(ctx.outcome("a").unwrap().is_success());
        assert!(ctx.outcome("b").unwrap().details.is_empty());
    }

    #[test]
    fn test_state_does_not_leak_between_runs() {
        struct ExitOnce {
            id: Option<PluginId>,
        }

        impl Plugin for ExitOnce {
            fn name(&self) -> &str {
                "exit-once"
            }

            fn hooks(&self) -> Vec<Hook> {
                vec![Hook::specific(InitGame::NAME)]
            }

            fn registered(&mut self, id: PluginId) {
                self.id = Some(id);
            }

            fn handle_specific(
                &mut self,
                _event: &EventRef,
                _ctx: &mut ReplayContext,
            ) -> HandlerResult {
                match self.id.take() {
                    // Exit during the first run only; stay quiet after.
                    Some(id) => Ok(vec![PluginExit::new(id, 2).into_event()]),
                    None => Ok(Vec::new()),
                }
            }
        }

        let mut engine = DispatchEngine::new();
        engine.register_plugin(ExitOnce { id: None });

        let mut first = ReplayContext::default();
        engine.run(&mut first).unwrap();
        assert_eq!(first.outcome("exit-once").unwrap().code, 2);

        // The registry is untouched by the first run's exit; the second
        // run dispatches to the plugin again and it completes normally.
        let mut second = ReplayContext::default();
        engine.run(&mut second).unwrap();
        assert!(second.outcome("exit-once").unwrap().is_success());
    }

    #[test]
    fn test_malformed_control_event_is_fatal() {
        use rtsreplay_core::{CategorySet, ReplayEvent};
        use std::any::Any;

        struct Impostor;

        impl ReplayEvent for Impostor {
            fn name(&self) -> &str {
                PluginExit::NAME
            }

            fn categories(&self) -> CategorySet {
                CategorySet::EVENT
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let mut engine = DispatchEngine::new();
        let mut ctx = ReplayContext::new(vec![Impostor.into_event()]);
        assert!(matches!(
            engine.run(&mut ctx),
            Err(EngineError::MalformedControlEvent { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let engine = DispatchEngine::builder()
            .with_queue_order(QueueOrder::LegacyReversed)
            .with_trace_dispatch(true)
            .with_plugin(Idle { name: "a" })
            .build();

        assert_eq!(engine.config().queue_order, QueueOrder::LegacyReversed);
        assert!(engine.config().trace_dispatch);
        assert_eq!(engine.plugin_count(), 1);
    }
}
