//! Phase registry — ordered handler instances per lifecycle phase.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use handler_core::Phase;

use crate::handler::Handler;
use crate::types::name::normalize;

/// Handler instances organized by phase, in registration order.
///
/// The registry does no locking of its own. Hosts that share it between
/// threads must serialize mutations. Phases are keyed by their canonical
/// form, so `Phase::Custom("report")` and `Phase::Report` share a list.
#[derive(Debug, Default)]
pub struct PhaseRegistry {
    /// Phase → handlers in registration order.
    handlers: HashMap<Phase, Vec<Arc<dyn Handler>>>,
}

impl PhaseRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the handlers of `phase`.
    ///
    /// Registering the same handler twice yields two entries.
    pub fn register(&mut self, phase: Phase, handler: Arc<dyn Handler>) {
        let phase = phase.canonical();
        info!(
            phase = %phase,
            type_name = %handler.type_name(),
            "Handler registered"
        );
        self.handlers.entry(phase).or_default().push(handler);
    }

    /// Removes every handler of `phase` whose type is `type_name`.
    ///
    /// Remaining handlers keep their relative order. Returns the number of
    /// handlers removed; zero is not an error.
    pub fn unregister(&mut self, phase: &Phase, type_name: &str) -> usize {
        let wanted = normalize(type_name);
        let phase = phase.clone().canonical();
        let Some(entries) = self.handlers.get_mut(&phase) else {
            return 0;
        };

        let before = entries.len();
        entries.retain(|h| normalize(h.type_name()) != wanted);
        let removed = before - entries.len();

        if removed > 0 {
            info!(phase = %phase, type_name = %wanted, removed, "Handlers unregistered");
        } else {
            debug!(phase = %phase, type_name = %wanted, "No matching handlers to unregister");
        }

        removed
    }

    /// Returns the handlers of `phase` in registration order.
    pub fn handlers(&self, phase: &Phase) -> &[Arc<dyn Handler>] {
        self.handlers
            .get(&phase.clone().canonical())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of handlers registered for `phase`.
    pub fn handler_count(&self, phase: &Phase) -> usize {
        self.handlers(phase).len()
    }

    /// Returns whether a handler of type `type_name` is registered for `phase`.
    pub fn is_registered(&self, phase: &Phase, type_name: &str) -> bool {
        let wanted = normalize(type_name);
        self.handlers(phase)
            .iter()
            .any(|h| normalize(h.type_name()) == wanted)
    }

    /// Returns every phase that has been registered against, sorted.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases: Vec<Phase> = self.handlers.keys().cloned().collect();
        phases.sort();
        phases
    }
}
