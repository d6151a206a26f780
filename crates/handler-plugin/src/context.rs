//! Handler context — the state the host hands to handler operations.

use crate::registry::PhaseRegistry;
use crate::types::TypeTable;

/// Phase registrations and bound types for one host configuration.
///
/// The host owns the context and passes it by reference. It carries no
/// locks; a host that shares it between threads wraps it in its own.
#[derive(Debug, Default)]
pub struct HandlerContext {
    /// Handler instances per phase.
    pub registry: PhaseRegistry,
    /// Currently bound handler types.
    pub types: TypeTable,
}

impl HandlerContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }
}
