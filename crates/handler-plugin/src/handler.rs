//! Handler instances registered against lifecycle phases.

use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::TypeHandle;

/// An opaque handler value held by the phase registry.
///
/// The registry never inspects a handler beyond the qualified name of the
/// type it was created from.
pub trait Handler: Send + Sync + fmt::Debug {
    /// Returns the qualified name of the handler's originating type.
    fn type_name(&self) -> &str;
}

/// A handler created from a loaded type definition.
#[derive(Debug, Clone)]
pub struct HandlerInstance {
    /// Unique instance identifier.
    id: Uuid,
    /// The definition the instance was created from.
    definition: TypeHandle,
    /// Effective arguments: the type's defaults overlaid by caller arguments.
    arguments: Map<String, Value>,
}

impl HandlerInstance {
    /// Instantiates `definition` with `arguments` layered over its defaults.
    pub fn new(definition: TypeHandle, arguments: Map<String, Value>) -> Self {
        let mut effective = definition.defaults.clone();
        effective.extend(arguments);
        Self {
            id: Uuid::new_v4(),
            definition,
            arguments: effective,
        }
    }

    /// Returns the instance identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the definition the instance was created from.
    pub fn definition(&self) -> &TypeHandle {
        &self.definition
    }

    /// Returns the effective arguments.
    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// Returns a single argument.
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

impl Handler for HandlerInstance {
    fn type_name(&self) -> &str {
        self.definition.name().as_str()
    }
}
