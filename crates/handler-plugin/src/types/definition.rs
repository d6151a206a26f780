//! Loaded handler type definitions.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use handler_core::Phase;

use super::name::QualifiedName;

/// A handler type as produced by one load of a definition file.
///
/// Every load produces a new definition with a fresh `id`, even when the
/// file contents are unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDefinition {
    /// Unique identifier of this particular load.
    pub id: Uuid,
    /// Qualified name the definition was declared under.
    pub name: QualifiedName,
    /// File the definition was loaded from.
    pub source: PathBuf,
    /// Human-readable description.
    pub description: Option<String>,
    /// Parent type the definition inherits from.
    pub parent: Option<QualifiedName>,
    /// Phases the handler supports. Empty means any phase.
    pub phases: Vec<Phase>,
    /// Default instance arguments, including those inherited from the parent.
    pub defaults: serde_json::Map<String, serde_json::Value>,
    /// When the definition was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl TypeDefinition {
    /// Creates a definition with a fresh identity and no optional attributes.
    pub fn new(name: QualifiedName, source: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            source: source.into(),
            description: None,
            parent: None,
            phases: Vec::new(),
            defaults: serde_json::Map::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Returns whether the handler may be registered for `phase`.
    pub fn supports(&self, phase: &Phase) -> bool {
        self.phases.is_empty() || self.phases.contains(phase)
    }
}

/// Shared reference to a live [`TypeDefinition`].
///
/// Cloning a handle never creates a new definition; use [`TypeHandle::ptr_eq`]
/// to tell whether two handles refer to the same load.
#[derive(Debug, Clone)]
pub struct TypeHandle(Arc<TypeDefinition>);

impl TypeHandle {
    /// Wraps a definition.
    pub fn new(definition: TypeDefinition) -> Self {
        Self(Arc::new(definition))
    }

    /// Returns whether both handles refer to the same definition object.
    pub fn ptr_eq(&self, other: &TypeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the qualified name of the definition.
    pub fn name(&self) -> &QualifiedName {
        &self.0.name
    }
}

impl Deref for TypeHandle {
    type Target = TypeDefinition;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<TypeDefinition> for TypeHandle {
    fn from(definition: TypeDefinition) -> Self {
        Self::new(definition)
    }
}
