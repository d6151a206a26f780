//! Namespace-aware table of bound handler types.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::definition::TypeHandle;
use super::name::QualifiedName;

/// Bindings from qualified names to live type definitions.
///
/// Namespaces are tracked explicitly; the root namespace is implicit. A
/// bound type also serves as the namespace for names nested beneath it.
#[derive(Debug, Default)]
pub struct TypeTable {
    /// Placeholder namespaces created on demand.
    namespaces: BTreeSet<QualifiedName>,
    /// Qualified name → current definition.
    types: BTreeMap<QualifiedName, TypeHandle>,
}

impl TypeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the enclosing namespaces of `name` from the root, creating an
    /// empty placeholder for each one that does not exist yet.
    ///
    /// Returns the number of namespaces created.
    pub fn resolve_namespace(&mut self, name: &QualifiedName) -> usize {
        let mut created = 0;
        for namespace in name.ancestors() {
            if !self.is_namespace(&namespace) {
                debug!(namespace = %namespace, "Creating placeholder namespace");
                self.namespaces.insert(namespace);
                created += 1;
            }
        }
        created
    }

    /// Returns whether `name` can hold nested names.
    pub fn is_namespace(&self, name: &QualifiedName) -> bool {
        self.namespaces.contains(name) || self.types.contains_key(name)
    }

    /// Returns the definition bound at `name`.
    pub fn get(&self, name: &QualifiedName) -> Option<TypeHandle> {
        self.types.get(name).cloned()
    }

    /// Returns whether a definition is bound at `name`.
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.types.contains_key(name)
    }

    /// Binds a definition at its own name, creating enclosing namespaces.
    ///
    /// Returns the definition previously bound there.
    pub fn bind(&mut self, handle: TypeHandle) -> Option<TypeHandle> {
        let name = handle.name().clone();
        self.resolve_namespace(&name);
        self.namespaces.remove(&name);
        self.types.insert(name, handle)
    }

    /// Removes the definition bound at `name`.
    ///
    /// Names nested beneath it stay reachable; `name` is kept as a
    /// placeholder namespace for them.
    pub fn unbind(&mut self, name: &QualifiedName) -> Option<TypeHandle> {
        let removed = self.types.remove(name)?;
        if self.has_nested(name) {
            self.namespaces.insert(name.clone());
        }
        Some(removed)
    }

    fn has_nested(&self, name: &QualifiedName) -> bool {
        self.types.keys().any(|n| n.is_nested_in(name))
            || self.namespaces.iter().any(|n| n.is_nested_in(name))
    }

    /// Returns the names of all bound types, sorted.
    pub fn type_names(&self) -> Vec<QualifiedName> {
        self.types.keys().cloned().collect()
    }

    /// Returns all placeholder namespaces, sorted.
    pub fn namespaces(&self) -> Vec<QualifiedName> {
        self.namespaces.iter().cloned().collect()
    }

    /// Returns the number of bound types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns whether no types are bound.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
