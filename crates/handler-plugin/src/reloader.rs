//! Type reloader — rebinds a qualified name to a fresh definition loaded
//! from a file.
//!
//! A reload runs these steps in order:
//! 1. resolve the enclosing namespaces, creating placeholders as needed;
//! 2. unbind any definition currently at the name;
//! 3. load the file through the configured [`DefinitionLoader`];
//! 4. return whatever is now bound at the name.
//!
//! Step 2 always runs before step 3. What happens to the unbound definition
//! when step 3 fails is decided by the [`ReloadPolicy`].

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use handler_core::config::ReloadPolicy;

use crate::error::ReloadError;
use crate::loader::{DefinitionLoader, TomlDefinitionLoader};
use crate::types::{QualifiedName, TypeHandle, TypeTable};

/// Reloads handler types from definition files.
#[derive(Debug, Clone)]
pub struct TypeReloader {
    /// Loader that executes definition files.
    loader: Arc<dyn DefinitionLoader>,
    /// Behaviour on load failure.
    policy: ReloadPolicy,
}

impl TypeReloader {
    /// Creates a reloader with the given loader and the default policy.
    pub fn new(loader: Arc<dyn DefinitionLoader>) -> Self {
        Self {
            loader,
            policy: ReloadPolicy::default(),
        }
    }

    /// Sets the failure policy.
    pub fn with_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the failure policy.
    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Unloads any definition bound at `qualified_name`, loads `path`, and
    /// returns the definition the file bound at that name.
    ///
    /// The returned handle is always a new definition, even when the file
    /// is unchanged since the last load.
    pub fn reload(
        &self,
        table: &mut TypeTable,
        qualified_name: &str,
        path: &Path,
    ) -> Result<TypeHandle, ReloadError> {
        let name: QualifiedName = qualified_name.parse()?;

        let created = table.resolve_namespace(&name);
        let previous = table.unbind(&name);

        match &previous {
            Some(old) => info!(
                type_name = %name,
                previous_id = %old.id,
                namespaces_created = created,
                "Unloaded existing type"
            ),
            None => info!(
                type_name = %name,
                namespaces_created = created,
                "No existing type to unload"
            ),
        }

        let outcome = self.loader.load(path, table).and_then(|_| {
            table.get(&name).ok_or_else(|| ReloadError::NotDefined {
                name: name.to_string(),
                path: path.to_path_buf(),
            })
        });

        match outcome {
            Ok(handle) => {
                info!(
                    type_name = %name,
                    id = %handle.id,
                    path = %path.display(),
                    "Type reloaded"
                );
                Ok(handle)
            }
            Err(err) => {
                self.recover(table, &name, previous);
                Err(err)
            }
        }
    }

    fn recover(&self, table: &mut TypeTable, name: &QualifiedName, previous: Option<TypeHandle>) {
        match (self.policy, previous) {
            (ReloadPolicy::Rollback, Some(old)) => {
                warn!(type_name = %name, id = %old.id, "Reload failed, restoring previous type");
                table.bind(old);
            }
            (ReloadPolicy::Unconditional, Some(_)) => {
                warn!(type_name = %name, "Reload failed, previous type stays unloaded");
            }
            (_, None) => {
                warn!(type_name = %name, "Reload failed");
            }
        }
    }
}

impl Default for TypeReloader {
    fn default() -> Self {
        Self::new(Arc::new(TomlDefinitionLoader::new()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const HANDLER: &str = "[[types]]\nname = \"A::B::C\"\n";

    fn name(s: &str) -> QualifiedName {
        s.parse().expect("valid name")
    }

    fn write(dir: &tempfile::TempDir, file: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(file);
        std::fs::write(&path, contents).expect("write definition");
        path
    }

    fn loaded(path: &Path) -> (TypeTable, TypeHandle) {
        let mut table = TypeTable::new();
        let handle = TypeReloader::default()
            .reload(&mut table, "A::B::C", path)
            .expect("initial load");
        (table, handle)
    }

    #[test]
    fn test_reload_replaces_previous_definition() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let (mut table, old) = loaded(&path);

        let new = TypeReloader::default()
            .reload(&mut table, old.name().as_str(), &path)
            .expect("reload");

        assert_eq!(old.name(), new.name());
        assert!(!old.ptr_eq(&new));
        assert_ne!(old.id, new.id);
        let bound = table.get(&name("A::B::C")).expect("bound");
        assert!(bound.ptr_eq(&new));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_reload_picks_up_edited_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let (mut table, old) = loaded(&path);
        assert!(old.description.is_none());

        write(
            &dir,
            "test_handler.toml",
            "[[types]]\nname = \"A::B::C\"\ndescription = \"edited\"\n",
        );
        let new = TypeReloader::default()
            .reload(&mut table, "A::B::C", &path)
            .expect("reload");
        assert_eq!(new.description.as_deref(), Some("edited"));
    }

    #[test]
    fn test_reload_into_fresh_namespace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler1.toml", "[[types]]\nname = \"D::E::F\"\n");

        let mut table = TypeTable::new();
        let handle = TypeReloader::default()
            .reload(&mut table, "D::E::F", &path)
            .expect("load");

        assert_eq!(handle.name().as_str(), "D::E::F");
        assert!(table.is_namespace(&name("D")));
        assert!(table.is_namespace(&name("D::E")));
    }

    #[test]
    fn test_missing_file_unconditional_leaves_name_unbound() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let (mut table, _) = loaded(&path);

        let err = TypeReloader::default()
            .reload(&mut table, "A::B::C", &dir.path().join("missing.toml"))
            .expect_err("should fail");

        assert!(matches!(err, ReloadError::SourceNotFound { .. }));
        assert!(!table.contains(&name("A::B::C")));
        assert!(table.is_namespace(&name("A::B")));
    }

    #[test]
    fn test_missing_file_rollback_restores_previous() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let (mut table, old) = loaded(&path);

        let reloader = TypeReloader::default().with_policy(ReloadPolicy::Rollback);
        let err = reloader
            .reload(&mut table, "A::B::C", &dir.path().join("missing.toml"))
            .expect_err("should fail");

        assert!(matches!(err, ReloadError::SourceNotFound { .. }));
        let restored = table.get(&name("A::B::C")).expect("restored");
        assert!(restored.ptr_eq(&old));
    }

    #[test]
    fn test_file_without_requested_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let other = write(&dir, "other.toml", "[[types]]\nname = \"X::Y\"\n");
        let (mut table, old) = loaded(&path);

        let err = TypeReloader::default()
            .with_policy(ReloadPolicy::Rollback)
            .reload(&mut table, "A::B::C", &other)
            .expect_err("should fail");

        assert!(matches!(err, ReloadError::NotDefined { .. }));
        assert!(table.get(&name("A::B::C")).expect("restored").ptr_eq(&old));
        assert!(table.contains(&name("X::Y")));
    }

    #[test]
    fn test_invalid_name_touches_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "test_handler.toml", HANDLER);
        let mut table = TypeTable::new();

        let err = TypeReloader::default()
            .reload(&mut table, "a::b", &path)
            .expect_err("should fail");
        assert!(matches!(err, ReloadError::InvalidName { .. }));
        assert!(table.is_empty());
        assert!(table.namespaces().is_empty());
    }

    #[test]
    fn test_policy_builder() {
        assert_eq!(TypeReloader::default().policy(), ReloadPolicy::Unconditional);
        assert_eq!(
            TypeReloader::default()
                .with_policy(ReloadPolicy::Rollback)
                .policy(),
            ReloadPolicy::Rollback
        );
    }
}
