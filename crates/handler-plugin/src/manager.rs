//! Handler manager — enables and disables configured handlers.
//!
//! Enabling a handler reloads its type from the definition file, creates a
//! fresh instance, and swaps it in for any instance of the same type already
//! registered for the requested phases. Disabling unregisters it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use validator::Validate;

use handler_core::config::{HandlerConfig, HandlerEntry, ReloadPolicy};
use handler_core::error::AppError;
use handler_core::{AppResult, Phase};

use crate::context::HandlerContext;
use crate::handler::{Handler, HandlerInstance};
use crate::loader::{DefinitionLoader, TomlDefinitionLoader};
use crate::reloader::TypeReloader;
use crate::types::QualifiedName;

/// Applies handler configuration to a [`HandlerContext`].
#[derive(Debug, Clone)]
pub struct HandlerManager {
    /// Reloader used for every enable.
    reloader: TypeReloader,
    /// Handler subsystem configuration.
    config: HandlerConfig,
}

impl HandlerManager {
    /// Creates a manager loading TOML definitions.
    pub fn new(config: HandlerConfig) -> Self {
        Self::with_loader(config, Arc::new(TomlDefinitionLoader::new()))
    }

    /// Creates a manager with a custom definition loader.
    pub fn with_loader(config: HandlerConfig, loader: Arc<dyn DefinitionLoader>) -> Self {
        let reloader = TypeReloader::new(loader).with_policy(config.reload_policy);
        Self { reloader, config }
    }

    /// Returns the reloader.
    pub fn reloader(&self) -> &TypeReloader {
        &self.reloader
    }

    /// Resolves a handler source against the configured handler path.
    pub fn resolve_source(&self, source: &Path) -> PathBuf {
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.config.handler_path.join(source)
        }
    }

    /// Reloads the entry's type and registers a new instance for each of
    /// its phases, replacing earlier instances of the same type.
    ///
    /// Under [`ReloadPolicy::Rollback`], a reloaded type that does not
    /// support every requested phase is replaced by the previous binding
    /// again, so the table keeps matching the registered instances.
    pub fn enable(
        &self,
        ctx: &mut HandlerContext,
        entry: &HandlerEntry,
    ) -> AppResult<Arc<HandlerInstance>> {
        entry.validate()?;

        let name: QualifiedName = entry.class_name.parse()?;
        let previous = ctx.types.get(&name);

        let source = self.resolve_source(&entry.source);
        let definition = self
            .reloader
            .reload(&mut ctx.types, &entry.class_name, &source)?;

        if let Some(phase) = entry.phases.iter().find(|p| !definition.supports(p)) {
            if self.reloader.policy() == ReloadPolicy::Rollback {
                match previous {
                    Some(old) => {
                        warn!(
                            type_name = %name,
                            id = %old.id,
                            "Restoring previous type after rejected enable"
                        );
                        ctx.types.bind(old);
                    }
                    None => {
                        ctx.types.unbind(&name);
                    }
                }
            }
            return Err(AppError::validation(format!(
                "Handler '{}' does not support the '{}' phase",
                definition.name(),
                phase
            )));
        }

        let instance = Arc::new(HandlerInstance::new(definition, entry.arguments.clone()));
        for phase in &entry.phases {
            ctx.registry.unregister(phase, instance.type_name());
            ctx.registry.register(phase.clone(), instance.clone());
        }

        info!(
            type_name = %instance.type_name(),
            instance_id = %instance.id(),
            phases = entry.phases.len(),
            "Handler enabled"
        );

        Ok(instance)
    }

    /// Unregisters every instance of `class_name` from `phases`.
    ///
    /// Returns the number of instances removed.
    pub fn disable(&self, ctx: &mut HandlerContext, class_name: &str, phases: &[Phase]) -> usize {
        let removed: usize = phases
            .iter()
            .map(|phase| ctx.registry.unregister(phase, class_name))
            .sum();

        info!(type_name = %class_name, removed, "Handler disabled");
        removed
    }

    /// Enables or disables every configured entry, stopping at the first
    /// failure.
    ///
    /// Returns the number of handlers enabled.
    pub fn apply(&self, ctx: &mut HandlerContext) -> AppResult<usize> {
        let mut enabled = 0;

        for entry in &self.config.entries {
            if entry.enabled {
                self.enable(ctx, entry).map_err(|e| {
                    error!(type_name = %entry.class_name, error = %e, "Failed to enable handler");
                    e
                })?;
                enabled += 1;
            } else {
                self.disable(ctx, &entry.class_name, &entry.phases);
            }
        }

        info!(
            enabled,
            configured = self.config.entries.len(),
            "Handler configuration applied"
        );
        Ok(enabled)
    }
}

#[cfg(test)]
mod tests {
    use handler_core::error::ErrorKind;
    use serde_json::json;

    use super::*;

    fn config(dir: &tempfile::TempDir, entries: Vec<HandlerEntry>) -> HandlerConfig {
        HandlerConfig {
            handler_path: dir.path().to_path_buf(),
            reload_policy: ReloadPolicy::Unconditional,
            entries,
        }
    }

    fn write(dir: &tempfile::TempDir, file: &str, contents: &str) {
        std::fs::write(dir.path().join(file), contents).expect("write definition");
    }

    const REPORTER: &str = r#"
[[types]]
name = "MyOrg::Reporter"
phases = ["report", "exception"]
[types.defaults]
path = "/var/log/runs"
"#;

    #[test]
    fn test_enable_registers_for_each_phase() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let manager = HandlerManager::new(config(&dir, vec![]));
        let mut ctx = HandlerContext::new();

        let mut entry = HandlerEntry::new(
            "MyOrg::Reporter",
            "reporter.toml",
            vec![Phase::Report, Phase::Exception],
        );
        entry.arguments.insert("path".into(), json!("/tmp/runs"));

        let instance = manager.enable(&mut ctx, &entry).expect("enable");
        assert_eq!(instance.argument("path"), Some(&json!("/tmp/runs")));
        assert!(ctx.registry.is_registered(&Phase::Report, "MyOrg::Reporter"));
        assert!(ctx.registry.is_registered(&Phase::Exception, "MyOrg::Reporter"));
        assert_eq!(ctx.registry.handler_count(&Phase::Start), 0);
    }

    #[test]
    fn test_enable_twice_replaces_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let manager = HandlerManager::new(config(&dir, vec![]));
        let mut ctx = HandlerContext::new();
        let entry = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Report]);

        let first = manager.enable(&mut ctx, &entry).expect("first enable");
        let second = manager.enable(&mut ctx, &entry).expect("second enable");

        assert_eq!(ctx.registry.handler_count(&Phase::Report), 1);
        assert!(!first.definition().ptr_eq(second.definition()));
        assert_eq!(ctx.registry.handlers(&Phase::Report)[0].type_name(), "MyOrg::Reporter");
    }

    #[test]
    fn test_enable_rejects_unsupported_phase() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let manager = HandlerManager::new(config(&dir, vec![]));
        let mut ctx = HandlerContext::new();
        let entry = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Start]);

        let err = manager.enable(&mut ctx, &entry).expect_err("should fail");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(ctx.registry.handler_count(&Phase::Start), 0);
    }

    #[test]
    fn test_rejected_enable_with_rollback_restores_previous_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let mut handler_config = config(&dir, vec![]);
        handler_config.reload_policy = ReloadPolicy::Rollback;
        let manager = HandlerManager::new(handler_config);
        let mut ctx = HandlerContext::new();

        let report = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Report]);
        let enabled = manager.enable(&mut ctx, &report).expect("enable for report");

        let start = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Start]);
        let err = manager.enable(&mut ctx, &start).expect_err("start is unsupported");
        assert_eq!(err.kind, ErrorKind::Validation);

        let name: QualifiedName = "MyOrg::Reporter".parse().expect("name");
        let bound = ctx.types.get(&name).expect("still bound");
        assert!(bound.ptr_eq(enabled.definition()));
        assert!(ctx.registry.is_registered(&Phase::Report, "MyOrg::Reporter"));
    }

    #[test]
    fn test_rejected_first_enable_with_rollback_leaves_name_unbound() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let mut handler_config = config(&dir, vec![]);
        handler_config.reload_policy = ReloadPolicy::Rollback;
        let manager = HandlerManager::new(handler_config);
        let mut ctx = HandlerContext::new();

        let start = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Start]);
        manager.enable(&mut ctx, &start).expect_err("start is unsupported");

        let name: QualifiedName = "MyOrg::Reporter".parse().expect("name");
        assert!(!ctx.types.contains(&name));
    }

    #[test]
    fn test_enable_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = HandlerManager::new(config(&dir, vec![]));
        let mut ctx = HandlerContext::new();
        let entry = HandlerEntry::new("MyOrg::Reporter", "missing.toml", vec![Phase::Report]);

        let err = manager.enable(&mut ctx, &entry).expect_err("should fail");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_disable_unregisters() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        let manager = HandlerManager::new(config(&dir, vec![]));
        let mut ctx = HandlerContext::new();
        let phases = vec![Phase::Report, Phase::Exception];
        let entry = HandlerEntry::new("MyOrg::Reporter", "reporter.toml", phases.clone());

        manager.enable(&mut ctx, &entry).expect("enable");
        assert_eq!(manager.disable(&mut ctx, "MyOrg::Reporter", &phases), 2);
        assert!(ctx.registry.handlers(&Phase::Report).is_empty());
        assert!(ctx.registry.handlers(&Phase::Exception).is_empty());
    }

    #[test]
    fn test_apply_honours_enabled_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir, "reporter.toml", REPORTER);
        write(&dir, "audit.toml", "[[types]]\nname = \"MyOrg::Audit\"\n");

        let mut disabled = HandlerEntry::new("MyOrg::Audit", "audit.toml", vec![Phase::Start]);
        disabled.enabled = false;
        let entries = vec![
            HandlerEntry::new("MyOrg::Reporter", "reporter.toml", vec![Phase::Report]),
            disabled,
        ];
        let manager = HandlerManager::new(config(&dir, entries));

        let mut ctx = HandlerContext::new();
        let audit = HandlerEntry::new("MyOrg::Audit", "audit.toml", vec![Phase::Start]);
        manager.enable(&mut ctx, &audit).expect("pre-enable audit");

        assert_eq!(manager.apply(&mut ctx).expect("apply"), 1);
        assert!(ctx.registry.is_registered(&Phase::Report, "MyOrg::Reporter"));
        assert!(!ctx.registry.is_registered(&Phase::Start, "MyOrg::Audit"));
    }

    #[test]
    fn test_resolve_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = HandlerManager::new(config(&dir, vec![]));
        assert_eq!(
            manager.resolve_source(Path::new("a.toml")),
            dir.path().join("a.toml")
        );
        let absolute = dir.path().join("b.toml");
        assert_eq!(manager.resolve_source(&absolute), absolute);
    }
}
