//! Handler loading configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Phase;

/// What happens to a previously bound definition when reloading fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// The old definition is unloaded before the file is read and stays
    /// unloaded if the load fails.
    #[default]
    Unconditional,
    /// The old definition is restored if the load fails.
    Rollback,
}

/// Handler subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HandlerConfig {
    /// Directory that relative handler sources are resolved against.
    #[serde(default = "default_handler_path")]
    pub handler_path: PathBuf,
    /// Behaviour of a reload whose load step fails.
    #[serde(default)]
    pub reload_policy: ReloadPolicy,
    /// Handlers to enable or disable when the configuration is applied.
    #[serde(default)]
    #[validate(nested)]
    pub entries: Vec<HandlerEntry>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handler_path: default_handler_path(),
            reload_policy: ReloadPolicy::default(),
            entries: Vec::new(),
        }
    }
}

/// A single configured handler.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HandlerEntry {
    /// Qualified name of the handler type, e.g. `MyOrg::Reporter`.
    #[validate(length(min = 1, max = 256))]
    pub class_name: String,
    /// Definition file; relative paths are resolved against `handler_path`.
    pub source: PathBuf,
    /// Phases the handler is registered for.
    #[validate(length(min = 1))]
    pub phases: Vec<Phase>,
    /// Arguments passed to the handler instance.
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
    /// Whether the handler should be enabled (`false` disables it).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl HandlerEntry {
    /// Creates an enabled entry with no arguments.
    pub fn new(class_name: impl Into<String>, source: impl Into<PathBuf>, phases: Vec<Phase>) -> Self {
        Self {
            class_name: class_name.into(),
            source: source.into(),
            phases,
            arguments: serde_json::Map::new(),
            enabled: true,
        }
    }
}

fn default_handler_path() -> PathBuf {
    PathBuf::from("./handlers")
}

fn default_true() -> bool {
    true
}
