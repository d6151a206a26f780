//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod handler;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

pub use self::handler::{HandlerConfig, HandlerEntry, ReloadPolicy};
pub use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `CHEF_HANDLER__*` vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Handler loading settings.
    #[validate(nested)]
    pub handlers: HandlerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CHEF_HANDLER__`.
    pub fn load(env: &str) -> AppResult<Self> {
        info!(env = %env, prefix = "CHEF_HANDLER", "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHEF_HANDLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;

        info!(
            handler_path = %loaded.handlers.handler_path.display(),
            reload_policy = ?loaded.handlers.reload_policy,
            entries = loaded.handlers.entries.len(),
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Load configuration from a single file, without environment overlays.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");

        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to read config '{}': {e}",
                    path.display()
                ))
            })?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }
}
