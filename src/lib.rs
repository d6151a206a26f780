//! # chef-handler
//!
//! Phase-keyed handler registration and hot reloading of handler types for
//! a configuration-management agent.
//!
//! - [`PhaseRegistry`] keeps handler instances per lifecycle phase.
//! - [`TypeReloader`] rebinds a qualified type name to a fresh definition
//!   loaded from a file.
//! - [`HandlerManager`] applies configured handlers to a [`HandlerContext`].

pub use handler_core::config::{AppConfig, HandlerConfig, HandlerEntry, LoggingConfig, ReloadPolicy};
pub use handler_core::error::{AppError, ErrorKind};
pub use handler_core::logging::init_logging;
pub use handler_core::{AppResult, Phase};

pub use handler_plugin::{
    DefinitionLoader, Handler, HandlerContext, HandlerInstance, HandlerManager, PhaseRegistry,
    QualifiedName, ReloadError, TomlDefinitionLoader, TypeDefinition, TypeHandle, TypeReloader,
    TypeTable,
};

#[cfg(feature = "dynamic")]
pub use handler_plugin::SharedLibraryLoader;
