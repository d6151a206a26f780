//! # handler-plugin
//!
//! Handler subsystem for chef-handler. Provides:
//!
//! - A phase registry holding handler instances per lifecycle phase
//! - A namespace-aware table of loaded handler types
//! - Hot reloading of handler types from definition files
//! - Pluggable definition loaders (TOML, or shared libraries with `dynamic`)
//! - A manager that enables and disables configured handlers

pub mod context;
pub mod error;
pub mod handler;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod reloader;
pub mod types;

pub use context::HandlerContext;
pub use error::ReloadError;
pub use handler::{Handler, HandlerInstance};
pub use loader::{DefinitionLoader, TomlDefinitionLoader};
pub use manager::HandlerManager;
pub use registry::PhaseRegistry;
pub use reloader::TypeReloader;
pub use types::{QualifiedName, TypeDefinition, TypeHandle, TypeTable};

#[cfg(feature = "dynamic")]
pub use loader::SharedLibraryLoader;
