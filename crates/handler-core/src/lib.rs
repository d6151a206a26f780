//! # handler-core
//!
//! Core crate for chef-handler. Contains the unified error system,
//! lifecycle phase identifiers, configuration schemas, and logging setup.
//!
//! This crate has **no** internal dependencies on other chef-handler crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::Phase;
