//! Shared domain types.

pub mod phase;

pub use phase::Phase;
