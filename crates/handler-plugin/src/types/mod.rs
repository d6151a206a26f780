//! Type system for handler definitions — names, definitions, and the
//! namespace-aware binding table.

pub mod definition;
pub mod name;
pub mod table;

pub use definition::{TypeDefinition, TypeHandle};
pub use name::QualifiedName;
pub use table::TypeTable;
