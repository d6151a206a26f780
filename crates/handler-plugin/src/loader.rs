//! Definition loaders — turn a file on disk into bound handler types.
//!
//! The default [`TomlDefinitionLoader`] reads a TOML definition document.
//! With the `dynamic` feature, [`SharedLibraryLoader`] obtains the same
//! document from a compiled shared library.
//!
//! A document is loaded atomically: every declared type is parsed and
//! constructed before any of them is bound into the [`TypeTable`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use handler_core::Phase;

use crate::error::ReloadError;
use crate::types::{QualifiedName, TypeDefinition, TypeHandle, TypeTable};

/// The only definition document format currently understood.
pub const FORMAT_VERSION: u32 = 1;

/// Capability that executes a definition file and binds the types it
/// declares into a [`TypeTable`].
pub trait DefinitionLoader: Send + Sync + fmt::Debug {
    /// Loads `path`, binding every type it defines.
    ///
    /// Returns the handles that were bound, in declaration order.
    fn load(&self, path: &Path, table: &mut TypeTable) -> Result<Vec<TypeHandle>, ReloadError>;
}

/// Loads definitions from TOML documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlDefinitionLoader;

impl TomlDefinitionLoader {
    /// Creates a new TOML loader.
    pub fn new() -> Self {
        Self
    }
}

impl DefinitionLoader for TomlDefinitionLoader {
    fn load(&self, path: &Path, table: &mut TypeTable) -> Result<Vec<TypeHandle>, ReloadError> {
        let document = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReloadError::SourceNotFound {
                path: path.to_path_buf(),
            },
            _ => ReloadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        bind_document(&document, path, table)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionDocument {
    #[serde(default = "default_format")]
    format: u32,
    #[serde(default)]
    types: Vec<RawDefinition>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    #[validate(length(min = 1, max = 256))]
    name: String,
    #[validate(length(max = 512))]
    description: Option<String>,
    parent: Option<String>,
    #[serde(default)]
    phases: Vec<Phase>,
    #[serde(default)]
    defaults: serde_json::Map<String, serde_json::Value>,
}

fn default_format() -> u32 {
    FORMAT_VERSION
}

/// Parses a definition document and binds every type it declares.
pub(crate) fn bind_document(
    document: &str,
    path: &Path,
    table: &mut TypeTable,
) -> Result<Vec<TypeHandle>, ReloadError> {
    let parsed: DefinitionDocument =
        toml::from_str(document).map_err(|e| ReloadError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

    if parsed.format != FORMAT_VERSION {
        return Err(ReloadError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: parsed.format,
        });
    }

    let mut staged: Vec<TypeHandle> = Vec::with_capacity(parsed.types.len());
    let mut seen: HashMap<QualifiedName, usize> = HashMap::new();

    for raw in parsed.types {
        let handle = construct(raw, path, table, &staged, &seen)?;
        seen.insert(handle.name().clone(), staged.len());
        staged.push(handle);
    }

    for handle in &staged {
        let replaced = table.bind(handle.clone());
        debug!(
            type_name = %handle.name(),
            id = %handle.id,
            replaced = replaced.is_some(),
            "Type bound"
        );
    }

    info!(
        path = %path.display(),
        types = staged.len(),
        "Definition file loaded"
    );

    Ok(staged)
}

fn construct(
    raw: RawDefinition,
    path: &Path,
    table: &TypeTable,
    staged: &[TypeHandle],
    seen: &HashMap<QualifiedName, usize>,
) -> Result<TypeHandle, ReloadError> {
    raw.validate().map_err(|e| ReloadError::Definition {
        name: raw.name.clone(),
        reason: e.to_string(),
    })?;

    let name: QualifiedName = raw.name.parse()?;
    if seen.contains_key(&name) {
        return Err(ReloadError::Definition {
            name: name.to_string(),
            reason: "defined more than once in the same file".to_string(),
        });
    }

    let mut definition = TypeDefinition::new(name, path);
    definition.description = raw.description;

    if let Some(parent_raw) = raw.parent {
        let parent_name: QualifiedName = parent_raw.parse()?;
        let parent = seen
            .get(&parent_name)
            .map(|&index| staged[index].clone())
            .or_else(|| table.get(&parent_name))
            .ok_or_else(|| ReloadError::Definition {
                name: definition.name.to_string(),
                reason: format!("uninitialized parent type '{parent_name}'"),
            })?;

        // Inherit the parent's defaults and phase restrictions.
        definition.defaults = parent.defaults.clone();
        definition.phases = parent.phases.clone();
        definition.parent = Some(parent_name);
    }

    definition.defaults.extend(raw.defaults);
    if !raw.phases.is_empty() {
        definition.phases = raw.phases;
    }

    Ok(TypeHandle::new(definition))
}

#[cfg(feature = "dynamic")]
pub mod shared_library {
    //! Loads definition documents exported by compiled handler libraries.

    use std::ffi::{CStr, c_char};
    use std::path::Path;

    use tracing::info;

    use super::{DefinitionLoader, bind_document};
    use crate::error::ReloadError;
    use crate::types::{TypeHandle, TypeTable};

    /// Symbol every handler library must export.
    pub const DEFINITIONS_SYMBOL: &[u8] = b"handler_definitions";

    /// Type of the exported function.
    ///
    /// It must return a NUL-terminated TOML definition document that stays
    /// valid while the library is loaded.
    pub type DefinitionsFn = unsafe extern "C" fn() -> *const c_char;

    /// Loads definitions from shared libraries (.so / .dll / .dylib).
    ///
    /// Only the exported document is used; the library is closed again
    /// once it has been copied.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SharedLibraryLoader;

    impl SharedLibraryLoader {
        /// Creates a new shared library loader.
        pub fn new() -> Self {
            Self
        }

        fn read_document(path: &Path) -> Result<String, ReloadError> {
            let library_error = |e: libloading::Error| ReloadError::Library {
                path: path.to_path_buf(),
                message: e.to_string(),
            };

            // SAFETY: loading a library runs its initializers. Only trusted
            // handler libraries may be placed on the handler path.
            unsafe {
                let lib = libloading::Library::new(path).map_err(library_error)?;
                let definitions: libloading::Symbol<DefinitionsFn> =
                    lib.get(DEFINITIONS_SYMBOL).map_err(library_error)?;

                let raw = definitions();
                if raw.is_null() {
                    return Err(ReloadError::Parse {
                        path: path.to_path_buf(),
                        message: "library returned a null definition document".to_string(),
                    });
                }

                decode_document(CStr::from_ptr(raw), path)
            }
        }
    }

    /// Copies an exported document, rejecting invalid UTF-8.
    pub(super) fn decode_document(raw: &CStr, path: &Path) -> Result<String, ReloadError> {
        raw.to_str()
            .map(str::to_owned)
            .map_err(|e| ReloadError::Parse {
                path: path.to_path_buf(),
                message: format!("definition document is not valid UTF-8: {e}"),
            })
    }

    impl DefinitionLoader for SharedLibraryLoader {
        fn load(
            &self,
            path: &Path,
            table: &mut TypeTable,
        ) -> Result<Vec<TypeHandle>, ReloadError> {
            if !path.exists() {
                return Err(ReloadError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }

            let document = Self::read_document(path)?;
            info!(path = %path.display(), "Handler library loaded");
            bind_document(&document, path, table)
        }
    }
}

#[cfg(feature = "dynamic")]
pub use shared_library::SharedLibraryLoader;
