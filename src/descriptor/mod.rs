//! Page descriptors and the loaders that read them.
//!
//! A descriptor is either a JSON document (`*.page.json`) or a module
//! (`*.page.ts`, `*.page.js`, ...) whose default export is a constant
//! object literal. Both are checked against the same structural contract.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::entries::EntryTable;
use crate::error::LoadError;
use crate::swc_utils::parse_module;

pub mod eval;
pub mod source;

pub use eval::Evaluator;
pub use source::{DescriptorSource, FsDescriptorSource};

/// File extensions that are loaded as modules.
const MODULE_EXTENSIONS: &[&str] =
    &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Declarative record describing one output page.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageDescriptor {
    /// Display title passed to the page template.
    pub title: String,
    /// Template resource used to render the page.
    pub template_path: String,
    /// Output path of the generated page, relative to the output directory.
    pub filename: String,
    /// Named bundles to include, in script tag order.
    pub chunks: Vec<String>,
    /// Entry points contributed by this page.
    #[serde(default, skip_serializing_if = "EntryTable::is_empty")]
    pub entries: EntryTable,
}

impl PageDescriptor {
    /// The declared chunks followed by the names of this page's entries.
    pub fn chunk_list(&self) -> Vec<String> {
        self.chunks
            .iter()
            .cloned()
            .chain(self.entries.names().map(String::from))
            .collect()
    }
}

/// Load a descriptor, choosing the loader from the file extension.
pub fn load_descriptor<P: AsRef<Path>>(
    path: P,
) -> Result<PageDescriptor, LoadError> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "json" {
        load_json(path)
    } else if MODULE_EXTENSIONS.contains(&ext) {
        load_module(path)
    } else {
        Err(LoadError::Unsupported(path.to_path_buf()))
    }
}

/// Load a JSON descriptor.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<PageDescriptor, LoadError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(f);
    serde_json::from_reader(reader).map_err(|source| match source.classify() {
        Category::Data => LoadError::Invalid {
            path: path.to_path_buf(),
            message: source.to_string(),
        },
        _ => LoadError::Json {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Load a module descriptor by statically evaluating its default export.
pub fn load_module<P: AsRef<Path>>(
    path: P,
) -> Result<PageDescriptor, LoadError> {
    let path = path.as_ref();
    let source =
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let module = parse_module(path, source)?;

    let invalid = |message: String| LoadError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    let value = Evaluator::new(&module, path)
        .default_export()
        .map_err(|e| invalid(format!("{:#}", e)))?;
    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}
