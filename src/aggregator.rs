//! Merge page descriptors into an entry table and emission requests.
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorSource;
use crate::emission::EmissionRequest;
use crate::entries::EntryTable;
use crate::error::LoadError;

/// Two descriptors claimed the same entry name or output filename.
///
/// The later descriptor always wins; the warning records what was lost.
#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CollisionWarning {
    /// An entry name was declared again and its path overwritten.
    #[serde(rename_all = "camelCase")]
    Entry {
        name: String,
        previous: String,
        replacement: String,
        /// Descriptor that performed the overwrite.
        descriptor: PathBuf,
    },
    /// Two pages share an output filename.
    #[serde(rename_all = "camelCase")]
    Filename {
        filename: String,
        /// Descriptor that declared the filename first.
        previous: PathBuf,
        descriptor: PathBuf,
    },
}

impl fmt::Display for CollisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionWarning::Entry {
                name,
                previous,
                replacement,
                descriptor,
            } => write!(
                f,
                "entry `{}` redefined by {} ({} replaces {})",
                name,
                descriptor.display(),
                replacement,
                previous
            ),
            CollisionWarning::Filename {
                filename,
                previous,
                descriptor,
            } => write!(
                f,
                "output `{}` of {} overwrites the page from {}",
                filename,
                descriptor.display(),
                previous.display()
            ),
        }
    }
}

/// How to treat collisions between descriptors.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log each collision and keep the last declaration.
    Warn,
    /// Fail the build when any collision is found.
    Deny,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        CollisionPolicy::Warn
    }
}

/// Result of merging every descriptor of a build.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Aggregation {
    /// Base entries merged with every descriptor's entries.
    pub entries: EntryTable,
    /// One request per descriptor, in processing order.
    pub emissions: Vec<EmissionRequest>,
    /// Overwrites that happened while merging.
    pub collisions: Vec<CollisionWarning>,
}

/// Load each descriptor in order and merge it into the base entries.
///
/// Descriptors are processed strictly one after the other so that the
/// last declaration of a duplicated entry name is the one processed last.
/// The first load failure aborts the whole aggregation.
pub fn aggregate<S, P>(
    source: &S,
    paths: &[P],
    base_entries: &EntryTable,
) -> Result<Aggregation, LoadError>
where
    S: DescriptorSource + ?Sized,
    P: AsRef<Path>,
{
    let mut entries = base_entries.clone();
    let mut emissions = Vec::with_capacity(paths.len());
    let mut collisions = Vec::new();
    let mut owners: IndexMap<String, PathBuf> = IndexMap::new();

    for path in paths {
        let path = path.as_ref();
        let descriptor = source.load(path)?;
        log::debug!("loaded page {} from {}", descriptor.filename, path.display());

        let chunks = descriptor.chunk_list();

        for (name, script) in descriptor.entries.iter() {
            if let Some(previous) = entries.insert(name.clone(), script.clone())
            {
                collisions.push(CollisionWarning::Entry {
                    name: name.clone(),
                    previous,
                    replacement: script.clone(),
                    descriptor: path.to_path_buf(),
                });
            }
        }

        if let Some(previous) =
            owners.insert(descriptor.filename.clone(), path.to_path_buf())
        {
            collisions.push(CollisionWarning::Filename {
                filename: descriptor.filename.clone(),
                previous,
                descriptor: path.to_path_buf(),
            });
        }

        emissions.push(EmissionRequest {
            template: descriptor.template_path,
            filename: descriptor.filename,
            title: descriptor.title,
            chunks,
        });
    }

    Ok(Aggregation {
        entries,
        emissions,
        collisions,
    })
}
