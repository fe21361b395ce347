//! Discover page descriptor files on disk.
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::{DirEntry, WalkDir};

use super::{load_descriptor, PageDescriptor};
use crate::error::{DiscoveryError, LoadError};

/// Default pattern for page descriptor files.
pub const DEFAULT_PATTERN: &str = "**/*.page.ts";

/// Enumerates and loads page descriptors.
pub trait DescriptorSource {
    /// List descriptor paths in the order they should be processed.
    fn discover(&self) -> Result<Vec<PathBuf>, DiscoveryError>;

    /// Load a single descriptor.
    fn load(&self, path: &Path) -> Result<PageDescriptor, LoadError>;
}

/// Descriptor source backed by a directory tree.
#[derive(Debug)]
pub struct FsDescriptorSource {
    root: PathBuf,
    pattern: String,
    matcher: GlobMatcher,
}

impl FsDescriptorSource {
    /// Create a source that matches `pattern` against paths
    /// relative to `root`.
    pub fn new<P: AsRef<Path>>(
        root: P,
        pattern: &str,
    ) -> Result<Self, DiscoveryError> {
        let matcher = Glob::new(pattern)
            .map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            pattern: pattern.to_string(),
            matcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DescriptorSource for FsDescriptorSource {
    /// Walk the root directory and return the sorted list of matches.
    ///
    /// Hidden directories and `node_modules` are not descended into.
    fn discover(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        if !self.root.is_dir() {
            return Err(DiscoveryError::MissingRoot(self.root.clone()));
        }

        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e));
        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative =
                entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if self.matcher.is_match(relative) {
                paths.push(entry.path().to_path_buf());
            }
        }
        paths.sort();

        log::debug!(
            "found {} descriptor(s) matching {} in {}",
            paths.len(),
            self.pattern,
            self.root.display()
        );
        Ok(paths)
    }

    fn load(&self, path: &Path) -> Result<PageDescriptor, LoadError> {
        load_descriptor(path)
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || name.starts_with('.')
}
