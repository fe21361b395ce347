use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sitepack::{
    DescriptorSource, DiscoveryError, EntryTable, LoadError, PageDescriptor,
};

pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut content = std::fs::read_to_string(path)?;
    if cfg!(target_os = "windows") {
        content = content.replace("\r\n", "\n");
    }
    Ok(content)
}

/// Absolute path to a fixture project.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn entries(pairs: &[(&str, &str)]) -> EntryTable {
    pairs.iter().cloned().collect()
}

pub fn page(
    title: &str,
    filename: &str,
    chunks: &[&str],
    page_entries: &[(&str, &str)],
) -> PageDescriptor {
    PageDescriptor {
        title: title.to_string(),
        template_path: format!("{}.twig", title.to_lowercase()),
        filename: filename.to_string(),
        chunks: chunks.iter().map(|c| c.to_string()).collect(),
        entries: entries(page_entries),
    }
}

/// In-memory descriptor source that records the order of loads.
#[derive(Default)]
pub struct MemorySource {
    pages: HashMap<PathBuf, Option<PageDescriptor>>,
    order: Vec<PathBuf>,
    pub loads: RefCell<Vec<PathBuf>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, path: &str, descriptor: PageDescriptor) -> Self {
        self.order.push(PathBuf::from(path));
        self.pages.insert(PathBuf::from(path), Some(descriptor));
        self
    }

    /// Register a path that fails to load.
    pub fn broken(mut self, path: &str) -> Self {
        self.order.push(PathBuf::from(path));
        self.pages.insert(PathBuf::from(path), None);
        self
    }
}

impl DescriptorSource for MemorySource {
    fn discover(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        Ok(self.order.clone())
    }

    fn load(&self, path: &Path) -> Result<PageDescriptor, LoadError> {
        self.loads.borrow_mut().push(path.to_path_buf());
        match self.pages.get(path) {
            Some(Some(descriptor)) => Ok(descriptor.clone()),
            _ => Err(LoadError::Invalid {
                path: path.to_path_buf(),
                message: "missing field `title`".to_string(),
            }),
        }
    }
}
