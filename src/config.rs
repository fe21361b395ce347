//! Build configuration.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregator::CollisionPolicy;
use crate::descriptor::source::DEFAULT_PATTERN;
use crate::entries::EntryTable;
use crate::error::DiscoveryError;

/// Build mode, controls minification and source maps.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Production when `NODE_ENV` is `production`.
    pub fn from_env() -> Self {
        match std::env::var("NODE_ENV") {
            Ok(value) if value == "production" => Mode::Production,
            _ => Mode::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Mode::Production
    }

    /// Source map style for the mode.
    pub fn devtool(&self) -> &'static str {
        match self {
            Mode::Production => "source-map",
            Mode::Development => "inline-source-map",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::from_env()
    }
}

/// Options for a build, usually read from `sitepack.json`.
///
/// Relative paths are resolved against `root`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory.
    pub root: PathBuf,
    /// Directory searched for page descriptors.
    pub pages_dir: PathBuf,
    /// Glob matched against descriptor paths relative to `pages_dir`.
    pub pattern: String,
    /// Entries every build starts from.
    pub entries: EntryTable,
    /// Directory the bundler writes to.
    pub output_path: PathBuf,
    /// File name template for script bundles.
    pub output_filename: String,
    pub mode: Mode,
    pub collisions: CollisionPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let mut entries = EntryTable::new();
        entries.insert("index", "src/index.ts");
        Self {
            root: PathBuf::from("."),
            pages_dir: PathBuf::from("src"),
            pattern: DEFAULT_PATTERN.to_string(),
            entries,
            output_path: PathBuf::from("dist"),
            output_filename: "[name].[hash].js".to_string(),
            mode: Default::default(),
            collisions: Default::default(),
        }
    }
}

impl BuildConfig {
    /// Load a JSON config file.
    ///
    /// A relative `root` in the file is taken relative to the
    /// directory containing the file.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let f = File::open(file).context(format!(
            "Unable to open config file {}",
            file.display()
        ))?;
        let reader = BufReader::new(f);
        let mut config: BuildConfig = serde_json::from_reader(reader)
            .context(format!("Failed to parse JSON in {}", file.display()))?;
        if config.root.is_relative() {
            if let Some(parent) = file.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Copy of the config with `root` made absolute.
    ///
    /// Every path in the manifest is derived from the root, so the
    /// bundler receives absolute paths.
    pub fn absolute(&self) -> Result<Self, DiscoveryError> {
        let root = self
            .root
            .canonicalize()
            .map_err(|_| DiscoveryError::MissingRoot(self.root.clone()))?;
        Ok(Self {
            root,
            ..self.clone()
        })
    }

    /// Directory walked for descriptors.
    pub fn pages_root(&self) -> PathBuf {
        self.root.join(&self.pages_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_path)
    }

    /// Base entries with paths resolved against the project root.
    pub fn base_entries(&self) -> EntryTable {
        self.entries.resolve_against(&self.root)
    }
}
