//! Error types for discovery, loading and building.
use std::path::PathBuf;

use thiserror::Error;

use crate::aggregator::CollisionWarning;

/// Failure to enumerate descriptor files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("descriptor root {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),

    #[error("invalid descriptor pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to walk descriptor root {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Failure to load a single page descriptor.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read page descriptor {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("{path} is not a valid page descriptor: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("unsupported page descriptor file {0}")]
    Unsupported(PathBuf),
}

impl LoadError {
    /// Path of the descriptor that failed to load.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Io { path, .. } => path,
            LoadError::Json { path, .. } => path,
            LoadError::Syntax { path, .. } => path,
            LoadError::Invalid { path, .. } => path,
            LoadError::Unsupported(path) => path,
        }
    }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{} page collision(s) found:\n{}", .0.len(), list_collisions(.0))]
    Collisions(Vec<CollisionWarning>),

    #[error("failed to emit page {filename}")]
    Emit {
        filename: String,
        #[source]
        source: anyhow::Error,
    },
}

fn list_collisions(warnings: &[CollisionWarning]) -> String {
    warnings
        .iter()
        .map(|w| format!("  {}", w))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let err = LoadError::Invalid {
            path: PathBuf::from("src/pages/home/home.page.ts"),
            message: "missing field `title`".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("home.page.ts"));
        assert!(display.contains("missing field `title`"));
        assert_eq!(
            err.path(),
            &PathBuf::from("src/pages/home/home.page.ts")
        );
    }

    #[test]
    fn collisions_display() {
        let err = BuildError::Collisions(vec![CollisionWarning::Filename {
            filename: "index.html".to_string(),
            previous: PathBuf::from("a.page.ts"),
            descriptor: PathBuf::from("b.page.ts"),
        }]);
        let display = format!("{}", err);
        assert!(display.starts_with("1 page collision(s) found"));
        assert!(display.contains("index.html"));
    }
}
