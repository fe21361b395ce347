//! Coordinate multi-page site builds.
//!
//! Page descriptors are discovered under a project, merged into a
//! single entry table and turned into one HTML generation rule per page.
//! The result is a `BuildManifest` for an external bundler.
use std::path::Path;

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod emission;
pub mod entries;
pub mod error;
mod swc_utils;

pub use aggregator::{aggregate, Aggregation, CollisionPolicy, CollisionWarning};
pub use config::{BuildConfig, Mode};
pub use descriptor::{DescriptorSource, FsDescriptorSource, PageDescriptor};
pub use emission::{BuildManifest, EmissionRequest, EmissionSink, ManifestSink};
pub use entries::EntryTable;
pub use error::{BuildError, DiscoveryError, LoadError};

/// Discover and merge the descriptors for a config.
///
/// A relative project root is made absolute before discovery.
pub fn collect(config: &BuildConfig) -> Result<Aggregation, BuildError> {
    let config = config.absolute()?;
    let source = FsDescriptorSource::new(config.pages_root(), &config.pattern)?;
    let paths = source.discover()?;
    log::info!(
        "found {} page descriptor(s) in {}",
        paths.len(),
        source.root().display()
    );
    let aggregation = aggregate(&source, &paths, &config.base_entries())?;
    Ok(aggregation)
}

/// Apply the collision policy to a finished aggregation.
pub fn check_collisions(
    aggregation: &Aggregation,
    policy: CollisionPolicy,
) -> Result<(), BuildError> {
    if aggregation.collisions.is_empty() {
        return Ok(());
    }
    match policy {
        CollisionPolicy::Warn => {
            for warning in aggregation.collisions.iter() {
                log::warn!("{}", warning);
            }
            Ok(())
        }
        CollisionPolicy::Deny => {
            Err(BuildError::Collisions(aggregation.collisions.clone()))
        }
    }
}

/// Hand every emission request of an aggregation to a sink.
pub fn emit_all<S: EmissionSink + ?Sized>(
    aggregation: &Aggregation,
    sink: &mut S,
) -> Result<(), BuildError> {
    for request in aggregation.emissions.iter() {
        sink.emit(request).map_err(|source| BuildError::Emit {
            filename: request.filename.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Run a complete build and return the bundler manifest.
pub fn build(config: &BuildConfig) -> Result<BuildManifest, BuildError> {
    let config = config.absolute()?;
    let aggregation = collect(&config)?;
    check_collisions(&aggregation, config.collisions)?;

    let mut sink = ManifestSink::new(&config, aggregation.entries.clone());
    emit_all(&aggregation, &mut sink)?;
    let manifest = sink.finish();

    log::info!(
        "{} page(s), {} entr{} ({:?})",
        manifest.pages.len(),
        manifest.entry.len(),
        if manifest.entry.len() == 1 { "y" } else { "ies" },
        manifest.mode
    );
    Ok(manifest)
}

/// Load a single descriptor file.
pub fn inspect<P: AsRef<Path>>(file: P) -> Result<PageDescriptor, LoadError> {
    descriptor::load_descriptor(file)
}
