//! Hand finished pages over to the bundler.
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{BuildConfig, Mode};
use crate::entries::EntryTable;

/// Finalized data needed to generate one output page.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct EmissionRequest {
    pub template: String,
    pub filename: String,
    pub title: String,
    pub chunks: Vec<String>,
}

/// Receives emission requests once aggregation has finished.
pub trait EmissionSink {
    fn emit(&mut self, request: &EmissionRequest) -> Result<()>;
}

impl EmissionSink for Vec<EmissionRequest> {
    fn emit(&mut self, request: &EmissionRequest) -> Result<()> {
        self.push(request.clone());
        Ok(())
    }
}

/// Variables available to a page template.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct TemplateParameters {
    pub title: String,
}

/// HTML generation rule for a single page.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRule {
    pub template: String,
    pub filename: String,
    pub chunks: Vec<String>,
    pub minify: bool,
    pub template_parameters: TemplateParameters,
}

/// Output location and file naming for script bundles.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct OutputOptions {
    pub path: String,
    pub filename: String,
}

/// Bundler configuration produced by a build.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct BuildManifest {
    pub mode: Mode,
    pub entry: EntryTable,
    pub output: OutputOptions,
    pub devtool: String,
    pub pages: Vec<PageRule>,
}

impl BuildManifest {
    /// Write the manifest as pretty JSON to a file or stdout.
    pub fn write<P: AsRef<Path>>(&self, output: Option<P>) -> Result<()> {
        if let Some(output) = output {
            let output = output.as_ref();
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context(format!(
                        "Unable to create directory {}",
                        parent.display()
                    ))?;
                }
            }
            let f = File::create(output).context(format!(
                "Unable to create manifest {}",
                output.display()
            ))?;
            let mut writer = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            log::info!("wrote manifest to {}", output.display());
        } else {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Collects emission requests into a `BuildManifest`.
#[derive(Debug)]
pub struct ManifestSink {
    manifest: BuildManifest,
}

impl ManifestSink {
    /// Start a manifest for the final entry table of a build.
    pub fn new(config: &BuildConfig, entry: EntryTable) -> Self {
        let mode = config.mode;
        let output = OutputOptions {
            path: config.output_dir().to_string_lossy().into_owned(),
            filename: config.output_filename.clone(),
        };
        Self {
            manifest: BuildManifest {
                mode,
                entry,
                output,
                devtool: mode.devtool().to_string(),
                pages: Vec::new(),
            },
        }
    }

    pub fn finish(self) -> BuildManifest {
        self.manifest
    }
}

impl EmissionSink for ManifestSink {
    fn emit(&mut self, request: &EmissionRequest) -> Result<()> {
        let minify = self.manifest.mode.is_production();
        self.manifest.pages.push(PageRule {
            template: request.template.clone(),
            filename: request.filename.clone(),
            chunks: request.chunks.clone(),
            minify,
            template_parameters: TemplateParameters {
                title: request.title.clone(),
            },
        });
        Ok(())
    }
}
