//! Command line parsing exposed via the library.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use structopt::StructOpt;

use super::{build, check_collisions, collect, inspect};
use crate::aggregator::CollisionPolicy;
use crate::config::{BuildConfig, Mode};

/// Config file looked up in the project root.
const CONFIG_FILE: &str = "sitepack.json";

#[derive(StructOpt, Debug)]
struct ProjectArgs {
    /// Path to a config file (default: <root>/sitepack.json)
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Project root directory
    #[structopt(short, long, parse(from_os_str))]
    root: Option<PathBuf>,

    /// Glob for page descriptor files
    #[structopt(short, long)]
    pattern: Option<String>,
}

#[derive(StructOpt)]
#[structopt(about = "Multi-page site build coordinator")]
enum SitepackCommands {
    /// Generate the bundler manifest for all pages
    Build {
        #[structopt(flatten)]
        project: ProjectArgs,

        /// Build in production mode
        #[structopt(long)]
        production: bool,

        /// Fail when pages share an entry name or output file
        #[structopt(long)]
        strict: bool,

        /// Write the manifest to a file instead of stdout
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// List page descriptors in processing order
    Pages {
        #[structopt(flatten)]
        project: ProjectArgs,
    },

    /// Print a single page descriptor as JSON
    Inspect {
        /// Page descriptor file
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
}

/// Resolve the config for a command from the config file and flags.
fn project_config(args: ProjectArgs) -> Result<BuildConfig> {
    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let file = args.config.or_else(|| {
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            Some(candidate)
        } else {
            None
        }
    });

    let mut config = if let Some(file) = file {
        log::debug!("using config {}", file.display());
        BuildConfig::load(file)?
    } else {
        Default::default()
    };

    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(pattern) = args.pattern {
        config.pattern = pattern;
    }
    Ok(config)
}

fn list_pages(config: &BuildConfig) -> Result<()> {
    let aggregation = collect(config)?;
    check_collisions(&aggregation, CollisionPolicy::Warn)?;
    for request in aggregation.emissions.iter() {
        println!("{} ({})", request.filename, request.title);
        println!("  template: {}", request.template);
        println!("  chunks: {}", request.chunks.join(", "));
    }
    println!("entries:");
    for (name, path) in aggregation.entries.iter() {
        println!("  {} => {}", name, path);
    }
    Ok(())
}

fn print_descriptor(file: &Path) -> Result<()> {
    let descriptor = inspect(file)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

/// Parse the given arguments list or `std::env::os_args` and run the program.
pub fn run<T>(argv: Option<Vec<T>>) -> Result<()>
where
    T: Into<OsString> + Clone,
{
    if std::env::var("RUST_LOG").ok().is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::try_init().ok();

    let app = SitepackCommands::clap();
    let matches = if let Some(argv) = argv {
        app.get_matches_from(argv)
    } else {
        app.get_matches()
    };
    let args = SitepackCommands::from_clap(&matches);
    match args {
        SitepackCommands::Build {
            project,
            production,
            strict,
            output,
        } => {
            let mut config = project_config(project)?;
            if production {
                config.mode = Mode::Production;
            }
            if strict {
                config.collisions = CollisionPolicy::Deny;
            }
            let manifest = build(&config)?;
            manifest.write(output)?;
        }
        SitepackCommands::Pages { project } => {
            list_pages(&project_config(project)?)?
        }
        SitepackCommands::Inspect { file } => print_descriptor(&file)?,
    }
    Ok(())
}
