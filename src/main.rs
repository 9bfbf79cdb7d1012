use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding one subdirectory per post
    posts_path: Option<PathBuf>,

    /// Where flattened `<post>.md` files are written (defaults to the posts directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    order: Option<config::Order>,

    /// Fail when a post holds more than one markdown file
    #[arg(long)]
    strict: bool,

    #[arg(short, long)]
    verbose: bool,
}

pub struct PostFlattener {
    pub posts_path: PathBuf,
    pub output_path: PathBuf,
    pub order: config::Order,
    pub strict: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct FlattenSummary {
    pub posts_scanned: usize,
    pub files_copied: usize,
    pub outputs: Vec<PathBuf>,
}

// Main processing trait
pub trait PostFlattening {
    fn flatten(&self) -> Result<FlattenSummary>;
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // Logs go to stderr so stdout carries only the per-file lines
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, then let flags override it
    let mut config = config::Config::new()?;
    if let Some(posts_path) = cli.posts_path {
        config.input.posts_path = posts_path;
    }
    if let Some(output_path) = cli.output {
        config.output.output_path = Some(output_path);
    }
    if let Some(order) = cli.order {
        config.output.order = order;
    }
    config.output.strict |= cli.strict;

    let flattener = PostFlattener::from_config(config);

    tracing::info!(
        "Flattening {} into {} ({} order)",
        flattener.posts_path.display(),
        flattener.output_path.display(),
        flattener.order
    );

    let summary = flattener.flatten()?;

    tracing::info!(
        "Scanned {} posts, copied {} markdown files into {} outputs",
        summary.posts_scanned,
        summary.files_copied,
        summary.outputs.len()
    );

    Ok(())
}

// Implementation modules
mod config;
mod flatten;
mod markdown;
