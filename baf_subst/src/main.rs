#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Command-line entry point for `baf_subst`.
//!
//! Usage: `baf_subst [-v] [--templates <dir>] collapse snippet.json [--out out.json]`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{LevelFilter, info, warn};
use serde::Serialize;

use baf_subst::{Config, TemplateRegistry, collapse_snippet, expand_snippet, load_snippet};

#[derive(Parser)]
#[command(author, version, about = "Collapse BAF script snippets into templates and expand them back.")]
struct Cli {
    /// Increase log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file (defaults to ./baf_subst.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Template library root; overrides the configuration file.
    #[arg(long, global = true)]
    templates: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every template and report what was found.
    Check,
    /// Replace template matches in a snippet with references.
    Collapse(FileArgs),
    /// Expand a snippet into one concrete statement per field set.
    Expand(FileArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Snippet JSON file.
    input: PathBuf,
    /// Write the result here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_registry(config: &Config) -> Result<TemplateRegistry> {
    let source = config.source();
    let registry = TemplateRegistry::load_all(&source)
        .with_context(|| format!("while loading templates from '{}'", source.root().display()))?;
    if registry.is_empty() {
        warn!("no templates found under '{}'", source.root().display());
    }
    Ok(registry)
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context("while serializing output")?;
    text.push('\n');
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing '{}'", path.display()))?;
            info!("wrote '{}'", path.display());
        },
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(dir) = cli.templates {
        config.template_dir = dir;
    }
    info!("template library: '{}'", config.template_dir.display());

    let registry = load_registry(&config)?;

    match cli.command {
        Commands::Check => {
            println!("{} templates in '{}'", registry.len(), config.template_dir.display());
            for template in registry.iter() {
                println!(
                    "  {:<8} {:<40} {} lines",
                    template.kind().as_str(),
                    template.name(),
                    template.line_count()
                );
            }
        },
        Commands::Collapse(args) => {
            let snippet = load_snippet(&args.input)?;
            let collapsed = collapse_snippet(&registry, &snippet);
            write_json(&collapsed, args.out.as_deref())?;
        },
        Commands::Expand(args) => {
            let snippet = load_snippet(&args.input)?;
            let statements = expand_snippet(&registry, &snippet)
                .with_context(|| format!("while expanding '{}'", args.input.display()))?;
            write_json(&statements, args.out.as_deref())?;
        },
    }

    Ok(())
}
