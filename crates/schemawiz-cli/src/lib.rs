//! Schemawiz command-line interface.
//!
//! Loads a JSON schema file, resolves it, and prints the model graph.

pub mod formatter;

use clap::{ArgAction, Parser};
use formatter::{create_formatter, OutputFormat};
use schemawiz_core::{RawSchema, ResolveError, Resolver, ResolverConfig};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Resolve model declarations into a typed model graph
#[derive(Parser, Debug)]
#[command(name = "schemawiz")]
#[command(version, about = "Resolve model declarations into a typed model graph")]
pub struct Args {
    /// Schema file (JSON, either {"models": {...}} or a bare map of models)
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Base namespace of generated classes
    #[arg(long, env = "SCHEMAWIZ_NAMESPACE")]
    pub namespace: Option<String>,

    /// Do not add timestamps to quick models by default
    #[arg(long)]
    pub no_timestamps: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Resolver configuration from the command-line options.
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::new().default_timestamps(!self.no_timestamps);
        if let Some(namespace) = &self.namespace {
            config = config.base_namespace(namespace);
        }
        config
    }
}

/// Errors surfaced by the command-line interface.
#[derive(Debug, Error)]
pub enum CliError {
    /// The schema file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema failed to load or resolve.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Install the tracing subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("schemawiz_core={level},schemawiz_cli={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load, resolve and format. Returns the text to print on success.
pub fn run(args: &Args) -> Result<String, CliError> {
    let source = std::fs::read_to_string(&args.file).map_err(|source| CliError::Io {
        path: args.file.clone(),
        source,
    })?;
    tracing::debug!(file = %args.file.display(), bytes = source.len(), "loaded schema file");

    let raw = RawSchema::from_json_str(&source)?;
    let graph = Resolver::new(args.resolver_config()).resolve(&raw)?;
    Ok(create_formatter(args.format).format_graph(&graph))
}

/// Render an error the way the binary prints it.
pub fn render_error(args: &Args, error: &CliError) -> String {
    match error {
        CliError::Resolve(err) => create_formatter(args.format).format_error(err),
        CliError::Io { .. } => format!("error: {}", error),
    }
}
