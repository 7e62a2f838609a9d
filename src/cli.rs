//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use crate::commands::Command;
use crate::config::{CompilerConfig, ConfigFile, Dialect, TechVersion};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Path to a configuration file (defaults to ./.relschema.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target SQL dialect (overrides the configuration file)
    #[arg(long, value_enum, global = true)]
    pub dialect: Option<Dialect>,

    /// Maximum identifier length (defaults to the dialect's limit)
    #[arg(long, global = true)]
    pub identifier_limit: Option<usize>,

    /// Target technology version, e.g. 7.1.0
    #[arg(long, value_parser = parse_version, global = true)]
    pub target_version: Option<TechVersion>,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Merge the configuration file with the command-line overrides.
    pub fn compiler_config(&self) -> Result<CompilerConfig, Box<dyn Error>> {
        let file = ConfigFile::load(self.config.as_deref())?;
        let config = CompilerConfig::resolve(&file, self.dialect, self.identifier_limit, self.target_version)?;
        Ok(config)
    }
}

fn parse_version(s: &str) -> Result<TechVersion, String> {
    s.parse().map_err(|e: crate::config::ConfigError| e.to_string())
}

/// Validate that a file path exists
pub fn validate_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("File not found: {}", s))
    }
}
