mod execute;
mod output;

#[cfg(test)]
mod output_tests;

use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use crate::cli::validate_file_exists;
use crate::commands::{CommandRunner, Execute};
use crate::config::CompilerConfig;
use crate::output::{OutputFormat, Outputable};

pub use execute::DdlResult;

/// Generate SQL DDL for a model document
///
/// Emits CREATE SCHEMA, CREATE TABLE and foreign key statements per
/// namespace in build order, for the configured dialect.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  relschema ddl -f model.json                       # PostgreSQL DDL
  relschema ddl -f model.json --dialect sqlserver   # SQL Server DDL
  relschema ddl -f model.json --schema Sample       # Only the Sample schema
")]
pub struct DdlCmd {
    /// Path to the model JSON document
    #[arg(short, long, value_parser = validate_file_exists)]
    pub file: PathBuf,

    /// Only emit statements for this schema
    #[arg(short, long)]
    pub schema: Option<String>,
}

impl CommandRunner for DdlCmd {
    fn run(self, config: &CompilerConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(config)?;
        Ok(result.format(format))
    }
}
