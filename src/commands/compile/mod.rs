mod execute;
mod output;


use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use crate::cli::validate_file_exists;
use crate::commands::{CommandRunner, Execute};
use crate::config::CompilerConfig;
use crate::output::{OutputFormat, Outputable};

pub use execute::CompileResult;

/// Compile a model document into its relational table model
///
/// Runs validation, naming, key propagation and column building for every
/// namespace in dependency order, then prints the resulting tables.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  relschema compile -f model.json                 # All namespaces
  relschema compile -f model.json --schema Sample # Only the Sample schema
  relschema compile -f model.json -o json         # Full table model as JSON
")]
pub struct CompileCmd {
    /// Path to the model JSON document
    #[arg(short, long, value_parser = validate_file_exists)]
    pub file: PathBuf,

    /// Only show tables of this schema
    #[arg(short, long)]
    pub schema: Option<String>,
}

impl CommandRunner for CompileCmd {
    fn run(self, config: &CompilerConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(config)?;
        Ok(result.format(format))
    }
}
