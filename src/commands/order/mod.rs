mod execute;
mod output;


use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use crate::cli::validate_file_exists;
use crate::commands::{CommandRunner, Execute};
use crate::config::CompilerConfig;
use crate::output::{OutputFormat, Outputable};

pub use execute::{OrderEntry, OrderResult};

/// Show the namespace build order
///
/// Every namespace is listed after all of its dependencies. Namespaces that
/// become ready at the same time keep their declaration order.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  relschema order -f model.json           # Build order as a table
  relschema order -f model.json -o json   # Build order as JSON
")]
pub struct OrderCmd {
    /// Path to the model JSON document
    #[arg(short, long, value_parser = validate_file_exists)]
    pub file: PathBuf,
}

impl CommandRunner for OrderCmd {
    fn run(self, config: &CompilerConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(config)?;
        Ok(result.format(format))
    }
}
