//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` impl producing a serializable result
//! - An `Outputable` impl rendering that result as a table

mod compile;
mod ddl;
mod order;

pub use compile::{CompileCmd, CompileResult};
pub use ddl::{DdlCmd, DdlResult};
pub use order::{OrderCmd, OrderEntry, OrderResult};

use std::error::Error;
use std::path::Path;

use clap::Subcommand;
use enum_dispatch::enum_dispatch;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::model::ModelDocument;
use crate::output::{OutputFormat, Outputable};
use crate::relational::{NamespaceSchema, RelationalModel, compile};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &CompilerConfig) -> Result<Self::Output, Box<dyn Error>>;
}

/// Runs a parsed command and renders its result.
#[enum_dispatch]
pub trait CommandRunner {
    fn run(self, config: &CompilerConfig, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

#[enum_dispatch(CommandRunner)]
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a model document into its relational table model
    Compile(CompileCmd),

    /// Generate SQL DDL for a model document
    Ddl(DdlCmd),

    /// Show the namespace build order
    Order(OrderCmd),
}

/// Load a model document and run the full pipeline.
///
/// With a schema filter, only that namespace's schema is kept; upstream
/// namespaces are still compiled since the filtered one may depend on them.
pub(crate) fn compile_model(
    file: &Path,
    schema: Option<&str>,
    config: &CompilerConfig,
) -> Result<Vec<NamespaceSchema>, Box<dyn Error>> {
    let document = ModelDocument::load(file)?;
    debug!(file = %file.display(), namespaces = document.namespaces.len(), "loaded model document");

    let model = compile(&document, config.build_options())?;
    select_schemas(model, schema)
}

fn select_schemas(model: RelationalModel, schema: Option<&str>) -> Result<Vec<NamespaceSchema>, Box<dyn Error>> {
    match schema {
        None => Ok(model.schemas),
        Some(name) => {
            let selected: Vec<NamespaceSchema> = model.schemas.into_iter().filter(|s| s.schema == name).collect();
            if selected.is_empty() {
                return Err(format!("Unknown schema: {}", name).into());
            }
            Ok(selected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RelationalModel {
        RelationalModel {
            schemas: vec![
                NamespaceSchema {
                    schema: "EdFi".to_string(),
                    is_extension: false,
                    tables: vec![],
                },
                NamespaceSchema {
                    schema: "Sample".to_string(),
                    is_extension: true,
                    tables: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_select_all_schemas() {
        let schemas = select_schemas(model(), None).unwrap();
        assert_eq!(schemas.len(), 2);
    }

    #[test]
    fn test_select_one_schema() {
        let schemas = select_schemas(model(), Some("Sample")).unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].schema, "Sample");
    }

    #[test]
    fn test_select_unknown_schema() {
        let err = select_schemas(model(), Some("Missing")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown schema: Missing");
    }
}
