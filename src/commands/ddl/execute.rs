use std::error::Error;

use serde::Serialize;

use super::DdlCmd;
use crate::commands::{Execute, compile_model};
use crate::config::{CompilerConfig, Dialect};

/// Generated DDL statements in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct DdlResult {
    pub dialect: Dialect,
    pub statements: Vec<String>,
}

impl Execute for DdlCmd {
    type Output = DdlResult;

    fn execute(self, config: &CompilerConfig) -> Result<Self::Output, Box<dyn Error>> {
        let schemas = compile_model(&self.file, self.schema.as_deref(), config)?;
        let compiler = config.dialect.compiler();

        let statements = schemas
            .iter()
            .flat_map(|schema| compiler.compile_namespace(schema))
            .collect();

        Ok(DdlResult {
            dialect: config.dialect,
            statements,
        })
    }
}
