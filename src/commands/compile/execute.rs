use std::error::Error;

use serde::Serialize;

use super::CompileCmd;
use crate::commands::{Execute, compile_model};
use crate::config::{CompilerConfig, Dialect};
use crate::relational::{NamespaceSchema, TimestampForm};

/// The compiled table model with the settings it was built under.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub dialect: Dialect,
    pub identifier_limit: usize,
    pub timestamp_form: TimestampForm,
    pub total_tables: usize,
    pub schemas: Vec<NamespaceSchema>,
}

impl Execute for CompileCmd {
    type Output = CompileResult;

    fn execute(self, config: &CompilerConfig) -> Result<Self::Output, Box<dyn Error>> {
        let schemas = compile_model(&self.file, self.schema.as_deref(), config)?;

        Ok(CompileResult {
            dialect: config.dialect,
            identifier_limit: config.identifier_limit,
            timestamp_form: config.timestamp_form(),
            total_tables: schemas.iter().map(|s| s.tables.len()).sum(),
            schemas,
        })
    }
}
