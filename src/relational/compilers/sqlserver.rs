//! SQL Server DDL compiler.

use super::DdlCompiler;
use crate::relational::definition::{ColumnType, DefaultValue, TimestampForm};

/// Compiler for SQL Server (T-SQL) DDL.
pub struct SqlServerCompiler;

impl DdlCompiler for SqlServerCompiler {
    fn quote(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn column_type(&self, data_type: ColumnType) -> String {
        match data_type {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            ColumnType::String { max_length } => format!("NVARCHAR({})", max_length),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME2(7)".to_string(),
            ColumnType::Money => "MONEY".to_string(),
            ColumnType::Uuid => "UNIQUEIDENTIFIER".to_string(),
            ColumnType::Timestamp {
                form: TimestampForm::Local,
            } => "DATETIME".to_string(),
            ColumnType::Timestamp {
                form: TimestampForm::Utc,
            } => "DATETIME2".to_string(),
        }
    }

    fn default_value(&self, default: DefaultValue) -> String {
        match default {
            DefaultValue::NewUuid => "newid()".to_string(),
            DefaultValue::CurrentTimestamp(TimestampForm::Local) => "getdate()".to_string(),
            DefaultValue::CurrentTimestamp(TimestampForm::Utc) => "getutcdate()".to_string(),
            DefaultValue::EmptyString => "''".to_string(),
        }
    }

    fn create_schema(&self, schema: &str) -> String {
        format!(
            "IF NOT EXISTS (SELECT 1 FROM sys.schemas WHERE name = N'{}')\nEXEC('CREATE SCHEMA {}');",
            schema.replace('\'', "''"),
            self.quote(schema).replace('\'', "''")
        )
    }
}
