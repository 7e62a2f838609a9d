//! PostgreSQL DDL compiler.

use super::DdlCompiler;
use crate::relational::definition::{ColumnType, DefaultValue, TimestampForm};

/// Compiler for PostgreSQL DDL.
pub struct PostgresCompiler;

impl DdlCompiler for PostgresCompiler {
    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn column_type(&self, data_type: ColumnType) -> String {
        match data_type {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            ColumnType::String { max_length } => format!("VARCHAR({})", max_length),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "TIMESTAMP".to_string(),
            ColumnType::Money => "MONEY".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Timestamp {
                form: TimestampForm::Local,
            } => "TIMESTAMP".to_string(),
            ColumnType::Timestamp {
                form: TimestampForm::Utc,
            } => "TIMESTAMP WITH TIME ZONE".to_string(),
        }
    }

    fn default_value(&self, default: DefaultValue) -> String {
        match default {
            DefaultValue::NewUuid => "gen_random_uuid()".to_string(),
            DefaultValue::CurrentTimestamp(TimestampForm::Local) => "now()".to_string(),
            DefaultValue::CurrentTimestamp(TimestampForm::Utc) => "(now() at time zone 'utc')".to_string(),
            DefaultValue::EmptyString => "''".to_string(),
        }
    }

    fn create_schema(&self, schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {};", self.quote(schema))
    }
}
