//! DDL compilers.
//!
//! Generates dialect-specific DDL from the finished table model. Each
//! compiler only supplies quoting, type names and default expressions; the
//! statement layout is shared. Output is deterministic: namespaces in build
//! order, tables in creation order, foreign keys after every table of the
//! namespace exists.

pub mod postgres;
pub mod sqlserver;

pub use postgres::PostgresCompiler;
pub use sqlserver::SqlServerCompiler;

use super::definition::{Column, ColumnType, DefaultValue, ForeignKey, NamespaceSchema, RelationalModel, Table};

/// A target SQL dialect.
pub trait DdlCompiler {
    /// Quote an identifier, escaping the closing quote character.
    fn quote(&self, name: &str) -> String;

    fn column_type(&self, data_type: ColumnType) -> String;

    fn default_value(&self, default: DefaultValue) -> String;

    fn create_schema(&self, schema: &str) -> String;

    fn qualify(&self, schema: &str, table: &str) -> String {
        format!("{}.{}", self.quote(schema), self.quote(table))
    }

    fn compile_column(&self, column: &Column) -> String {
        let mut line = format!(
            "{} {} {}",
            self.quote(&column.name),
            self.column_type(column.data_type),
            if column.is_nullable { "NULL" } else { "NOT NULL" }
        );
        if let Some(default) = column.default {
            line.push_str(" DEFAULT ");
            line.push_str(&self.default_value(default));
        }
        line
    }

    /// Generate `CREATE TABLE` for a single table, primary key included.
    fn compile_table(&self, table: &Table) -> String {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("    {}", self.compile_column(c)))
            .collect();

        if !table.primary_key_columns.is_empty() {
            lines.push(format!(
                "    CONSTRAINT {} PRIMARY KEY ({})",
                self.quote(&table.primary_key_name),
                self.column_list(&table.primary_key_columns)
            ));
        }

        format!(
            "CREATE TABLE {} (\n{}\n);",
            self.qualify(&table.schema, &table.name),
            lines.join(",\n")
        )
    }

    fn compile_foreign_key(&self, schema: &str, foreign_key: &ForeignKey) -> String {
        let mut statement = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({})\nREFERENCES {} ({})",
            self.qualify(schema, &foreign_key.parent_table),
            self.quote(&foreign_key.name),
            self.column_list(&foreign_key.parent_columns),
            self.qualify(&foreign_key.foreign_schema, &foreign_key.foreign_table),
            self.column_list(&foreign_key.foreign_columns)
        );
        if foreign_key.cascades_on_delete {
            statement.push_str(" ON DELETE CASCADE");
        }
        statement.push(';');
        statement
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generate DDL statements for one namespace.
    fn compile_namespace(&self, schema: &NamespaceSchema) -> Vec<String> {
        let mut statements = vec![self.create_schema(&schema.schema)];
        statements.extend(schema.tables.iter().map(|t| self.compile_table(t)));
        statements.extend(schema.tables.iter().flat_map(|t| {
            t.foreign_keys
                .iter()
                .map(|fk| self.compile_foreign_key(&t.schema, fk))
        }));
        statements
    }

    /// Generate DDL for all namespaces.
    fn compile_all(&self, model: &RelationalModel) -> Vec<String> {
        model
            .schemas
            .iter()
            .flat_map(|s| self.compile_namespace(s))
            .collect()
    }
}
