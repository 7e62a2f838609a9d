//! Output formatting for compile command results.

use super::execute::CompileResult;
use crate::output::Outputable;
use crate::relational::{Table, TableKind};

fn kind_label(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Entity => "entity",
        TableKind::Child => "child",
        TableKind::Extension => "extension",
        TableKind::Type => "type",
    }
}

impl Outputable for CompileResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Relational model ({}, identifier limit {})",
            self.dialect, self.identifier_limit
        ));
        lines.push(String::new());

        if self.total_tables == 0 {
            lines.push("No tables generated.".to_string());
            return lines.join("\n");
        }

        lines.push(format!(
            "Generated {} table(s) in {} schema(s):",
            self.total_tables,
            self.schemas.len()
        ));

        let compiler = self.dialect.compiler();
        for schema in &self.schemas {
            lines.push(String::new());
            let suffix = if schema.is_extension { " [extension]" } else { "" };
            lines.push(format!("{}:{}", schema.schema, suffix));

            for table in &schema.tables {
                lines.push(format!("  {} ({})", table.name, kind_label(table.kind)));
                for column in &table.columns {
                    let key = if is_key(table, &column.name) { " [PK]" } else { "" };
                    lines.push(format!(
                        "    {} {} {}{}",
                        column.name,
                        compiler.column_type(column.data_type),
                        if column.is_nullable { "NULL" } else { "NOT NULL" },
                        key
                    ));
                }
                for fk in &table.foreign_keys {
                    let cascade = if fk.cascades_on_delete { " ON DELETE CASCADE" } else { "" };
                    lines.push(format!(
                        "    -> {}.{} ({}){}",
                        fk.foreign_schema,
                        fk.foreign_table,
                        fk.parent_columns.join(", "),
                        cascade
                    ));
                }
            }
        }

        lines.join("\n")
    }
}

fn is_key(table: &Table, column: &str) -> bool {
    table.primary_key_columns.iter().any(|c| c == column)
}
