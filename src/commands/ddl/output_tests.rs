//! Output formatting tests for ddl command.

#[cfg(test)]
mod tests {
    use super::super::execute::DdlResult;
    use crate::config::Dialect;
    use rstest::{fixture, rstest};

    const STATEMENTS_TABLE: &str = "\
CREATE SCHEMA IF NOT EXISTS \"EdFi\";

CREATE TABLE \"EdFi\".\"School\" (
    \"SchoolId\" INTEGER NOT NULL,
    CONSTRAINT \"PK_School\" PRIMARY KEY (\"SchoolId\")
);";

    #[fixture]
    fn empty_result() -> DdlResult {
        DdlResult {
            dialect: Dialect::SqlServer,
            statements: vec![],
        }
    }

    #[fixture]
    fn statements_result() -> DdlResult {
        DdlResult {
            dialect: Dialect::PostgreSql,
            statements: vec![
                "CREATE SCHEMA IF NOT EXISTS \"EdFi\";".to_string(),
                "CREATE TABLE \"EdFi\".\"School\" (\n    \"SchoolId\" INTEGER NOT NULL,\n    \
                 CONSTRAINT \"PK_School\" PRIMARY KEY (\"SchoolId\")\n);"
                    .to_string(),
            ],
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: DdlResult,
        expected: "-- No statements generated for sqlserver.",
    }

    crate::output_table_test! {
        test_name: test_to_table_statements,
        fixture: statements_result,
        fixture_type: DdlResult,
        expected: STATEMENTS_TABLE,
    }

    #[rstest]
    fn test_format_json_lists_statements(statements_result: DdlResult) {
        use crate::output::{OutputFormat, Outputable};
        let output = statements_result.format(OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["dialect"], "postgresql");
        assert_eq!(parsed["statements"].as_array().unwrap().len(), 2);
    }
}
