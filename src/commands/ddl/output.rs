//! Output formatting for ddl command results.

use super::execute::DdlResult;
use crate::output::Outputable;

impl Outputable for DdlResult {
    /// Statements separated by blank lines, ready to pipe into a SQL client.
    fn to_table(&self) -> String {
        if self.statements.is_empty() {
            return format!("-- No statements generated for {}.", self.dialect);
        }
        self.statements.join("\n\n")
    }
}
