//! Output formatting for order command results.

use super::execute::OrderResult;
use crate::output::Outputable;

impl Outputable for OrderResult {
    fn to_table(&self) -> String {
        let mut lines = vec!["Namespace build order".to_string(), String::new()];

        if self.namespaces.is_empty() {
            lines.push("No namespaces found.".to_string());
            return lines.join("\n");
        }

        for entry in &self.namespaces {
            let mut line = format!("{:>3}. {}", entry.position, entry.name);
            if entry.is_extension {
                line.push_str(" [extension]");
            }
            if !entry.dependencies.is_empty() {
                line.push_str(&format!(" <- {}", entry.dependencies.join(", ")));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
