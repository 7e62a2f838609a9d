use std::error::Error;

use serde::Serialize;

use super::OrderCmd;
use crate::commands::Execute;
use crate::config::CompilerConfig;
use crate::model::{ModelDocument, resolve_build_order};

/// A namespace and its position in the build order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEntry {
    pub position: usize,
    pub name: String,
    pub is_extension: bool,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResult {
    pub namespaces: Vec<OrderEntry>,
}

impl Execute for OrderCmd {
    type Output = OrderResult;

    fn execute(self, _config: &CompilerConfig) -> Result<Self::Output, Box<dyn Error>> {
        let document = ModelDocument::load(&self.file)?;
        let ordered = resolve_build_order(&document.namespaces)?;

        let namespaces = ordered
            .into_iter()
            .enumerate()
            .map(|(i, ns)| OrderEntry {
                position: i + 1,
                name: ns.name.clone(),
                is_extension: ns.is_extension,
                dependencies: ns.dependencies.clone(),
            })
            .collect();

        Ok(OrderResult { namespaces })
    }
}
