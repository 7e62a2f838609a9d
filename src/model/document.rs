//! The JSON model document handed over by the external parser.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::namespace::Namespace;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file '{path}': {message}")]
    FileReadFailed { path: String, message: String },

    #[error("Failed to parse model JSON: {message}")]
    JsonParseFailed { message: String },
}

/// All namespaces of one compilation, core first by convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub namespaces: Vec<Namespace>,
}

impl ModelDocument {
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self { namespaces }
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path).map_err(|e| ModelError::FileReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        serde_json::from_str(content).map_err(|e| ModelError::JsonParseFailed {
            message: e.to_string(),
        })
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.name == name)
    }
}
