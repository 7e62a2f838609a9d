//! Shared model documents for command tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// A core namespace with a descriptor, an entity with a common collection,
/// and an extension namespace adding a column to that entity.
pub const SCHOOL_MODEL: &str = r#"{
    "namespaces": [
        {
            "name": "EdFi",
            "entities": [
                {
                    "name": "School",
                    "kind": "domain_entity",
                    "documentation": "An educational organization.",
                    "properties": [
                        {"name": "SchoolId", "type": "integer", "is_identity": true},
                        {"name": "NameOfInstitution", "type": "string", "max_length": 75},
                        {"name": "SchoolCategory", "type": "descriptor", "reference": "SchoolCategory",
                         "cardinality": "optional"},
                        {"name": "Address", "type": "common", "reference": "Address",
                         "cardinality": "optional_collection"}
                    ]
                },
                {
                    "name": "Address",
                    "kind": "common",
                    "properties": [
                        {"name": "StreetNumberName", "type": "string", "max_length": 150, "is_identity": true},
                        {"name": "City", "type": "string", "max_length": 30}
                    ]
                },
                {"name": "SchoolCategory", "kind": "descriptor"}
            ]
        },
        {
            "name": "Sample",
            "is_extension": true,
            "project_extension": "SAMPLE",
            "dependencies": ["EdFi"],
            "entities": [
                {
                    "name": "School",
                    "kind": "domain_entity_extension",
                    "base": "EdFi.School",
                    "properties": [
                        {"name": "IsCharter", "type": "boolean", "cardinality": "optional"}
                    ]
                }
            ]
        }
    ]
}"#;

/// An identity property with collection cardinality.
pub const INVALID_MODEL: &str = r#"{
    "namespaces": [
        {
            "name": "EdFi",
            "entities": [
                {
                    "name": "School",
                    "kind": "domain_entity",
                    "properties": [
                        {"name": "SchoolId", "type": "integer", "cardinality": "required_collection",
                         "is_identity": true}
                    ]
                }
            ]
        }
    ]
}"#;

/// Two namespaces depending on each other.
pub const CYCLIC_MODEL: &str = r#"{
    "namespaces": [
        {"name": "A", "is_extension": true, "dependencies": ["B"]},
        {"name": "B", "is_extension": true, "dependencies": ["A"]}
    ]
}"#;

/// Write a model document to a temporary file.
pub fn model_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write temp file");
    file
}
