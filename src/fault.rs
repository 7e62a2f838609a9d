//! Compile faults.
//!
//! Every fault is fatal for the namespace it occurs in: the pass aborts and
//! the fault is handed back to the caller together with the namespace name.
//! Nothing here is retried.

use thiserror::Error;

/// The modeling rule an `InvalidEntityModel` fault violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelRule {
    #[error("identity property may not be a collection")]
    CollectionIdentity,

    #[error("identity property may not be optional")]
    OptionalIdentity,

    #[error("{kind} property may not be part of the identity")]
    GroupingIdentity { kind: &'static str },

    #[error("extension entities may not declare identity properties")]
    ExtensionIdentity,

    #[error("duplicate {category} '{name}'")]
    DuplicateEntity { category: &'static str, name: String },

    #[error("duplicate namespace '{name}'")]
    DuplicateNamespace { name: String },

    #[error("core namespace '{name}' may not declare dependencies")]
    CoreDependency { name: String },

    #[error("dependency on unknown namespace '{name}'")]
    UnknownNamespace { name: String },

    #[error("reference to '{target}' requires a declared dependency on namespace '{namespace}'")]
    MissingDependency { target: String, namespace: String },

    #[error("unresolved {kind} reference '{target}'")]
    UnresolvedReference { kind: &'static str, target: String },

    #[error("'{target}' is not a {expected}")]
    WrongReferenceKind { target: String, expected: &'static str },

    #[error("grouping '{grouping}' contains itself")]
    RecursiveGrouping { grouping: String },

    #[error("grouping nesting exceeds the maximum depth of {max}")]
    NestingTooDeep { max: usize },

    #[error("referenced entity '{target}' has no identity")]
    MissingIdentity { target: String },
}

/// A fault raised while compiling a namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileFault {
    #[error("cyclic namespace dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("cyclic identity reference: {}", path.join(" -> "))]
    CyclicIdentity { path: Vec<String> },

    #[error("table name collision in schema '{schema}': '{name}' is produced by both {first} and {second}")]
    TableNameCollision {
        schema: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("invalid entity model at {location}: {rule}")]
    InvalidEntityModel { location: String, rule: ModelRule },
}

impl CompileFault {
    pub fn invalid(location: impl Into<String>, rule: ModelRule) -> Self {
        CompileFault::InvalidEntityModel {
            location: location.into(),
            rule,
        }
    }

    /// Short machine-friendly name of the fault class.
    pub fn code(&self) -> &'static str {
        match self {
            CompileFault::CyclicDependency { .. } => "CyclicDependency",
            CompileFault::CyclicIdentity { .. } => "CyclicIdentity",
            CompileFault::TableNameCollision { .. } => "TableNameCollision",
            CompileFault::InvalidEntityModel { .. } => "InvalidEntityModel",
        }
    }
}

/// A fault together with the namespace whose compilation it aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{namespace}] {fault}")]
pub struct NamespaceFault {
    pub namespace: String,
    pub fault: CompileFault,
}

/// Returned when any namespace failed; no partial schema is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("compilation failed with {} fault(s):\n{}", faults.len(), render_faults(faults))]
pub struct CompileFailure {
    pub faults: Vec<NamespaceFault>,
}

fn render_faults(faults: &[NamespaceFault]) -> String {
    faults
        .iter()
        .map(|f| format!("  {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}
