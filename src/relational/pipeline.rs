//! Compilation driver.
//!
//! Namespaces are compiled one at a time in build order. Each namespace is
//! validated, then its tables are built against the read-only schemas
//! published by the namespaces before it. A fault aborts only the namespace
//! it occurs in (and, transitively, the namespaces that depend on it); the
//! run as a whole fails if any namespace failed.

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::builder::{BuildOptions, TableBuilder};
use super::definition::RelationalModel;
use crate::fault::{CompileFailure, CompileFault, NamespaceFault};
use crate::model::{ModelDocument, ModelIndex, validate_namespace};

/// Compile a model document into its relational schema.
pub fn compile(document: &ModelDocument, options: BuildOptions) -> Result<RelationalModel, CompileFailure> {
    let index = ModelIndex::new(document).map_err(|fault| CompileFailure {
        faults: vec![NamespaceFault {
            namespace: fault_namespace(&fault),
            fault,
        }],
    })?;

    let mut builder = TableBuilder::new(&index, options);
    let mut model = RelationalModel::default();
    let mut faults = Vec::new();
    let mut failed: BTreeSet<&str> = BTreeSet::new();

    for namespace in index.namespaces_in_order() {
        if let Some(upstream) = namespace
            .dependencies
            .iter()
            .find(|d| failed.contains(d.as_str()))
        {
            warn!(namespace = %namespace.name, upstream = %upstream, "skipping namespace with failed dependency");
            failed.insert(namespace.name.as_str());
            continue;
        }

        let built = validate_namespace(&index, namespace)
            .and_then(|_| builder.build_namespace(namespace, &model.schemas));

        match built {
            Ok(schema) => {
                info!(namespace = %schema.schema, tables = schema.tables.len(), "compiled namespace");
                model.schemas.push(schema);
            }
            Err(fault) => {
                warn!(namespace = %namespace.name, fault = %fault, "namespace compilation failed");
                failed.insert(namespace.name.as_str());
                faults.push(NamespaceFault {
                    namespace: namespace.name.clone(),
                    fault,
                });
            }
        }
    }

    if faults.is_empty() {
        Ok(model)
    } else {
        Err(CompileFailure { faults })
    }
}

// Namespace a graph-level fault belongs to.
fn fault_namespace(fault: &CompileFault) -> String {
    match fault {
        CompileFault::CyclicDependency { cycle } => cycle.first().cloned().unwrap_or_default(),
        CompileFault::CyclicIdentity { path } => path
            .first()
            .and_then(|p| p.split('.').next())
            .unwrap_or_default()
            .to_string(),
        CompileFault::TableNameCollision { schema, .. } => schema.clone(),
        CompileFault::InvalidEntityModel { location, .. } => {
            location.split('.').next().unwrap_or_default().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::ModelRule;
    use crate::model::{Cardinality, Entity, EntityKind, EntityRef, Namespace, Property, ReferenceKind, SimpleType};

    fn school() -> Entity {
        Entity::new("School", EntityKind::DomainEntity)
            .with_property(Property::simple("SchoolId", SimpleType::Integer, Cardinality::Required).identity())
    }

    #[test]
    fn test_compiles_namespaces_in_build_order() {
        let document = ModelDocument::new(vec![
            Namespace::extension("Sample", "SAMPLE", &["EdFi"]).with_entity(
                Entity::new(
                    "School",
                    EntityKind::DomainEntityExtension {
                        base: EntityRef::local("School"),
                    },
                )
                .with_property(Property::simple("IsCharter", SimpleType::Boolean, Cardinality::Optional)),
            ),
            Namespace::core("EdFi").with_entity(school()),
        ]);

        let model = compile(&document, BuildOptions::default()).unwrap();
        let schemas: Vec<&str> = model.schemas.iter().map(|s| s.schema.as_str()).collect();
        assert_eq!(schemas, vec!["EdFi", "Sample"]);
        assert!(model.table("Sample", "SchoolExtension").is_some());
    }

    #[test]
    fn test_dependency_cycle_fails_the_run() {
        let document = ModelDocument::new(vec![
            Namespace::extension("A", "A", &["B"]),
            Namespace::extension("B", "B", &["A"]),
        ]);

        let failure = compile(&document, BuildOptions::default()).unwrap_err();
        assert_eq!(failure.faults.len(), 1);
        assert_eq!(failure.faults[0].namespace, "A");
        assert!(matches!(failure.faults[0].fault, CompileFault::CyclicDependency { .. }));
    }

    #[test]
    fn test_core_namespace_may_not_depend_on_others() {
        let mut core = Namespace::core("EdFi").with_entity(school());
        core.dependencies.push("Other".to_string());
        let document = ModelDocument::new(vec![core, Namespace::extension("Other", "OTHER", &[])]);

        let failure = compile(&document, BuildOptions::default()).unwrap_err();
        assert_eq!(failure.faults.len(), 1);
        assert_eq!(failure.faults[0].namespace, "EdFi");
        assert!(matches!(
            failure.faults[0].fault,
            CompileFault::InvalidEntityModel {
                rule: ModelRule::CoreDependency { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_fault_is_attributed_to_its_namespace() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi").with_entity(school()),
            Namespace::extension("Sample", "SAMPLE", &["EdFi"]).with_entity(
                Entity::new("Pet", EntityKind::DomainEntity)
                    .with_property(Property::simple("PetId", SimpleType::Integer, Cardinality::Required).identity())
                    .with_property(Property::reference(
                        ReferenceKind::Descriptor,
                        EntityRef::local("Species"),
                        Cardinality::Required,
                    )),
            ),
            Namespace::extension("Downstream", "DOWN", &["Sample"]),
        ]);

        let failure = compile(&document, BuildOptions::default()).unwrap_err();
        assert_eq!(failure.faults.len(), 1);
        assert_eq!(failure.faults[0].namespace, "Sample");
        assert_eq!(
            failure.faults[0].fault,
            CompileFault::invalid(
                "Sample.Pet.Species",
                ModelRule::UnresolvedReference {
                    kind: "descriptor",
                    target: "Species".to_string()
                }
            )
        );
    }

    #[test]
    fn test_independent_namespaces_still_compile() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi").with_entity(school()),
            Namespace::extension("Broken", "BROKEN", &["EdFi"])
                .with_entity(Entity::new("Loose", EntityKind::DomainEntity)),
            Namespace::extension("Fine", "FINE", &["EdFi"]),
        ]);

        let failure = compile(&document, BuildOptions::default()).unwrap_err();
        assert_eq!(failure.faults.len(), 1);
        assert_eq!(failure.faults[0].namespace, "Broken");
    }

    #[test]
    fn test_fault_namespace() {
        let fault = CompileFault::invalid("Sample.Pet", ModelRule::OptionalIdentity);
        assert_eq!(fault_namespace(&fault), "Sample");

        let fault = CompileFault::CyclicIdentity {
            path: vec!["EdFi.A".to_string(), "EdFi.B".to_string()],
        };
        assert_eq!(fault_namespace(&fault), "EdFi");
    }
}
