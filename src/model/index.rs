//! Cross-namespace entity lookup.
//!
//! `ModelIndex` owns the namespace graph and answers "which entity does this
//! reference, made from that namespace, point at". Visibility follows the
//! declared dependency edges: a namespace sees itself and everything it
//! reaches through `dependencies`.

use std::collections::BTreeMap;

use super::document::ModelDocument;
use super::entity::{Entity, EntityRef};
use super::namespace::{Namespace, NamespaceGraph};
use super::property::ReferenceKind;
use crate::fault::{CompileFault, ModelRule};

/// An entity together with the namespace that declares it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub namespace: &'a Namespace,
    pub entity: &'a Entity,
}

impl<'a> Resolved<'a> {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace.name, self.entity.name)
    }
}

impl PartialEq for Resolved<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.entity, other.entity)
    }
}

impl Eq for Resolved<'_> {}

pub struct ModelIndex<'a> {
    graph: NamespaceGraph,
    namespaces: BTreeMap<&'a str, &'a Namespace>,
    entities: BTreeMap<(&'a str, &'a str), Vec<&'a Entity>>,
}

impl<'a> ModelIndex<'a> {
    pub fn new(document: &'a ModelDocument) -> Result<Self, CompileFault> {
        let graph = NamespaceGraph::new(&document.namespaces)?;

        let mut namespaces = BTreeMap::new();
        let mut entities: BTreeMap<(&str, &str), Vec<&Entity>> = BTreeMap::new();
        for namespace in &document.namespaces {
            namespaces.insert(namespace.name.as_str(), namespace);
            for entity in &namespace.entities {
                entities
                    .entry((namespace.name.as_str(), entity.name.as_str()))
                    .or_default()
                    .push(entity);
            }
        }

        Ok(Self {
            graph,
            namespaces,
            entities,
        })
    }

    pub fn graph(&self) -> &NamespaceGraph {
        &self.graph
    }

    /// Namespaces in build order.
    pub fn namespaces_in_order(&self) -> Vec<&'a Namespace> {
        self.graph
            .build_order()
            .iter()
            .filter_map(|name| self.namespaces.get(name.as_str()).copied())
            .collect()
    }

    pub fn namespace(&self, name: &str) -> Option<&'a Namespace> {
        self.namespaces.get(name).copied()
    }

    fn lookup(&self, namespace: &str, name: &str, kind: ReferenceKind) -> Option<Resolved<'a>> {
        let namespace = self.namespaces.get(namespace).copied()?;
        self.entities
            .get(&(namespace.name.as_str(), name))?
            .iter()
            .find(|e| e.kind.answers_to(kind))
            .map(|entity| Resolved { namespace, entity })
    }

    fn exists(&self, namespace: &str, name: &str) -> bool {
        self.entities.contains_key(&(namespace, name))
    }

    /// Resolve `reference` of the given kind as seen from namespace `from`.
    pub fn resolve(
        &self,
        from: &str,
        reference: &EntityRef,
        kind: ReferenceKind,
    ) -> Result<Resolved<'a>, ModelRule> {
        let target = reference.to_string();

        if let Some(namespace) = &reference.namespace {
            return match self.lookup(namespace, &reference.name, kind) {
                Some(found) if self.graph.is_visible(from, namespace) => Ok(found),
                Some(_) => Err(ModelRule::MissingDependency {
                    target,
                    namespace: namespace.clone(),
                }),
                None if self.exists(namespace, &reference.name) => Err(ModelRule::WrongReferenceKind {
                    target,
                    expected: kind.label(),
                }),
                None => Err(ModelRule::UnresolvedReference {
                    kind: kind.label(),
                    target,
                }),
            };
        }

        let visible = self.graph.search_order(from);
        if let Some(found) = visible
            .iter()
            .find_map(|ns| self.lookup(ns, &reference.name, kind))
        {
            return Ok(found);
        }

        // Declared somewhere the referencing namespace cannot see.
        if let Some(hidden) = self
            .graph
            .build_order()
            .iter()
            .find(|ns| self.lookup(ns, &reference.name, kind).is_some())
        {
            return Err(ModelRule::MissingDependency {
                target,
                namespace: hidden.clone(),
            });
        }

        if visible.iter().any(|ns| self.exists(ns, &reference.name)) {
            return Err(ModelRule::WrongReferenceKind {
                target,
                expected: kind.label(),
            });
        }

        Err(ModelRule::UnresolvedReference {
            kind: kind.label(),
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn document() -> ModelDocument {
        ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(Entity::new("School", EntityKind::DomainEntity))
                .with_entity(Entity::new("Address", EntityKind::Common))
                .with_entity(Entity::new("GradeLevel", EntityKind::Descriptor)),
            Namespace::extension("Sample", "SAMPLE", &["EdFi"])
                .with_entity(Entity::new("Pet", EntityKind::Common))
                .with_entity(Entity::new("School", EntityKind::Common)),
            Namespace::extension("Lonely", "LONELY", &[]),
        ])
    }

    #[rstest]
    fn test_resolves_own_namespace_first(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let found = index
            .resolve("Sample", &EntityRef::local("School"), ReferenceKind::Common)
            .unwrap();
        assert_eq!(found.qualified_name(), "Sample.School");
    }

    #[rstest]
    fn test_resolves_through_dependencies(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let found = index
            .resolve("Sample", &EntityRef::local("School"), ReferenceKind::DomainEntity)
            .unwrap();
        assert_eq!(found.qualified_name(), "EdFi.School");
    }

    #[rstest]
    fn test_qualified_reference(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let found = index
            .resolve("Sample", &EntityRef::qualified("EdFi", "Address"), ReferenceKind::Common)
            .unwrap();
        assert_eq!(found.qualified_name(), "EdFi.Address");
    }

    #[rstest]
    fn test_missing_dependency(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();

        let err = index
            .resolve("Lonely", &EntityRef::local("School"), ReferenceKind::DomainEntity)
            .unwrap_err();
        assert_eq!(
            err,
            ModelRule::MissingDependency {
                target: "School".to_string(),
                namespace: "EdFi".to_string()
            }
        );

        let err = index
            .resolve("Lonely", &EntityRef::qualified("EdFi", "School"), ReferenceKind::DomainEntity)
            .unwrap_err();
        assert!(matches!(err, ModelRule::MissingDependency { .. }));
    }

    #[rstest]
    fn test_wrong_kind(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let err = index
            .resolve("EdFi", &EntityRef::local("GradeLevel"), ReferenceKind::Enumeration)
            .unwrap_err();
        assert_eq!(
            err,
            ModelRule::WrongReferenceKind {
                target: "GradeLevel".to_string(),
                expected: "enumeration"
            }
        );
    }

    #[rstest]
    fn test_unresolved(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let err = index
            .resolve("EdFi", &EntityRef::local("Staff"), ReferenceKind::DomainEntity)
            .unwrap_err();
        assert!(matches!(err, ModelRule::UnresolvedReference { .. }));
    }

    #[rstest]
    fn test_namespaces_in_order(document: ModelDocument) {
        let index = ModelIndex::new(&document).unwrap();
        let names: Vec<&str> = index
            .namespaces_in_order()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["EdFi", "Sample", "Lonely"]);
    }
}
