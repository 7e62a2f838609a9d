//! Per-namespace model validation.
//!
//! Runs before any table is derived. The first rule violation aborts the
//! namespace with an `InvalidEntityModel` fault naming the entity (and
//! property) at fault.

use std::collections::BTreeSet;

use tracing::trace;

use super::entity::Entity;
use super::index::ModelIndex;
use super::namespace::Namespace;
use super::property::{Property, ReferenceKind};
use crate::fault::{CompileFault, ModelRule};

pub fn validate_namespace(index: &ModelIndex<'_>, namespace: &Namespace) -> Result<(), CompileFault> {
    let mut seen = BTreeSet::new();
    for entity in &namespace.entities {
        if !seen.insert((entity.kind.category(), entity.name.as_str())) {
            return Err(CompileFault::invalid(
                entity_location(namespace, entity),
                ModelRule::DuplicateEntity {
                    category: entity.kind.category(),
                    name: entity.name.clone(),
                },
            ));
        }
    }

    for entity in &namespace.entities {
        validate_entity(index, namespace, entity)?;
    }

    trace!(namespace = %namespace.name, entities = namespace.entities.len(), "namespace validated");
    Ok(())
}

fn validate_entity(index: &ModelIndex<'_>, namespace: &Namespace, entity: &Entity) -> Result<(), CompileFault> {
    if let Some((base, kind)) = entity.kind.extension_base() {
        index
            .resolve(&namespace.name, base, kind)
            .map_err(|rule| CompileFault::invalid(entity_location(namespace, entity), rule))?;
    }

    for property in &entity.properties {
        let location = || property_location(namespace, entity, property);

        if property.is_identity {
            if entity.kind.extension_base().is_some() {
                return Err(CompileFault::invalid(location(), ModelRule::ExtensionIdentity));
            }
            if property.cardinality.is_collection() {
                return Err(CompileFault::invalid(location(), ModelRule::CollectionIdentity));
            }
            if property.cardinality.is_optional() {
                return Err(CompileFault::invalid(location(), ModelRule::OptionalIdentity));
            }
            if let Some(kind @ (ReferenceKind::Common | ReferenceKind::Choice)) = property.reference_kind() {
                return Err(CompileFault::invalid(
                    location(),
                    ModelRule::GroupingIdentity { kind: kind.label() },
                ));
            }
        }

        if let (Some(kind), Some(target)) = (property.reference_kind(), property.referenced()) {
            index
                .resolve(&namespace.name, target, kind)
                .map_err(|rule| CompileFault::invalid(location(), rule))?;
        }
    }

    Ok(())
}

pub fn entity_location(namespace: &Namespace, entity: &Entity) -> String {
    format!("{}.{}", namespace.name, entity.name)
}

pub fn property_location(namespace: &Namespace, entity: &Entity, property: &Property) -> String {
    format!("{}.{}.{}", namespace.name, entity.name, property.full_name())
}
