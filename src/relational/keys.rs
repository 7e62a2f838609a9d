//! Primary key propagation.
//!
//! A top-level entity's key is its own scalar identity columns plus, for each
//! identity reference, the referenced entity's whole key, flattened and
//! prefixed with the reference's role name. Keys are memoized per entity; a
//! reference chain that comes back to an entity still being resolved is a
//! `CyclicIdentity` fault.

use std::collections::BTreeMap;

use super::columns::map_simple_type;
use super::definition::ColumnType;
use crate::fault::{CompileFault, ModelRule};
use crate::model::{EntityKind, ModelIndex, Property, PropertyKind, ReferenceKind, Resolved, property_location};

/// Maximum depth of nested groupings walked into one table.
pub const MAX_NESTING_DEPTH: usize = 32;

/// A key column before identifier guarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub data_type: ColumnType,
}

impl KeyColumn {
    fn new(name: String, data_type: ColumnType) -> Self {
        Self { name, data_type }
    }

    /// The same column as seen through a role-named reference.
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self::new(format!("{}{}", prefix, self.name), self.data_type)
    }
}

/// Name of the column referencing a type table: `{prefix}{TypeTable}Id`.
pub fn type_reference_column(prefix: &str, target: Resolved<'_>) -> String {
    let table = target
        .entity
        .type_table_name()
        .unwrap_or_else(|| target.entity.name.clone());
    format!("{}{}Id", prefix, table)
}

/// Merge `extra` into `columns`, keeping the first occurrence of each name.
pub fn merge_key_columns(columns: &mut Vec<KeyColumn>, extra: impl IntoIterator<Item = KeyColumn>) {
    for column in extra {
        if !columns.iter().any(|c| c.name == column.name) {
            columns.push(column);
        }
    }
}

pub struct KeyResolver<'i, 'a> {
    index: &'i ModelIndex<'a>,
    cache: BTreeMap<String, Vec<KeyColumn>>,
    visiting: Vec<String>,
}

impl<'i, 'a> KeyResolver<'i, 'a> {
    pub fn new(index: &'i ModelIndex<'a>) -> Self {
        Self {
            index,
            cache: BTreeMap::new(),
            visiting: Vec::new(),
        }
    }

    pub fn index(&self) -> &'i ModelIndex<'a> {
        self.index
    }

    /// Resolve a property's reference from the namespace that declares it.
    pub fn resolve(&self, owner: Resolved<'a>, property: &Property) -> Result<Resolved<'a>, CompileFault> {
        let (Some(kind), Some(target)) = (property.reference_kind(), property.referenced()) else {
            return Err(CompileFault::invalid(
                property_location(owner.namespace, owner.entity, property),
                ModelRule::UnresolvedReference {
                    kind: "entity",
                    target: property.name.clone(),
                },
            ));
        };
        self.index
            .resolve(&owner.namespace.name, target, kind)
            .map_err(|rule| CompileFault::invalid(property_location(owner.namespace, owner.entity, property), rule))
    }

    /// Column type of a scalar property, following shared simple types.
    pub fn scalar_type(&self, owner: Resolved<'a>, property: &Property) -> Result<Option<ColumnType>, CompileFault> {
        match &property.kind {
            PropertyKind::Simple(simple) => Ok(Some(map_simple_type(*simple))),
            PropertyKind::Reference {
                kind: ReferenceKind::SharedSimple,
                ..
            } => {
                let target = self.resolve(owner, property)?;
                match &target.entity.kind {
                    EntityKind::SharedSimpleType { restriction } => Ok(Some(map_simple_type(*restriction))),
                    _ => Ok(None),
                }
            }
            PropertyKind::Reference { .. } => Ok(None),
        }
    }

    /// Primary key of a domain entity or association.
    pub fn entity_key(&mut self, target: Resolved<'a>) -> Result<Vec<KeyColumn>, CompileFault> {
        let qualified = target.qualified_name();
        if let Some(cached) = self.cache.get(&qualified) {
            return Ok(cached.clone());
        }

        if let Some(start) = self.visiting.iter().position(|v| *v == qualified) {
            let mut path = self.visiting[start..].to_vec();
            path.push(qualified);
            return Err(CompileFault::CyclicIdentity { path });
        }

        self.visiting.push(qualified.clone());
        let columns = self.identity_columns(target, "");
        self.visiting.pop();
        let columns = columns?;

        if columns.is_empty() {
            return Err(CompileFault::invalid(
                qualified.clone(),
                ModelRule::MissingIdentity { target: qualified },
            ));
        }

        self.cache.insert(qualified, columns.clone());
        Ok(columns)
    }

    /// Identity columns an entity contributes, in declaration order.
    ///
    /// Used for top-level keys and for the own-identity part of grouping
    /// child tables.
    pub fn identity_columns(&mut self, owner: Resolved<'a>, prefix: &str) -> Result<Vec<KeyColumn>, CompileFault> {
        let mut columns = Vec::new();
        for property in owner.entity.identity_properties() {
            let contributed = self.property_key_columns(owner, property, prefix, 0)?;
            merge_key_columns(&mut columns, contributed);
        }
        Ok(columns)
    }

    fn property_key_columns(
        &mut self,
        owner: Resolved<'a>,
        property: &Property,
        prefix: &str,
        depth: usize,
    ) -> Result<Vec<KeyColumn>, CompileFault> {
        let location = || property_location(owner.namespace, owner.entity, property);

        if let Some(data_type) = self.scalar_type(owner, property)? {
            return Ok(vec![KeyColumn::new(
                format!("{}{}", prefix, property.full_name()),
                data_type,
            )]);
        }

        let role_prefix = format!("{}{}", prefix, property.context());
        match property.reference_kind() {
            Some(ReferenceKind::DomainEntity | ReferenceKind::Association) => {
                let target = self.resolve(owner, property)?;
                let key = self.entity_key(target)?;
                Ok(key.iter().map(|c| c.prefixed(&role_prefix)).collect())
            }
            Some(ReferenceKind::Descriptor | ReferenceKind::Enumeration) => {
                let target = self.resolve(owner, property)?;
                Ok(vec![KeyColumn::new(
                    type_reference_column(&role_prefix, target),
                    ColumnType::Integer,
                )])
            }
            Some(ReferenceKind::InlineCommon) => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(CompileFault::invalid(
                        location(),
                        ModelRule::NestingTooDeep {
                            max: MAX_NESTING_DEPTH,
                        },
                    ));
                }
                let target = self.resolve(owner, property)?;
                let mut columns = Vec::new();
                for inner in target
                    .entity
                    .properties
                    .iter()
                    .filter(|p| !p.cardinality.is_collection())
                    .filter(|p| !matches!(p.reference_kind(), Some(ReferenceKind::Common | ReferenceKind::Choice)))
                {
                    let contributed = self.property_key_columns(target, inner, &role_prefix, depth + 1)?;
                    merge_key_columns(&mut columns, contributed);
                }
                Ok(columns)
            }
            Some(kind @ (ReferenceKind::Common | ReferenceKind::Choice)) => Err(CompileFault::invalid(
                location(),
                ModelRule::GroupingIdentity { kind: kind.label() },
            )),
            Some(ReferenceKind::SharedSimple) | None => Err(CompileFault::invalid(
                location(),
                ModelRule::UnresolvedReference {
                    kind: "shared simple type",
                    target: property.name.clone(),
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Entity, EntityRef, ModelDocument, Namespace, SimpleType};

    fn integer_identity(name: &str) -> Property {
        Property::simple(name, SimpleType::Integer, Cardinality::Required).identity()
    }

    fn entity_ref(name: &str) -> Property {
        Property::reference(ReferenceKind::DomainEntity, EntityRef::local(name), Cardinality::Required).identity()
    }

    fn key_of(document: &ModelDocument, entity: &str) -> Result<Vec<KeyColumn>, CompileFault> {
        let index = ModelIndex::new(document).unwrap();
        let target = index
            .resolve("EdFi", &EntityRef::local(entity), ReferenceKind::DomainEntity)
            .unwrap();
        KeyResolver::new(&index).entity_key(target)
    }

    fn names(columns: &[KeyColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_scalar_identity() {
        let document = ModelDocument::new(vec![Namespace::core("EdFi").with_entity(
            Entity::new("School", EntityKind::DomainEntity)
                .with_property(integer_identity("SchoolId"))
                .with_property(Property::simple("Name", SimpleType::String { max_length: 60 }, Cardinality::Required)),
        )]);
        let key = key_of(&document, "School").unwrap();
        assert_eq!(key, vec![KeyColumn::new("SchoolId".to_string(), ColumnType::Integer)]);
    }

    #[test]
    fn test_reference_identity_is_flattened_and_role_prefixed() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(Entity::new("School", EntityKind::DomainEntity).with_property(integer_identity("SchoolId")))
                .with_entity(
                    Entity::new("Session", EntityKind::DomainEntity)
                        .with_property(entity_ref("School"))
                        .with_property(integer_identity("SessionCode")),
                )
                .with_entity(
                    Entity::new("Section", EntityKind::DomainEntity)
                        .with_property(entity_ref("Session"))
                        .with_property(entity_ref("School").with_context("Feeder"))
                        .with_property(
                            Property::reference(
                                ReferenceKind::Descriptor,
                                EntityRef::local("Term"),
                                Cardinality::Required,
                            )
                            .identity(),
                        ),
                )
                .with_entity(Entity::new("Term", EntityKind::Descriptor)),
        ]);

        let key = key_of(&document, "Section").unwrap();
        assert_eq!(
            names(&key),
            vec!["SchoolId", "SessionCode", "FeederSchoolId", "TermDescriptorId"]
        );
    }

    #[test]
    fn test_duplicate_key_columns_merge() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(Entity::new("School", EntityKind::DomainEntity).with_property(integer_identity("SchoolId")))
                .with_entity(
                    Entity::new("Session", EntityKind::DomainEntity)
                        .with_property(entity_ref("School"))
                        .with_property(integer_identity("SessionCode")),
                )
                .with_entity(
                    Entity::new("Enrollment", EntityKind::DomainEntity)
                        .with_property(entity_ref("School"))
                        .with_property(entity_ref("Session")),
                ),
        ]);

        let key = key_of(&document, "Enrollment").unwrap();
        assert_eq!(names(&key), vec!["SchoolId", "SessionCode"]);
    }

    #[test]
    fn test_cyclic_identity() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(Entity::new("A", EntityKind::DomainEntity).with_property(entity_ref("B")))
                .with_entity(Entity::new("B", EntityKind::DomainEntity).with_property(entity_ref("A"))),
        ]);

        let err = key_of(&document, "A").unwrap_err();
        assert_eq!(
            err,
            CompileFault::CyclicIdentity {
                path: vec!["EdFi.A".to_string(), "EdFi.B".to_string(), "EdFi.A".to_string()]
            }
        );
    }

    #[test]
    fn test_inline_common_identity_contributes_folded_columns() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(
                    Entity::new("Credential", EntityKind::DomainEntity)
                        .with_property(
                            Property::reference(
                                ReferenceKind::InlineCommon,
                                EntityRef::local("CredentialIdentity"),
                                Cardinality::Required,
                            )
                            .identity()
                            .with_context("Issued"),
                        ),
                )
                .with_entity(
                    Entity::new("CredentialIdentity", EntityKind::InlineCommon)
                        .with_property(Property::simple(
                            "CredentialNumber",
                            SimpleType::String { max_length: 60 },
                            Cardinality::Required,
                        ))
                        .with_property(Property::simple("StateCode", SimpleType::Short, Cardinality::Required))
                        .with_property(Property::simple(
                            "Notes",
                            SimpleType::String { max_length: 60 },
                            Cardinality::OptionalCollection,
                        )),
                ),
        ]);

        let key = key_of(&document, "Credential").unwrap();
        assert_eq!(names(&key), vec!["IssuedCredentialNumber", "IssuedStateCode"]);
        assert_eq!(key[1].data_type, ColumnType::SmallInt);
    }

    #[test]
    fn test_shared_simple_identity_uses_restriction() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi")
                .with_entity(Entity::new(
                    "Code",
                    EntityKind::SharedSimpleType {
                        restriction: SimpleType::String { max_length: 20 },
                    },
                ))
                .with_entity(
                    Entity::new("Program", EntityKind::DomainEntity).with_property(
                        Property::reference(ReferenceKind::SharedSimple, EntityRef::local("Code"), Cardinality::Required)
                            .identity(),
                    ),
                ),
        ]);

        let key = key_of(&document, "Program").unwrap();
        assert_eq!(key, vec![KeyColumn::new("Code".to_string(), ColumnType::String { max_length: 20 })]);
    }

    #[test]
    fn test_entity_without_identity() {
        let document = ModelDocument::new(vec![
            Namespace::core("EdFi").with_entity(Entity::new("Loose", EntityKind::DomainEntity)),
        ]);
        let err = key_of(&document, "Loose").unwrap_err();
        assert!(matches!(
            err,
            CompileFault::InvalidEntityModel {
                rule: ModelRule::MissingIdentity { .. },
                ..
            }
        ));
    }
}
