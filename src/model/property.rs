//! Property definitions for the entity/property model.
//!
//! A property is either a simple scalar (integer, string, decimal, ...) or a
//! reference to another entity (common, choice, domain entity, descriptor,
//! ...). Declaration order is significant: it drives key and column order.

use serde::{Deserialize, Serialize};

use super::entity::EntityRef;

/// How many values a property holds and whether it must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    Required,
    Optional,
    RequiredCollection,
    OptionalCollection,
}

impl Cardinality {
    pub fn is_collection(&self) -> bool {
        matches!(self, Cardinality::RequiredCollection | Cardinality::OptionalCollection)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Cardinality::Optional | Cardinality::OptionalCollection)
    }
}

/// Scalar types a property (or a shared simple type restriction) can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimpleType {
    Integer,
    Short,
    Decimal { precision: u8, scale: u8 },
    String { max_length: u32 },
    Boolean,
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
    Currency,
    Percent,
    Duration,
    Year,
}

/// The kinds of entity a reference property may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    SharedSimple,
    Common,
    InlineCommon,
    Choice,
    DomainEntity,
    Association,
    Enumeration,
    Descriptor,
}

impl ReferenceKind {
    /// Groupings are the structural kinds whose properties are walked into
    /// the referencing table (or a child table of it).
    pub fn is_grouping(&self) -> bool {
        matches!(
            self,
            ReferenceKind::Common | ReferenceKind::InlineCommon | ReferenceKind::Choice
        )
    }

    /// References to top-level entities whose primary key is copied.
    pub fn is_entity(&self) -> bool {
        matches!(self, ReferenceKind::DomainEntity | ReferenceKind::Association)
    }

    /// References backed by a type table.
    pub fn is_type_reference(&self) -> bool {
        matches!(self, ReferenceKind::Enumeration | ReferenceKind::Descriptor)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::SharedSimple => "shared simple type",
            ReferenceKind::Common => "common",
            ReferenceKind::InlineCommon => "inline common",
            ReferenceKind::Choice => "choice",
            ReferenceKind::DomainEntity => "domain entity",
            ReferenceKind::Association => "association",
            ReferenceKind::Enumeration => "enumeration",
            ReferenceKind::Descriptor => "descriptor",
        }
    }
}

/// What a property holds: a scalar value or a reference to another entity.
///
/// Deserializes from the flat `"type": ...` form used by the model document;
/// scalar type names are tried first, then reference kinds with their
/// `reference` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyKind {
    Simple(SimpleType),
    Reference {
        #[serde(rename = "type")]
        kind: ReferenceKind,
        reference: EntityRef,
    },
}

/// A single property declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_name: Option<String>,
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

impl Property {
    pub fn simple(name: &str, simple_type: SimpleType, cardinality: Cardinality) -> Self {
        Self {
            name: name.to_string(),
            kind: PropertyKind::Simple(simple_type),
            cardinality,
            context_name: None,
            is_identity: false,
            documentation: String::new(),
        }
    }

    /// A reference property named after the entity it points at.
    pub fn reference(kind: ReferenceKind, target: EntityRef, cardinality: Cardinality) -> Self {
        Self {
            name: target.name.clone(),
            kind: PropertyKind::Reference {
                kind,
                reference: target,
            },
            cardinality,
            context_name: None,
            is_identity: false,
            documentation: String::new(),
        }
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn with_context(mut self, context_name: &str) -> Self {
        self.context_name = Some(context_name.to_string());
        self
    }

    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.to_string();
        self
    }

    /// Role name, or the empty string when none was declared.
    pub fn context(&self) -> &str {
        self.context_name.as_deref().unwrap_or("")
    }

    /// Role name followed by the property name: the segment this property
    /// contributes to table and column names.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.context(), self.name)
    }

    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        match &self.kind {
            PropertyKind::Reference { kind, .. } => Some(*kind),
            PropertyKind::Simple(_) => None,
        }
    }

    pub fn referenced(&self) -> Option<&EntityRef> {
        match &self.kind {
            PropertyKind::Reference { reference, .. } => Some(reference),
            PropertyKind::Simple(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Cardinality::Required, false, false)]
    #[case(Cardinality::Optional, false, true)]
    #[case(Cardinality::RequiredCollection, true, false)]
    #[case(Cardinality::OptionalCollection, true, true)]
    fn test_cardinality_flags(
        #[case] cardinality: Cardinality,
        #[case] collection: bool,
        #[case] optional: bool,
    ) {
        assert_eq!(cardinality.is_collection(), collection);
        assert_eq!(cardinality.is_optional(), optional);
    }

    #[test]
    fn test_deserialize_simple_property() {
        let json = r#"{"name": "Amount", "type": "decimal", "precision": 9, "scale": 2, "cardinality": "optional"}"#;
        let property: Property = serde_json::from_str(json).unwrap();

        assert_eq!(property.name, "Amount");
        assert_eq!(
            property.kind,
            PropertyKind::Simple(SimpleType::Decimal {
                precision: 9,
                scale: 2
            })
        );
        assert_eq!(property.cardinality, Cardinality::Optional);
        assert!(!property.is_identity);
    }

    #[test]
    fn test_deserialize_reference_property() {
        let json = r#"{
            "name": "Address",
            "type": "common",
            "reference": "EdFi.Address",
            "cardinality": "required_collection",
            "context_name": "Mailing"
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();

        assert_eq!(property.reference_kind(), Some(ReferenceKind::Common));
        let target = property.referenced().unwrap();
        assert_eq!(target.namespace.as_deref(), Some("EdFi"));
        assert_eq!(target.name, "Address");
        assert_eq!(property.full_name(), "MailingAddress");
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"name": "SchoolId", "type": "integer", "is_identity": true}"#;
        let property: Property = serde_json::from_str(json).unwrap();

        assert_eq!(property.cardinality, Cardinality::Required);
        assert!(property.is_identity);
        assert_eq!(property.context(), "");
    }

    #[test]
    fn test_builder_helpers() {
        let property = Property::reference(
            ReferenceKind::DomainEntity,
            EntityRef::local("School"),
            Cardinality::Required,
        )
        .identity()
        .with_context("Feeder");

        assert_eq!(property.name, "School");
        assert_eq!(property.full_name(), "FeederSchool");
        assert!(property.is_identity);
    }

    #[rstest]
    #[case(ReferenceKind::Common, true, false, false)]
    #[case(ReferenceKind::Choice, true, false, false)]
    #[case(ReferenceKind::Association, false, true, false)]
    #[case(ReferenceKind::Descriptor, false, false, true)]
    #[case(ReferenceKind::SharedSimple, false, false, false)]
    fn test_reference_kind_classes(
        #[case] kind: ReferenceKind,
        #[case] grouping: bool,
        #[case] entity: bool,
        #[case] type_reference: bool,
    ) {
        assert_eq!(kind.is_grouping(), grouping);
        assert_eq!(kind.is_entity(), entity);
        assert_eq!(kind.is_type_reference(), type_reference);
    }
}
