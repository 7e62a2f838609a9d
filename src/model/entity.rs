//! Entity definitions for the entity/property model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::property::{Property, ReferenceKind, SimpleType};

/// A reference to an entity, optionally qualified by namespace.
///
/// Written as `"Name"` or `"Namespace.Name"` in the model document. An
/// unqualified reference resolves against the referencing namespace first,
/// then against its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityRef {
    pub namespace: Option<String>,
    pub name: String,
}

impl EntityRef {
    pub fn local(name: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}.{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for EntityRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('.') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() && !name.contains('.') => {
                Ok(EntityRef::qualified(namespace, name))
            }
            None if !s.is_empty() => Ok(EntityRef::local(s)),
            _ => Err(format!("invalid entity reference '{}'", s)),
        }
    }
}

impl TryFrom<String> for EntityRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityRef> for String {
    fn from(value: EntityRef) -> Self {
        value.to_string()
    }
}

/// The entity variants of the modeling language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    DomainEntity,
    Association,
    Common,
    InlineCommon,
    Choice,
    Enumeration {
        #[serde(default)]
        items: Vec<String>,
    },
    Descriptor,
    SharedSimpleType {
        restriction: SimpleType,
    },
    DomainEntityExtension {
        base: EntityRef,
    },
    AssociationExtension {
        base: EntityRef,
    },
    CommonExtension {
        base: EntityRef,
    },
}

impl EntityKind {
    /// Category used for the `(namespace, category, name)` uniqueness rule.
    pub fn category(&self) -> &'static str {
        match self {
            EntityKind::DomainEntity => "domain entity",
            EntityKind::Association => "association",
            EntityKind::Common => "common",
            EntityKind::InlineCommon => "inline common",
            EntityKind::Choice => "choice",
            EntityKind::Enumeration { .. } => "enumeration",
            EntityKind::Descriptor => "descriptor",
            EntityKind::SharedSimpleType { .. } => "shared simple type",
            EntityKind::DomainEntityExtension { .. } => "domain entity extension",
            EntityKind::AssociationExtension { .. } => "association extension",
            EntityKind::CommonExtension { .. } => "common extension",
        }
    }

    /// Whether a reference of the given kind may point at this entity.
    pub fn answers_to(&self, kind: ReferenceKind) -> bool {
        matches!(
            (self, kind),
            (EntityKind::DomainEntity, ReferenceKind::DomainEntity)
                | (EntityKind::Association, ReferenceKind::Association)
                | (EntityKind::Common, ReferenceKind::Common)
                | (EntityKind::InlineCommon, ReferenceKind::InlineCommon)
                | (EntityKind::Choice, ReferenceKind::Choice)
                | (EntityKind::Enumeration { .. }, ReferenceKind::Enumeration)
                | (EntityKind::Descriptor, ReferenceKind::Descriptor)
                | (EntityKind::SharedSimpleType { .. }, ReferenceKind::SharedSimple)
        )
    }

    /// Base entity and the reference kind it must answer to, for extensions.
    pub fn extension_base(&self) -> Option<(&EntityRef, ReferenceKind)> {
        match self {
            EntityKind::DomainEntityExtension { base } => Some((base, ReferenceKind::DomainEntity)),
            EntityKind::AssociationExtension { base } => Some((base, ReferenceKind::Association)),
            EntityKind::CommonExtension { base } => Some((base, ReferenceKind::Common)),
            _ => None,
        }
    }

    /// Domain entities and associations: entities that own a resource table.
    pub fn is_top_level(&self) -> bool {
        matches!(self, EntityKind::DomainEntity | EntityKind::Association)
    }

    pub fn is_type(&self) -> bool {
        matches!(self, EntityKind::Enumeration { .. } | EntityKind::Descriptor)
    }
}

/// A named entity and its ordered properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

impl Entity {
    pub fn new(name: &str, kind: EntityKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            properties: Vec::new(),
            documentation: String::new(),
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.to_string();
        self
    }

    pub fn identity_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_identity)
    }

    /// Name of the backing type table for enumerations and descriptors.
    pub fn type_table_name(&self) -> Option<String> {
        match self.kind {
            EntityKind::Descriptor => Some(format!("{}Descriptor", self.name)),
            EntityKind::Enumeration { .. } if self.name.ends_with("Type") => Some(self.name.clone()),
            EntityKind::Enumeration { .. } => Some(format!("{}Type", self.name)),
            _ => None,
        }
    }
}
