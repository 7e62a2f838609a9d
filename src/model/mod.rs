//! Entity/property model: namespaces, entities and their properties.
//!
//! This is the semantic graph the relational passes consume. It is built
//! once from a [`ModelDocument`] and never mutated afterwards.

mod document;
mod entity;
mod index;
mod namespace;
mod property;
mod validate;

pub use document::{ModelDocument, ModelError};
pub use entity::{Entity, EntityKind, EntityRef};
pub use index::{ModelIndex, Resolved};
pub use namespace::{Namespace, NamespaceGraph, resolve_build_order};
pub use property::{Cardinality, Property, PropertyKind, ReferenceKind, SimpleType};
pub use validate::{entity_location, property_location, validate_namespace};
