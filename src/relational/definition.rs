//! Core table model types.
//!
//! Provides a dialect-agnostic description of the derived relational schema.
//! These types are the hand-off between the pipeline and the DDL compilers:
//! they are created fresh for every compilation and never mutated once the
//! owning namespace has been published.

use serde::Serialize;
use tracing::debug;

/// Whether generated timestamps are stored in local time or UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampForm {
    Local,
    Utc,
}

/// Represents a column data type.
///
/// Maps to the dialect type systems via the compilers' `column_type()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    SmallInt,
    Decimal { precision: u8, scale: u8 },
    String { max_length: u32 },
    Boolean,
    Date,
    Time,
    DateTime,
    Money,
    Uuid,
    Timestamp { form: TimestampForm },
}

impl ColumnType {
    pub fn length(&self) -> Option<u32> {
        match self {
            ColumnType::String { max_length } => Some(*max_length),
            _ => None,
        }
    }

    pub fn precision(&self) -> Option<u8> {
        match self {
            ColumnType::Decimal { precision, .. } => Some(*precision),
            _ => None,
        }
    }

    pub fn scale(&self) -> Option<u8> {
        match self {
            ColumnType::Decimal { scale, .. } => Some(*scale),
            _ => None,
        }
    }
}

/// Default constraint on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    NewUuid,
    CurrentTimestamp(TimestampForm),
    EmptyString,
}

/// Represents a single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Dialect-safe column name
    pub name: String,
    pub data_type: ColumnType,
    pub is_nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_nullable,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

/// Represents a foreign key from `parent_table` to `foreign_table`.
///
/// `parent_columns` and `foreign_columns` always have the same length and are
/// matched positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Dialect-safe constraint name
    pub name: String,
    pub parent_table: String,
    pub parent_columns: Vec<String>,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    pub cascades_on_delete: bool,
}

/// What produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Domain entity or association
    Entity,
    /// Grouping, collection or reference-collection table under a parent
    Child,
    /// Side table holding extension columns for a base table
    Extension,
    /// Enumeration or descriptor backing table
    Type,
}

/// Represents a complete table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Schema name (= namespace name)
    pub schema: String,
    /// Dialect-safe table name
    pub name: String,
    /// Untruncated table name
    pub full_name: String,
    /// Naming chain the full name was built from
    pub name_segments: Vec<String>,
    pub kind: TableKind,
    /// Qualified name of the producing entity or property
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<Column>,
    pub primary_key_name: String,
    pub primary_key_columns: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub is_type_table: bool,
    pub includes_resource_columns: bool,
    /// Qualified name of the common this table implements, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implements: Option<String>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Primary key columns in key order.
    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.primary_key_columns
            .iter()
            .filter_map(|name| self.column(name))
    }

    /// Add a column, merging with an existing column of the same name.
    ///
    /// A merged column keeps its original position; it is nullable only when
    /// both contributions are.
    pub fn add_column(&mut self, column: Column) {
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == column.name) {
            if existing.is_nullable != column.is_nullable || existing.data_type != column.data_type {
                debug!(
                    table = %self.full_name,
                    column = %column.name,
                    "merging duplicate column"
                );
            }
            existing.is_nullable = existing.is_nullable && column.is_nullable;
            if existing.description.is_none() {
                existing.description = column.description;
            }
            return;
        }
        self.columns.push(column);
    }

    /// Add a column that is part of the primary key.
    pub fn add_key_column(&mut self, mut column: Column) {
        column.is_nullable = false;
        let name = column.name.clone();
        self.add_column(column);
        if !self.primary_key_columns.contains(&name) {
            self.primary_key_columns.push(name);
        }
    }
}

/// Tables of one namespace, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceSchema {
    pub schema: String,
    pub is_extension: bool,
    pub tables: Vec<Table>,
}

impl NamespaceSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// The compiled relational schema, namespaces in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationalModel {
    pub schemas: Vec<NamespaceSchema>,
}

impl RelationalModel {
    pub fn schema(&self, name: &str) -> Option<&NamespaceSchema> {
        self.schemas.iter().find(|s| s.schema == name)
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schema(schema)?.table(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.schemas.iter().flat_map(|s| s.tables.iter())
    }

    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }
}
