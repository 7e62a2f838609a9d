//! Table derivation.
//!
//! Walks each entity's properties in declaration order and decides, per
//! property, whether it becomes a column of the current table, a set of
//! folded columns, or a child table hanging off the current table:
//!
//! - scalars and singular references become columns;
//! - required inline commons and required choices are folded in place;
//! - commons, collections, optional choices and collection inline commons
//!   become child tables keyed by their own identity then the parent key.
//!
//! Extension entities are walked the same way, against the base entity's
//! table, with every new table placed in the extending namespace's schema.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::columns::{resource_columns, type_table_columns};
use super::definition::{Column, ColumnType, ForeignKey, NamespaceSchema, Table, TableKind, TimestampForm};
use super::identifier::{enforce, enforce_name};
use super::keys::{KeyColumn, KeyResolver, MAX_NESTING_DEPTH, type_reference_column};
use super::naming::{NameChain, role_prefixed};
use crate::fault::{CompileFault, ModelRule};
use crate::model::{
    EntityKind, EntityRef, ModelIndex, Namespace, Property, ReferenceKind, Resolved, entity_location,
    property_location,
};

/// Settings applied uniformly to one compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub identifier_limit: usize,
    pub timestamp_form: TimestampForm,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            identifier_limit: 63,
            timestamp_form: TimestampForm::Local,
        }
    }
}

/// A table that foreign keys point at, with its key columns.
#[derive(Debug, Clone)]
struct TableRef {
    schema: String,
    name: String,
    full_name: String,
    key: Vec<KeyColumn>,
}

impl TableRef {
    fn of(table: &Table) -> Self {
        Self {
            schema: table.schema.clone(),
            name: table.name.clone(),
            full_name: table.full_name.clone(),
            key: table
                .primary_key()
                .map(|c| KeyColumn {
                    name: c.name.clone(),
                    data_type: c.data_type,
                })
                .collect(),
        }
    }
}

/// Where the walk currently is.
#[derive(Debug, Clone)]
struct Scope {
    /// Schema new child tables go into
    schema: String,
    /// Naming chain for child tables
    chain: NameChain,
    /// Table child tables are keyed by and cascade from
    parent: TableRef,
    /// Column prefix accumulated from folded groupings
    prefix: String,
    /// Set under an optional folded grouping; never cleared on descent
    nullable: bool,
    groupings: Vec<String>,
    depth: usize,
}

impl Scope {
    fn new(schema: &str, chain: NameChain, parent: TableRef, origin: String) -> Self {
        Self {
            schema: schema.to_string(),
            chain,
            parent,
            prefix: String::new(),
            nullable: false,
            groupings: vec![origin],
            depth: 0,
        }
    }

    fn folded(&self, context: &str, optional: bool, grouping: String) -> Self {
        let mut scope = self.clone();
        scope.prefix = format!("{}{}", self.prefix, context);
        scope.nullable = self.nullable || optional;
        scope.groupings.push(grouping);
        scope.depth += 1;
        scope
    }

    fn child(&self, chain: NameChain, parent: TableRef, grouping: Option<String>) -> Self {
        let mut groupings = self.groupings.clone();
        groupings.extend(grouping);
        Self {
            schema: self.schema.clone(),
            chain,
            parent,
            prefix: String::new(),
            nullable: false,
            groupings,
            depth: self.depth + 1,
        }
    }

    /// Role segment for a property walked in this scope.
    fn role(&self, property: &Property) -> String {
        role_prefixed(&self.prefix, property.context())
    }
}

pub struct TableBuilder<'i, 'a> {
    keys: KeyResolver<'i, 'a>,
    options: BuildOptions,
}

impl<'i, 'a> TableBuilder<'i, 'a> {
    pub fn new(index: &'i ModelIndex<'a>, options: BuildOptions) -> Self {
        Self {
            keys: KeyResolver::new(index),
            options,
        }
    }

    /// Build every table a namespace owns.
    ///
    /// `published` holds the finished schemas of namespaces built earlier;
    /// they are only read, to find tables a common extension applies to.
    pub fn build_namespace(
        &mut self,
        namespace: &'a Namespace,
        published: &[NamespaceSchema],
    ) -> Result<NamespaceSchema, CompileFault> {
        let mut tables = Vec::new();

        for entity in namespace.entities.iter().filter(|e| e.kind.is_type()) {
            tables.extend(self.type_tables(Resolved { namespace, entity })?);
        }

        for entity in namespace.entities.iter().filter(|e| e.kind.is_top_level()) {
            tables.extend(self.entity_tables(Resolved { namespace, entity })?);
        }

        for entity in &namespace.entities {
            let owner = Resolved { namespace, entity };
            match &entity.kind {
                EntityKind::DomainEntityExtension { base } => {
                    tables.extend(self.entity_extension_tables(owner, base, ReferenceKind::DomainEntity)?);
                }
                EntityKind::AssociationExtension { base } => {
                    tables.extend(self.entity_extension_tables(owner, base, ReferenceKind::Association)?);
                }
                _ => {}
            }
        }

        for entity in &namespace.entities {
            if let EntityKind::CommonExtension { base } = &entity.kind {
                let extension = self.common_extension_tables(Resolved { namespace, entity }, base, published, &tables)?;
                tables.extend(extension);
            }
        }

        check_collisions(&namespace.name, &tables)?;
        debug!(namespace = %namespace.name, tables = tables.len(), "namespace tables built");

        Ok(NamespaceSchema {
            schema: namespace.name.clone(),
            is_extension: namespace.is_extension,
            tables,
        })
    }

    fn guard(&self, name: &str) -> String {
        enforce_name(name, self.options.identifier_limit)
    }

    fn key_column(&self, key: &KeyColumn) -> Column {
        Column::new(self.guard(&key.name), key.data_type, false)
    }

    fn new_table(&self, schema: &str, chain: &NameChain, kind: TableKind, source: String) -> Table {
        let limit = self.options.identifier_limit;
        let full_name = chain.full_name();
        trace!(schema, table = %full_name, ?kind, "creating table");
        Table {
            schema: schema.to_string(),
            name: enforce(chain.segments(), limit),
            primary_key_name: enforce(&["PK_", full_name.as_str()], limit),
            full_name,
            name_segments: chain.segments().to_vec(),
            kind,
            source,
            description: None,
            columns: Vec::new(),
            primary_key_columns: Vec::new(),
            foreign_keys: Vec::new(),
            is_type_table: kind == TableKind::Type,
            includes_resource_columns: matches!(kind, TableKind::Entity | TableKind::Type),
            implements: None,
        }
    }

    fn finish(&self, table: &mut Table) {
        for column in resource_columns(table.kind, self.options.timestamp_form) {
            table.add_column(column);
        }
    }

    fn add_foreign_key(
        &self,
        table: &mut Table,
        parent_columns: Vec<String>,
        foreign: &TableRef,
        role: &str,
        cascades_on_delete: bool,
    ) {
        let foreign_columns: Vec<String> = foreign.key.iter().map(|k| self.guard(&k.name)).collect();

        let duplicate = table.foreign_keys.iter().any(|fk| {
            fk.foreign_schema == foreign.schema
                && fk.foreign_table == foreign.name
                && fk.parent_columns == parent_columns
        });
        if duplicate {
            return;
        }

        let base = format!("FK_{}_{}{}", table.full_name, foreign.full_name, role);
        let mut name = self.guard(&base);
        let mut ordinal = 2;
        while table.foreign_keys.iter().any(|fk| fk.name == name) {
            name = self.guard(&format!("{}_{}", base, ordinal));
            ordinal += 1;
        }

        table.foreign_keys.push(ForeignKey {
            name,
            parent_table: table.name.clone(),
            parent_columns,
            foreign_schema: foreign.schema.clone(),
            foreign_table: foreign.name.clone(),
            foreign_columns,
            cascades_on_delete,
        });
    }

    fn entity_table_ref(&mut self, target: Resolved<'a>) -> Result<TableRef, CompileFault> {
        let key = self.keys.entity_key(target)?;
        Ok(TableRef {
            schema: target.namespace.name.clone(),
            name: self.guard(&target.entity.name),
            full_name: target.entity.name.clone(),
            key,
        })
    }

    fn type_table_ref(&self, target: Resolved<'a>) -> TableRef {
        let table = target
            .entity
            .type_table_name()
            .unwrap_or_else(|| target.entity.name.clone());
        TableRef {
            schema: target.namespace.name.clone(),
            name: self.guard(&table),
            key: vec![KeyColumn {
                name: format!("{}Id", table),
                data_type: ColumnType::Integer,
            }],
            full_name: table,
        }
    }

    fn entity_tables(&mut self, owner: Resolved<'a>) -> Result<Vec<Table>, CompileFault> {
        let schema = owner.namespace.name.as_str();
        let chain = NameChain::root(&owner.entity.name);
        let mut table = self.new_table(schema, &chain, TableKind::Entity, owner.qualified_name());
        table.description = non_empty(&owner.entity.documentation);

        for key in self.keys.entity_key(owner)? {
            table.add_key_column(self.key_column(&key));
        }

        let scope = Scope::new(schema, chain, TableRef::of(&table), owner.qualified_name());
        let mut children = Vec::new();
        self.walk(owner, &owner.entity.properties, &mut table, &scope, &mut children)?;
        self.finish(&mut table);

        let mut tables = vec![table];
        tables.extend(children);
        Ok(tables)
    }

    fn type_tables(&mut self, owner: Resolved<'a>) -> Result<Vec<Table>, CompileFault> {
        let schema = owner.namespace.name.as_str();
        let type_ref = self.type_table_ref(owner);
        let chain = NameChain::root(&type_ref.full_name);
        let mut table = self.new_table(schema, &chain, TableKind::Type, owner.qualified_name());
        table.description = non_empty(&owner.entity.documentation);

        for key in &type_ref.key {
            table.add_key_column(self.key_column(key));
        }
        for column in type_table_columns() {
            table.add_column(column);
        }

        let mut children = Vec::new();
        if owner.entity.kind == EntityKind::Descriptor {
            let scope = Scope::new(schema, chain, TableRef::of(&table), owner.qualified_name());
            let extra = owner.entity.properties.iter().filter(|p| !p.is_identity);
            self.walk(owner, extra, &mut table, &scope, &mut children)?;
        }
        self.finish(&mut table);

        let mut tables = vec![table];
        tables.extend(children);
        Ok(tables)
    }

    fn entity_extension_tables(
        &mut self,
        owner: Resolved<'a>,
        base: &EntityRef,
        kind: ReferenceKind,
    ) -> Result<Vec<Table>, CompileFault> {
        let base = self
            .keys
            .index()
            .resolve(&owner.namespace.name, base, kind)
            .map_err(|rule| CompileFault::invalid(entity_location(owner.namespace, owner.entity), rule))?;
        let base_table = self.entity_table_ref(base)?;
        self.extension_tables(owner, NameChain::root(&base.entity.name), base_table)
    }

    fn common_extension_tables(
        &mut self,
        owner: Resolved<'a>,
        base: &EntityRef,
        published: &[NamespaceSchema],
        own: &[Table],
    ) -> Result<Vec<Table>, CompileFault> {
        let index = self.keys.index();
        let base = index
            .resolve(&owner.namespace.name, base, ReferenceKind::Common)
            .map_err(|rule| CompileFault::invalid(entity_location(owner.namespace, owner.entity), rule))?;
        let common = base.qualified_name();

        let implementing: Vec<(NameChain, TableRef)> = published
            .iter()
            .filter(|s| index.graph().is_visible(&owner.namespace.name, &s.schema))
            .flat_map(|s| s.tables.iter())
            .chain(own.iter())
            .filter(|t| t.implements.as_deref() == Some(common.as_str()))
            .map(|t| (NameChain::from_segments(&t.name_segments), TableRef::of(t)))
            .collect();

        debug!(common = %common, tables = implementing.len(), "extending common implementations");

        let mut tables = Vec::new();
        for (chain, table) in implementing {
            tables.extend(self.extension_tables(owner, chain, table)?);
        }
        Ok(tables)
    }

    // Side table `{chain}Extension` for folded columns; collections and
    // groupings become child tables under the base table.
    fn extension_tables(
        &mut self,
        owner: Resolved<'a>,
        chain: NameChain,
        base_table: TableRef,
    ) -> Result<Vec<Table>, CompileFault> {
        let schema = owner.namespace.name.as_str();
        let mut side = self.new_table(
            schema,
            &chain.suffixed("Extension"),
            TableKind::Extension,
            owner.qualified_name(),
        );
        side.description = non_empty(&owner.entity.documentation);

        let mut parent_columns = Vec::new();
        for key in &base_table.key {
            let column = self.key_column(key);
            parent_columns.push(column.name.clone());
            side.add_key_column(column);
        }
        self.add_foreign_key(&mut side, parent_columns, &base_table, "", true);

        let scope = Scope::new(schema, chain, base_table, owner.qualified_name());
        let mut children = Vec::new();
        self.walk(owner, &owner.entity.properties, &mut side, &scope, &mut children)?;

        let mut tables = Vec::new();
        if side.columns.len() > side.primary_key_columns.len() {
            self.finish(&mut side);
            tables.push(side);
        }
        tables.extend(children);
        Ok(tables)
    }

    fn walk<'p>(
        &mut self,
        owner: Resolved<'a>,
        properties: impl IntoIterator<Item = &'p Property>,
        table: &mut Table,
        scope: &Scope,
        children: &mut Vec<Table>,
    ) -> Result<(), CompileFault> {
        for property in properties {
            self.walk_property(owner, property, table, scope, children)?;
        }
        Ok(())
    }

    fn walk_property(
        &mut self,
        owner: Resolved<'a>,
        property: &Property,
        table: &mut Table,
        scope: &Scope,
        children: &mut Vec<Table>,
    ) -> Result<(), CompileFault> {
        let nullable = scope.nullable || property.cardinality.is_optional();
        let collection = property.cardinality.is_collection();
        let documentation = property.documentation.as_str();

        if let Some(data_type) = self.keys.scalar_type(owner, property)? {
            // Collection value columns drop the folded prefix; it is already
            // part of the collection table's name.
            if collection {
                let value = Column::new(self.guard(&property.full_name()), data_type, false)
                    .with_description(documentation);
                return self.collection_table(owner, property, vec![value], None, scope, children);
            }
            let name = self.guard(&format!("{}{}", scope.prefix, property.full_name()));
            table.add_column(Column::new(name, data_type, nullable).with_description(documentation));
            return Ok(());
        }

        let Some(kind) = property.reference_kind() else {
            return Ok(());
        };
        let target = self.keys.resolve(owner, property)?;

        match kind {
            ReferenceKind::DomainEntity | ReferenceKind::Association => {
                let foreign = self.entity_table_ref(target)?;
                if collection {
                    let values = foreign
                        .key
                        .iter()
                        .map(|k| Column::new(self.guard(&format!("{}{}", property.context(), k.name)), k.data_type, false))
                        .collect();
                    return self.collection_table(owner, property, values, Some(foreign), scope, children);
                }
                let role = scope.role(property);
                let mut parent_columns = Vec::new();
                for key in &foreign.key {
                    let column = Column::new(self.guard(&format!("{}{}", role, key.name)), key.data_type, nullable)
                        .with_description(documentation);
                    parent_columns.push(column.name.clone());
                    table.add_column(column);
                }
                self.add_foreign_key(table, parent_columns, &foreign, property.context(), false);
                Ok(())
            }
            ReferenceKind::Descriptor | ReferenceKind::Enumeration => {
                let foreign = self.type_table_ref(target);
                if collection {
                    let value = Column::new(
                        self.guard(&type_reference_column(property.context(), target)),
                        ColumnType::Integer,
                        false,
                    );
                    return self.collection_table(owner, property, vec![value], Some(foreign), scope, children);
                }
                let column = Column::new(
                    self.guard(&type_reference_column(&scope.role(property), target)),
                    ColumnType::Integer,
                    nullable,
                )
                .with_description(documentation);
                let parent_columns = vec![column.name.clone()];
                table.add_column(column);
                self.add_foreign_key(table, parent_columns, &foreign, property.context(), false);
                Ok(())
            }
            ReferenceKind::InlineCommon if !collection => {
                let optional = property.cardinality.is_optional();
                self.fold(owner, property, target, optional, table, scope, children)
            }
            ReferenceKind::Choice if !collection && !property.cardinality.is_optional() => {
                self.fold(owner, property, target, true, table, scope, children)
            }
            ReferenceKind::Common | ReferenceKind::InlineCommon | ReferenceKind::Choice => {
                self.grouping_table(owner, property, target, scope, children)
            }
            ReferenceKind::SharedSimple => Ok(()),
        }
    }

    fn check_nesting(
        &self,
        owner: Resolved<'a>,
        property: &Property,
        grouping: &str,
        scope: &Scope,
    ) -> Result<(), CompileFault> {
        let location = || property_location(owner.namespace, owner.entity, property);
        if scope.groupings.iter().any(|g| g == grouping) {
            return Err(CompileFault::invalid(
                location(),
                ModelRule::RecursiveGrouping {
                    grouping: grouping.to_string(),
                },
            ));
        }
        if scope.depth + 1 > MAX_NESTING_DEPTH {
            return Err(CompileFault::invalid(
                location(),
                ModelRule::NestingTooDeep {
                    max: MAX_NESTING_DEPTH,
                },
            ));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn fold(
        &mut self,
        owner: Resolved<'a>,
        property: &Property,
        target: Resolved<'a>,
        optional: bool,
        table: &mut Table,
        scope: &Scope,
        children: &mut Vec<Table>,
    ) -> Result<(), CompileFault> {
        let grouping = target.qualified_name();
        self.check_nesting(owner, property, &grouping, scope)?;
        let inner = scope.folded(property.context(), optional, grouping);
        self.walk(target, &target.entity.properties, table, &inner, children)
    }

    fn grouping_table(
        &mut self,
        owner: Resolved<'a>,
        property: &Property,
        target: Resolved<'a>,
        scope: &Scope,
        children: &mut Vec<Table>,
    ) -> Result<(), CompileFault> {
        let grouping = target.qualified_name();
        self.check_nesting(owner, property, &grouping, scope)?;

        let chain = scope.chain.push(&scope.role(property), &property.name);
        let mut table = self.new_table(
            &scope.schema,
            &chain,
            TableKind::Child,
            property_location(owner.namespace, owner.entity, property),
        );
        table.description = non_empty(&property.documentation).or_else(|| non_empty(&target.entity.documentation));
        if target.entity.kind == EntityKind::Common {
            table.implements = Some(grouping.clone());
        }

        for key in self.keys.identity_columns(target, "")? {
            table.add_key_column(self.key_column(&key));
        }
        let mut parent_columns = Vec::new();
        for key in &scope.parent.key {
            let column = self.key_column(key);
            parent_columns.push(column.name.clone());
            table.add_key_column(column);
        }
        self.add_foreign_key(&mut table, parent_columns, &scope.parent, "", true);

        let inner = scope.child(chain, TableRef::of(&table), Some(grouping));
        let mut nested = Vec::new();
        self.walk(target, &target.entity.properties, &mut table, &inner, &mut nested)?;
        self.finish(&mut table);

        children.push(table);
        children.extend(nested);
        Ok(())
    }

    // Child table for a collection of scalars or references: parent key
    // followed by the value columns.
    fn collection_table(
        &mut self,
        owner: Resolved<'a>,
        property: &Property,
        values: Vec<Column>,
        foreign: Option<TableRef>,
        scope: &Scope,
        children: &mut Vec<Table>,
    ) -> Result<(), CompileFault> {
        if scope.depth + 1 > MAX_NESTING_DEPTH {
            return Err(CompileFault::invalid(
                property_location(owner.namespace, owner.entity, property),
                ModelRule::NestingTooDeep {
                    max: MAX_NESTING_DEPTH,
                },
            ));
        }

        let chain = scope.chain.push(&scope.role(property), &property.name);
        let mut table = self.new_table(
            &scope.schema,
            &chain,
            TableKind::Child,
            property_location(owner.namespace, owner.entity, property),
        );
        table.description = non_empty(&property.documentation);

        let mut parent_columns = Vec::new();
        for key in &scope.parent.key {
            let column = self.key_column(key);
            parent_columns.push(column.name.clone());
            table.add_key_column(column);
        }
        self.add_foreign_key(&mut table, parent_columns, &scope.parent, "", true);

        let value_columns: Vec<String> = values.iter().map(|c| c.name.clone()).collect();
        for value in values {
            table.add_key_column(value);
        }
        if let Some(foreign) = foreign {
            self.add_foreign_key(&mut table, value_columns, &foreign, property.context(), false);
        }

        self.finish(&mut table);
        children.push(table);
        Ok(())
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Two sources producing one table name in a schema is a fault, never a
/// silent rename. Names are compared before truncation.
fn check_collisions(schema: &str, tables: &[Table]) -> Result<(), CompileFault> {
    let mut seen: BTreeMap<&str, &Table> = BTreeMap::new();
    for table in tables {
        if let Some(first) = seen.insert(table.full_name.as_str(), table) {
            return Err(CompileFault::TableNameCollision {
                schema: schema.to_string(),
                name: table.full_name.clone(),
                first: first.source.clone(),
                second: table.source.clone(),
            });
        }
    }
    Ok(())
}
