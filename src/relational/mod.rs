//! Relational schema derivation.
//!
//! Turns a validated entity/property model into tables, columns, primary
//! keys and foreign keys, with dialect-safe identifiers. The passes run per
//! namespace in build order: naming, keys, then columns, all driven by the
//! table builder. Compilers render the finished model as DDL.

pub mod builder;
pub mod columns;
pub mod compilers;
pub mod definition;
pub mod identifier;
pub mod keys;
pub mod naming;
pub mod pipeline;

pub use builder::{BuildOptions, TableBuilder};
pub use compilers::{DdlCompiler, PostgresCompiler, SqlServerCompiler};
pub use definition::{
    Column, ColumnType, DefaultValue, ForeignKey, NamespaceSchema, RelationalModel, Table, TableKind, TimestampForm,
};
pub use identifier::enforce;
pub use pipeline::compile;
