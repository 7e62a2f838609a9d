//! relschema library - Relational schema compiler
//!
//! Compiles a validated entity/property data model into relational tables,
//! columns, primary keys and foreign keys, and renders them as PostgreSQL or
//! SQL Server DDL.

pub mod cli;
pub mod commands;
pub mod config;
pub mod fault;
pub mod model;
pub mod output;
pub mod relational;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod fixtures;
