//! Column typing and the standard resource columns.

use super::definition::{Column, ColumnType, DefaultValue, TableKind, TimestampForm};
use crate::model::SimpleType;

pub const ID: &str = "Id";
pub const LAST_MODIFIED_DATE: &str = "LastModifiedDate";
pub const CREATE_DATE: &str = "CreateDate";
pub const CODE_VALUE: &str = "CodeValue";
pub const SHORT_DESCRIPTION: &str = "ShortDescription";
pub const DESCRIPTION: &str = "Description";

/// Map a scalar property type to its column type.
pub fn map_simple_type(simple: SimpleType) -> ColumnType {
    match simple {
        SimpleType::Integer => ColumnType::Integer,
        SimpleType::Short => ColumnType::SmallInt,
        SimpleType::Decimal { precision, scale } => ColumnType::Decimal { precision, scale },
        SimpleType::String { max_length } => ColumnType::String { max_length },
        SimpleType::Boolean => ColumnType::Boolean,
        SimpleType::Date => ColumnType::Date,
        SimpleType::Time => ColumnType::Time,
        SimpleType::DateTime => ColumnType::DateTime,
        SimpleType::Currency => ColumnType::Money,
        SimpleType::Percent => ColumnType::Decimal {
            precision: 5,
            scale: 4,
        },
        SimpleType::Duration => ColumnType::String { max_length: 30 },
        SimpleType::Year => ColumnType::SmallInt,
    }
}

fn timestamp_column(name: &str, form: TimestampForm) -> Column {
    Column::new(name, ColumnType::Timestamp { form }, false).with_default(DefaultValue::CurrentTimestamp(form))
}

/// Resource columns appended to a table of the given kind.
///
/// Entity and type tables get the full set; child and extension tables only
/// record their creation date.
pub fn resource_columns(kind: TableKind, form: TimestampForm) -> Vec<Column> {
    match kind {
        TableKind::Entity | TableKind::Type => vec![
            timestamp_column(CREATE_DATE, form),
            timestamp_column(LAST_MODIFIED_DATE, form),
            Column::new(ID, ColumnType::Uuid, false).with_default(DefaultValue::NewUuid),
        ],
        TableKind::Child | TableKind::Extension => vec![timestamp_column(CREATE_DATE, form)],
    }
}

/// Descriptive columns every type table carries after its surrogate key.
pub fn type_table_columns() -> Vec<Column> {
    vec![
        Column::new(CODE_VALUE, ColumnType::String { max_length: 50 }, false)
            .with_default(DefaultValue::EmptyString),
        Column::new(SHORT_DESCRIPTION, ColumnType::String { max_length: 75 }, false),
        Column::new(DESCRIPTION, ColumnType::String { max_length: 1024 }, false),
    ]
}
