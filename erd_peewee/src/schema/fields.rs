//! Field mapper
//!
//! Maps abstract columns to PeeWee field classes.

use crate::error::{Error, Result};
use crate::models::types::Column;
use crate::schema::types::{ColumnType, FieldDescriptor};
use crate::utils::naming::python_bool;

/// PeeWee field class for a column type
pub fn field_class(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Varchar => "CharField",
        ColumnType::Boolean => "BooleanField",
        ColumnType::Integer => "IntegerField",
        ColumnType::Char => "FixedCharField",
        ColumnType::Blob => "BlobField",
        ColumnType::Text => "TextField",
        ColumnType::SmallInt => "SmallIntegerField",
        ColumnType::BigInt => "BigIntegerField",
        ColumnType::Decimal | ColumnType::Numeric => "DecimalField",
        ColumnType::Float => "FloatField",
        ColumnType::Double => "DoubleField",
        ColumnType::Bit => "BitField",
        ColumnType::Date => "DateField",
        ColumnType::Time => "TimeField",
        ColumnType::DateTime => "DateTimeField",
        ColumnType::Timestamp => "TimestampField",
    }
}

/// Map a column to its field descriptor
///
/// Arguments are appended in a fixed order: `null`, `unique`, `primary_key`,
/// `max_length`.
pub fn map_column(column: &Column) -> Result<FieldDescriptor> {
    let column_type: ColumnType = column.data_type.parse().map_err(|_| {
        Error::TypeMappingError(format!(
            "Unsupported column type `{}` for column {}",
            column.data_type, column.name
        ))
    })?;

    let mut field = FieldDescriptor::new(field_class(column_type));
    if column.nullable {
        field = field.arg("null", python_bool(true));
    }
    if column.unique {
        field = field.arg("unique", python_bool(true));
    }
    if column.primary_key {
        field = field.arg("primary_key", python_bool(true));
    }
    if column.length != 0 {
        field = field.arg("max_length", column.length.to_string());
    }

    Ok(field)
}
