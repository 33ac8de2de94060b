use rusqlite::Statement;
use rusqlite::types::Value;

use crate::binder::ParameterCollection;
use crate::error::SqlContextError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// `SQLite` has no decimal, timestamp or interval storage class: decimals and timestamps are
/// stored as text, intervals as whole milliseconds.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::TinyInt(i) => Value::Integer(i64::from(*i)),
        RowValues::SmallInt(i) => Value::Integer(i64::from(*i)),
        RowValues::Int(i) => Value::Integer(i64::from(*i)),
        RowValues::BigInt(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Decimal(d) => Value::Text(d.to_string()),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::TimestampTz(dt) => Value::Text(dt.to_rfc3339()),
        RowValues::Interval(d) => Value::Integer(d.num_milliseconds()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bind every parameter whose name appears in the statement. Names the statement does not
/// mention are skipped; placeholders left unbound read as NULL.
///
/// # Errors
/// Returns `SqlContextError::ExecutionFailed` if `SQLite` rejects a binding.
pub fn bind_parameters(
    stmt: &mut Statement<'_>,
    params: &ParameterCollection,
) -> Result<(), SqlContextError> {
    for param in params {
        match stmt.parameter_index(param.name())? {
            Some(idx) => stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(param.value()))?,
            None => tracing::trace!(name = param.name(), "parameter not referenced by statement"),
        }
    }
    Ok(())
}
