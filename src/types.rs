use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlContextError;

/// Values that can be stored in a database row or used as query parameters.
///
/// Parameters and result cells share this enum so mappers and binders never branch on
/// client-specific types:
/// ```rust
/// use sql_context::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Unsigned 8-bit integer
    TinyInt(u8),
    /// 16-bit integer
    SmallInt(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    BigInt(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Fixed-point decimal
    Decimal(Decimal),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp without offset
    Timestamp(NaiveDateTime),
    /// Timestamp with a fixed UTC offset
    TimestampTz(DateTime<FixedOffset>),
    /// Time interval
    Interval(TimeDelta),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the runtime type, used in cast diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            RowValues::TinyInt(_) => "u8",
            RowValues::SmallInt(_) => "i16",
            RowValues::Int(_) => "i32",
            RowValues::BigInt(_) => "i64",
            RowValues::Float(_) => "f64",
            RowValues::Decimal(_) => "Decimal",
            RowValues::Text(_) => "String",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "NaiveDateTime",
            RowValues::TimestampTz(_) => "DateTime<FixedOffset>",
            RowValues::Interval(_) => "TimeDelta",
            RowValues::Null => "NULL",
            RowValues::JSON(_) => "JSON",
            RowValues::Blob(_) => "Blob",
        }
    }

    /// Any integer variant, widened to 64 bits.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowValues::TinyInt(v) => Some(i64::from(*v)),
            RowValues::SmallInt(v) => Some(i64::from(*v)),
            RowValues::Int(v) => Some(i64::from(*v)),
            RowValues::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let RowValues::Bool(value) = self {
            return Some(*value);
        } else if let Some(i) = self.as_int() {
            if i == 1 {
                return Some(true);
            } else if i == 0 {
                return Some(false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.fff"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp_tz(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            RowValues::TimestampTz(value) => Some(*value),
            RowValues::Text(s) => DateTime::parse_from_rfc3339(s).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            RowValues::Decimal(value) => Some(*value),
            RowValues::Text(s) => s.parse().ok(),
            // NUMERIC affinity hands fractional decimals back as REAL
            RowValues::Float(f) => Decimal::try_from(*f).ok(),
            other => other.as_int().map(Decimal::from),
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

macro_rules! impl_from_for_row_values {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_row_values! {
    u8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    bool => Bool,
    NaiveDateTime => Timestamp,
    DateTime<FixedOffset> => TimestampTz,
    TimeDelta => Interval,
    JsonValue => JSON,
    Vec<u8> => Blob,
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_owned())
    }
}

impl From<DateTime<Utc>> for RowValues {
    fn from(value: DateTime<Utc>) -> Self {
        RowValues::TimestampTz(value.fixed_offset())
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Parameter type tags understood by database clients.
///
/// This is the enumeration a client uses to decide how a bound value is sent; the
/// [`TypeCodec`](crate::codec::TypeCodec) maps Rust types onto it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Variable-length text
    String,
    /// Unsigned 8-bit integer
    Byte,
    /// 16-bit integer
    Int16,
    /// 32-bit integer
    Int32,
    /// 64-bit integer
    Int64,
    /// Boolean
    Boolean,
    /// Date and time without offset
    DateTime2,
    /// Date and time with offset
    DateTimeOffset,
    /// Fixed-point decimal
    Decimal,
    /// Double precision float
    Double,
    /// Time interval
    Time,
    /// Raw bytes; only reachable through explicit binding
    Binary,
    /// JSON document; only reachable through explicit binding
    Json,
}

/// Checked conversion out of a result cell.
///
/// Integer variants convert into each other when the value fits; anything else that does
/// not match fails with [`SqlContextError::CastFailed`].
pub trait FromRowValue: Sized {
    /// Convert a cell into `Self`.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::CastFailed` if the cell's runtime type is incompatible.
    fn from_row_value(value: &RowValues) -> Result<Self, SqlContextError>;
}

fn cast_failed<T>(value: &RowValues) -> SqlContextError {
    SqlContextError::CastFailed {
        expected: short_type_name::<T>(),
        found: value.type_name(),
    }
}

pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rsplit("::").next() {
        Some(short) if base.len() == full.len() => short,
        _ => full,
    }
}

macro_rules! impl_from_row_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromRowValue for $ty {
                fn from_row_value(value: &RowValues) -> Result<Self, SqlContextError> {
                    value
                        .as_int()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| cast_failed::<$ty>(value))
                }
            }
        )*
    };
}

impl_from_row_value_int!(u8, i16, i32, i64);

macro_rules! impl_from_row_value_via {
    ($($ty:ty => $accessor:expr),* $(,)?) => {
        $(
            impl FromRowValue for $ty {
                fn from_row_value(value: &RowValues) -> Result<Self, SqlContextError> {
                    let accessor: fn(&RowValues) -> Option<$ty> = $accessor;
                    accessor(value).ok_or_else(|| cast_failed::<$ty>(value))
                }
            }
        )*
    };
}

impl_from_row_value_via! {
    f64 => RowValues::as_float,
    bool => RowValues::as_bool,
    String => |v| v.as_text().map(str::to_owned),
    NaiveDateTime => RowValues::as_timestamp,
    DateTime<FixedOffset> => RowValues::as_timestamp_tz,
    Decimal => RowValues::as_decimal,
    TimeDelta => |v| match v {
        RowValues::Interval(d) => Some(*d),
        // intervals come back from integer storage as milliseconds
        other => other.as_int().and_then(TimeDelta::try_milliseconds),
    },
    Vec<u8> => |v| v.as_blob().map(<[u8]>::to_vec),
    JsonValue => |v| match v {
        RowValues::JSON(j) => Some(j.clone()),
        RowValues::Text(s) => serde_json::from_str(s).ok(),
        _ => None,
    },
}

impl FromRowValue for RowValues {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlContextError> {
        Ok(value.clone())
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlContextError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}
