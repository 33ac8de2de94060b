//! Mapping from Rust types to client parameter kinds.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::error::SqlContextError;
use crate::types::{ParamKind, RowValues};

type KindTable = HashMap<TypeId, ParamKind>;

macro_rules! kind_table {
    ($($ty:ty => $kind:ident),* $(,)?) => {{
        let mut table = KindTable::new();
        $(
            table.insert(TypeId::of::<$ty>(), ParamKind::$kind);
            table.insert(TypeId::of::<Option<$ty>>(), ParamKind::$kind);
        )*
        table
    }};
}

static KIND_TABLE: LazyLock<KindTable> = LazyLock::new(|| {
    kind_table! {
        String => String,
        &'static str => String,
        u8 => Byte,
        i16 => Int16,
        i32 => Int32,
        i64 => Int64,
        bool => Boolean,
        NaiveDateTime => DateTime2,
        DateTime<FixedOffset> => DateTimeOffset,
        DateTime<Utc> => DateTimeOffset,
        Decimal => Decimal,
        f64 => Double,
        TimeDelta => Time,
    }
});

/// Read-only lookup from a value's type to its [`ParamKind`].
///
/// The table never falls back to a default kind: a type it does not list is reported as
/// [`SqlContextError::TypeNotSupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCodec;

impl TypeCodec {
    /// Kind for a statically known type.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::TypeNotSupported` if `T` is not in the table.
    pub fn kind_of<T: 'static>() -> Result<ParamKind, SqlContextError> {
        Self::lookup(TypeId::of::<T>(), type_name::<T>())
    }

    /// Kind for a value's runtime type. `Null` is typed as text.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::TypeNotSupported` for blob and JSON values, which the
    /// table does not cover.
    pub fn kind_of_value(value: &RowValues) -> Result<ParamKind, SqlContextError> {
        let (id, name) = match value {
            RowValues::Null | RowValues::Text(_) => (TypeId::of::<String>(), "String"),
            RowValues::TinyInt(_) => (TypeId::of::<u8>(), "u8"),
            RowValues::SmallInt(_) => (TypeId::of::<i16>(), "i16"),
            RowValues::Int(_) => (TypeId::of::<i32>(), "i32"),
            RowValues::BigInt(_) => (TypeId::of::<i64>(), "i64"),
            RowValues::Float(_) => (TypeId::of::<f64>(), "f64"),
            RowValues::Decimal(_) => (TypeId::of::<Decimal>(), "Decimal"),
            RowValues::Bool(_) => (TypeId::of::<bool>(), "bool"),
            RowValues::Timestamp(_) => (TypeId::of::<NaiveDateTime>(), "NaiveDateTime"),
            RowValues::TimestampTz(_) => (
                TypeId::of::<DateTime<FixedOffset>>(),
                "DateTime<FixedOffset>",
            ),
            RowValues::Interval(_) => (TypeId::of::<TimeDelta>(), "TimeDelta"),
            RowValues::JSON(_) => (TypeId::of::<JsonValue>(), "serde_json::Value"),
            RowValues::Blob(_) => (TypeId::of::<Vec<u8>>(), "Vec<u8>"),
        };
        Self::lookup(id, name)
    }

    /// True if `T` has an entry in the table.
    #[must_use]
    pub fn supports<T: 'static>() -> bool {
        KIND_TABLE.contains_key(&TypeId::of::<T>())
    }

    fn lookup(id: TypeId, name: &str) -> Result<ParamKind, SqlContextError> {
        KIND_TABLE
            .get(&id)
            .copied()
            .ok_or_else(|| SqlContextError::TypeNotSupported(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_types_resolve() {
        assert_eq!(TypeCodec::kind_of::<i32>().unwrap(), ParamKind::Int32);
        assert_eq!(TypeCodec::kind_of::<&'static str>().unwrap(), ParamKind::String);
        assert_eq!(TypeCodec::kind_of::<Option<i64>>().unwrap(), ParamKind::Int64);
        assert_eq!(
            TypeCodec::kind_of::<DateTime<Utc>>().unwrap(),
            ParamKind::DateTimeOffset
        );
        assert_eq!(TypeCodec::kind_of::<TimeDelta>().unwrap(), ParamKind::Time);
    }

    #[test]
    fn every_listed_type_and_its_option_resolve() {
        fn pair<T: 'static>(kind: ParamKind) -> [(Result<ParamKind, SqlContextError>, ParamKind); 2] {
            [
                (TypeCodec::kind_of::<T>(), kind),
                (TypeCodec::kind_of::<Option<T>>(), kind),
            ]
        }

        let table = [
            pair::<String>(ParamKind::String),
            pair::<&'static str>(ParamKind::String),
            pair::<u8>(ParamKind::Byte),
            pair::<i16>(ParamKind::Int16),
            pair::<i32>(ParamKind::Int32),
            pair::<i64>(ParamKind::Int64),
            pair::<bool>(ParamKind::Boolean),
            pair::<NaiveDateTime>(ParamKind::DateTime2),
            pair::<DateTime<FixedOffset>>(ParamKind::DateTimeOffset),
            pair::<DateTime<Utc>>(ParamKind::DateTimeOffset),
            pair::<Decimal>(ParamKind::Decimal),
            pair::<f64>(ParamKind::Double),
            pair::<TimeDelta>(ParamKind::Time),
        ];
        for (resolved, expected) in table.into_iter().flatten() {
            assert_eq!(resolved.unwrap(), expected);
        }
    }

    #[test]
    fn unlisted_type_is_rejected() {
        let err = TypeCodec::kind_of::<u32>().unwrap_err();
        assert!(matches!(err, SqlContextError::TypeNotSupported(name) if name == "u32"));
        assert!(!TypeCodec::supports::<Vec<u8>>());
    }

    #[test]
    fn runtime_values_resolve() {
        assert_eq!(
            TypeCodec::kind_of_value(&RowValues::Null).unwrap(),
            ParamKind::String
        );
        assert_eq!(
            TypeCodec::kind_of_value(&RowValues::Int(1)).unwrap(),
            ParamKind::Int32
        );
        assert_eq!(
            TypeCodec::kind_of_value(&RowValues::Decimal(Decimal::new(125, 2))).unwrap(),
            ParamKind::Decimal
        );
        assert!(matches!(
            TypeCodec::kind_of_value(&RowValues::Blob(vec![1])),
            Err(SqlContextError::TypeNotSupported(_))
        ));
    }
}
