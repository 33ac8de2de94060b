//! Lightweight data access over a generic database client.
//!
//! A [`SqlContext`] wraps one SQL statement: bind parameters by name or by position, run it
//! in one of four shapes (no result, many rows, one row, one value), and let the context
//! open and close the connection around the call. Rows become typed values through a
//! mapper closure or a [`MapperRegistry`].
//!
//! ```rust
//! # #[cfg(feature = "sqlite")]
//! # fn demo() -> Result<(), sql_context::SqlContextError> {
//! use sql_context::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let registry = MapperRegistry::new();
//! registry.register(|row: &Row<'_>| {
//!     Ok(Some(User {
//!         id: row.get("id")?,
//!         name: row.get("name")?,
//!     }))
//! });
//!
//! let conn = SqliteClient::new(SqliteOptions::in_memory());
//! conn.open()?;
//! conn.create_table("users", "id INTEGER PRIMARY KEY, name TEXT")?
//!     .non_query()?;
//! conn.insert_into("users", "id,name", sql_params![1_i64, "ada"])?
//!     .non_query()?;
//!
//! let users: Vec<User> = conn
//!     .sql("SELECT id, name FROM users WHERE name = @name", sql_params!["ada"])?
//!     .many_mapped(&registry)?;
//! assert_eq!(users, vec![User { id: 1, name: "ada".into() }]);
//! # Ok(()) }
//! # #[cfg(feature = "sqlite")]
//! # demo().unwrap();
//! ```

pub mod binder;
pub mod builders;
pub mod client;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod mapper;
pub mod prelude;
pub mod results;
pub mod types;

mod macros;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use binder::{
    Parameter, ParameterBinder, ParameterCollection, extract_placeholders, normalize_name,
};
pub use builders::{QueryAndParams, SqlBuilderExt};
pub use client::{DbCommand, DbConnection, DbTransaction, Row, RowCursor};
pub use codec::TypeCodec;
pub use config::{BindingMode, ContextOptions, ContextOptionsBuilder, DEFAULT_MARKER};
pub use context::{ConnectionExt, SqlContext, TransactionExt};
pub use error::SqlContextError;
pub use guard::ConnectionGuard;
pub use mapper::{Mapper, MapperRegistry};
pub use results::{CustomDbRow, ResultSet, ResultSetCursor};
pub use types::{FromRowValue, ParamKind, RowValues};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteClient, SqliteOptions, SqliteOptionsBuilder, SqliteTransaction};
