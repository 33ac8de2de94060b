//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and traits
//! to make it easier to get started with the library.

pub use crate::builders::{QueryAndParams, SqlBuilderExt};
pub use crate::client::{DbCommand, DbConnection, DbTransaction, Row, RowCursor};
pub use crate::config::{BindingMode, ContextOptions};
pub use crate::context::{ConnectionExt, SqlContext, TransactionExt};
pub use crate::error::SqlContextError;
pub use crate::mapper::MapperRegistry;
pub use crate::sql_params;
pub use crate::types::{FromRowValue, ParamKind, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteClient, SqliteOptions, SqliteTransaction};
