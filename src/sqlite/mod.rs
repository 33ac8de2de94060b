// SQLite client - implements the client traits over rusqlite
//
// - config: options and builder for opening the database
// - connection: the shared connection handle
// - command: statement text, parameters and execution
// - transaction: BEGIN/COMMIT/ROLLBACK handles
// - params: conversion from RowValues to SQLite values
// - query: result extraction and building

pub mod command;
pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod transaction;

pub use command::SqliteCommand;
pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteClient;
pub use query::build_result_set;
pub use transaction::SqliteTransaction;

use crate::error::SqlContextError;

/// rusqlite failures surface as execution failures.
impl From<rusqlite::Error> for SqlContextError {
    fn from(err: rusqlite::Error) -> Self {
        SqlContextError::execution(format_args!("SQLite error: {err}"))
    }
}
