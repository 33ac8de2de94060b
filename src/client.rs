//! The database client surface this crate drives.
//!
//! A client supplies a connection, commands, transactions and a forward-only row cursor.
//! Connections and transactions are shared handles: methods take `&self`, and a client
//! keeps whatever interior state it needs. Commands are owned by a single context.

use crate::binder::ParameterCollection;
use crate::error::SqlContextError;
use crate::types::{FromRowValue, RowValues};

pub trait DbConnection {
    type Command: DbCommand;
    type Transaction: DbTransaction<Connection = Self> + Clone;

    fn is_open(&self) -> bool;

    /// # Errors
    /// Returns an error if the client cannot open the connection.
    fn open(&self) -> Result<(), SqlContextError>;

    /// # Errors
    /// Returns an error if the client fails while closing.
    fn close(&self) -> Result<(), SqlContextError>;

    /// Create a command bound to this connection.
    fn create_command(&self) -> Self::Command;

    /// # Errors
    /// Returns an error if the connection is closed or a transaction cannot be started.
    fn begin_transaction(&self) -> Result<Self::Transaction, SqlContextError>;
}

pub trait DbCommand {
    fn set_text(&mut self, sql: &str);

    fn text(&self) -> &str;

    fn parameters(&self) -> &ParameterCollection;

    fn parameters_mut(&mut self) -> &mut ParameterCollection;

    /// Execute and return the affected-row count.
    ///
    /// # Errors
    /// Returns an error surfaced by the client.
    fn execute_non_query(&mut self) -> Result<usize, SqlContextError>;

    /// Execute and return a cursor over the produced rows.
    ///
    /// # Errors
    /// Returns an error surfaced by the client.
    fn execute_reader(&mut self) -> Result<Box<dyn RowCursor + '_>, SqlContextError>;

    /// Execute and return a cursor the caller will advance at most `max_rows` times.
    ///
    /// Clients that fetch ahead should stop after `max_rows` rows so failures in rows the
    /// caller never reads are not reported. The default reads through
    /// [`execute_reader`](DbCommand::execute_reader).
    ///
    /// # Errors
    /// Returns an error surfaced by the client.
    fn execute_reader_limited(
        &mut self,
        _max_rows: usize,
    ) -> Result<Box<dyn RowCursor + '_>, SqlContextError> {
        self.execute_reader()
    }
}

pub trait DbTransaction {
    type Connection: DbConnection;

    fn connection(&self) -> &Self::Connection;

    /// # Errors
    /// Returns an error if the client cannot commit.
    fn commit(&self) -> Result<(), SqlContextError>;

    /// # Errors
    /// Returns an error if the client cannot roll back.
    fn rollback(&self) -> Result<(), SqlContextError>;
}

/// Forward-only cursor. Values are read from the row the last successful
/// [`advance`](RowCursor::advance) moved to.
pub trait RowCursor {
    /// Move to the next row; `false` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns an error surfaced by the client while fetching.
    fn advance(&mut self) -> Result<bool, SqlContextError>;

    fn column_names(&self) -> &[String];

    fn value_at(&self, index: usize) -> Option<&RowValues>;

    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names().iter().position(|col| col == name)
    }
}

/// The current row of a cursor, as handed to mappers.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    cursor: &'a dyn RowCursor,
}

impl<'a> Row<'a> {
    pub(crate) fn new(cursor: &'a dyn RowCursor) -> Self {
        Self { cursor }
    }

    #[must_use]
    pub fn column_names(&self) -> &'a [String] {
        self.cursor.column_names()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor.column_names().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw cell by column name.
    ///
    /// # Errors
    /// Returns `SqlContextError::ColumnNotFound` for an unknown column.
    pub fn value(&self, column: &str) -> Result<&'a RowValues, SqlContextError> {
        self.cursor
            .column_index(column)
            .and_then(|idx| self.cursor.value_at(idx))
            .ok_or_else(|| SqlContextError::ColumnNotFound(column.to_string()))
    }

    /// Raw cell by position.
    ///
    /// # Errors
    /// Returns `SqlContextError::ColumnNotFound` for an out-of-range index.
    pub fn value_at(&self, index: usize) -> Result<&'a RowValues, SqlContextError> {
        self.cursor
            .value_at(index)
            .ok_or_else(|| SqlContextError::ColumnNotFound(format!("#{index}")))
    }

    /// Typed cell by column name.
    ///
    /// # Errors
    /// Returns `ColumnNotFound` for an unknown column or `CastFailed` for an incompatible cell.
    pub fn get<T: FromRowValue>(&self, column: &str) -> Result<T, SqlContextError> {
        T::from_row_value(self.value(column)?)
    }

    /// Typed cell by position.
    ///
    /// # Errors
    /// Returns `ColumnNotFound` for an out-of-range index or `CastFailed` for an incompatible
    /// cell.
    pub fn get_at<T: FromRowValue>(&self, index: usize) -> Result<T, SqlContextError> {
        T::from_row_value(self.value_at(index)?)
    }

    /// # Errors
    /// Returns `SqlContextError::ColumnNotFound` for an unknown column.
    pub fn is_null(&self, column: &str) -> Result<bool, SqlContextError> {
        Ok(self.value(column)?.is_null())
    }
}

impl std::fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<_> = (0..self.len()).map(|i| self.cursor.value_at(i)).collect();
        f.debug_struct("Row")
            .field("columns", &self.column_names())
            .field("values", &values)
            .finish()
    }
}
