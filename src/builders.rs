//! Text builders for common single-table statements.
//!
//! Each builder returns a [`QueryAndParams`]; [`SqlBuilderExt`] turns one into a context
//! with its values bound positionally. Table, column and `WHERE` text is inserted verbatim.

use crate::client::DbConnection;
use crate::config::DEFAULT_MARKER;
use crate::context::SqlContext;
use crate::error::SqlContextError;
use crate::types::RowValues;

/// A SQL string and the values to bind to it positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: Vec<RowValues>,
}

impl QueryAndParams {
    /// Create a new `QueryAndParams` with the given query string and parameters
    pub fn new(query: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Create a new `QueryAndParams` with no parameters
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }
}

fn split_columns(columns: &str) -> impl Iterator<Item = &str> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn push_where(sql: &mut String, filter: &str) {
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
}

/// `CREATE TABLE IF NOT EXISTS table(definitions);`
#[must_use]
pub fn create_table(table: &str, column_definitions: &str) -> QueryAndParams {
    QueryAndParams::new_without_params(format!(
        "CREATE TABLE IF NOT EXISTS {table}({column_definitions});"
    ))
}

/// `SELECT * FROM table [WHERE filter]`
#[must_use]
pub fn select(table: &str, filter: &str, params: Vec<RowValues>) -> QueryAndParams {
    let mut sql = format!("SELECT * FROM {table}");
    push_where(&mut sql, filter);
    QueryAndParams::new(sql, params)
}

/// `SELECT COUNT(*) FROM table [WHERE filter]`
#[must_use]
pub fn count(table: &str, filter: &str, params: Vec<RowValues>) -> QueryAndParams {
    let mut sql = format!("SELECT COUNT(*) FROM {table}");
    push_where(&mut sql, filter);
    QueryAndParams::new(sql, params)
}

/// `INSERT INTO table(a,b) VALUES(@a,@b)`; `columns` is comma separated.
#[must_use]
pub fn insert(table: &str, columns: &str, params: Vec<RowValues>) -> QueryAndParams {
    let placeholders: Vec<String> = split_columns(columns)
        .map(|name| format!("{DEFAULT_MARKER}{name}"))
        .collect();
    let sql = format!(
        "INSERT INTO {table}({columns}) VALUES({})",
        placeholders.join(",")
    );
    QueryAndParams::new(sql, params)
}

/// `UPDATE table SET a = @a,b = @b [WHERE filter]`; `columns` is comma separated and may be
/// empty.
#[must_use]
pub fn update(table: &str, columns: &str, filter: &str, params: Vec<RowValues>) -> QueryAndParams {
    let mut sql = format!("UPDATE {table} ");
    let assignments: Vec<String> = split_columns(columns)
        .map(|name| format!("{name} = {DEFAULT_MARKER}{name}"))
        .collect();
    if !assignments.is_empty() {
        sql.push_str("SET ");
        sql.push_str(&assignments.join(","));
    }
    push_where(&mut sql, filter);
    QueryAndParams::new(sql, params)
}

/// `DELETE FROM table [WHERE filter]`
#[must_use]
pub fn delete(table: &str, filter: &str, params: Vec<RowValues>) -> QueryAndParams {
    let mut sql = format!("DELETE FROM {table}");
    push_where(&mut sql, filter);
    QueryAndParams::new(sql, params)
}

/// Statement builders available on every connection.
pub trait SqlBuilderExt: DbConnection + Sized {
    /// Context for a built statement, with its values bound positionally.
    ///
    /// # Errors
    /// As [`SqlContext::parameters_positional`].
    fn prepare(&self, statement: QueryAndParams) -> Result<SqlContext<'_, Self>, SqlContextError> {
        let mut context = SqlContext::new(self, statement.query);
        context.parameters_positional(statement.params)?;
        Ok(context)
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn create_table(
        &self,
        table: &str,
        column_definitions: &str,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(create_table(table, column_definitions))
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn select_from(
        &self,
        table: &str,
        filter: &str,
        params: Vec<RowValues>,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(select(table, filter, params))
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn count_from(
        &self,
        table: &str,
        filter: &str,
        params: Vec<RowValues>,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(count(table, filter, params))
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn insert_into(
        &self,
        table: &str,
        columns: &str,
        params: Vec<RowValues>,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(insert(table, columns, params))
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn update_table(
        &self,
        table: &str,
        columns: &str,
        filter: &str,
        params: Vec<RowValues>,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(update(table, columns, filter, params))
    }

    /// # Errors
    /// As [`SqlBuilderExt::prepare`].
    fn delete_from(
        &self,
        table: &str,
        filter: &str,
        params: Vec<RowValues>,
    ) -> Result<SqlContext<'_, Self>, SqlContextError> {
        self.prepare(delete(table, filter, params))
    }
}

impl<C: DbConnection> SqlBuilderExt for C {}
