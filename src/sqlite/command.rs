use super::connection::{SharedSqliteConnection, with_open};
use super::params::bind_parameters;
use super::query::build_result_set;
use crate::binder::ParameterCollection;
use crate::client::{DbCommand, RowCursor};
use crate::error::SqlContextError;
use crate::results::ResultSetCursor;

/// Statement text plus parameters, executed against the client's shared connection.
///
/// Readers materialize their rows before returning, so the connection lock is never held by
/// a cursor. A limited reader stops stepping the statement once it has the rows asked for.
pub struct SqliteCommand {
    handle: SharedSqliteConnection,
    text: String,
    params: ParameterCollection,
}

impl SqliteCommand {
    pub(crate) fn new(handle: SharedSqliteConnection) -> Self {
        Self {
            handle,
            text: String::new(),
            params: ParameterCollection::new(),
        }
    }

    fn read_rows(
        &self,
        max_rows: Option<usize>,
    ) -> Result<Box<dyn RowCursor + 'static>, SqlContextError> {
        let result_set = with_open(&self.handle, |conn| {
            let mut stmt = conn.prepare(&self.text)?;
            bind_parameters(&mut stmt, &self.params)?;
            build_result_set(&mut stmt, max_rows)
        })?;
        Ok(Box::new(ResultSetCursor::new(result_set)))
    }
}

impl DbCommand for SqliteCommand {
    fn set_text(&mut self, sql: &str) {
        sql.clone_into(&mut self.text);
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn parameters(&self) -> &ParameterCollection {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.params
    }

    fn execute_non_query(&mut self) -> Result<usize, SqlContextError> {
        with_open(&self.handle, |conn| {
            let mut stmt = conn.prepare(&self.text)?;
            bind_parameters(&mut stmt, &self.params)?;
            Ok(stmt.raw_execute()?)
        })
    }

    fn execute_reader(&mut self) -> Result<Box<dyn RowCursor + '_>, SqlContextError> {
        self.read_rows(None)
    }

    fn execute_reader_limited(
        &mut self,
        max_rows: usize,
    ) -> Result<Box<dyn RowCursor + '_>, SqlContextError> {
        self.read_rows(Some(max_rows))
    }
}

impl std::fmt::Debug for SqliteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCommand")
            .field("text", &self.text)
            .field("params", &self.params)
            .finish()
    }
}
