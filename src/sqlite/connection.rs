use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;

use super::command::SqliteCommand;
use super::config::SqliteOptions;
use super::transaction::SqliteTransaction;
use crate::client::DbConnection;
use crate::error::SqlContextError;

/// The raw connection slot shared by a client, its commands and its transactions.
/// `None` while closed.
pub(crate) type SharedSqliteConnection = Arc<Mutex<Option<Connection>>>;

/// Clonable handle to one `SQLite` connection. Clones share the same underlying connection
/// and open/closed state.
#[derive(Clone)]
pub struct SqliteClient {
    options: Arc<SqliteOptions>,
    handle: SharedSqliteConnection,
}

impl SqliteClient {
    /// A closed client for `options`.
    #[must_use]
    pub fn new(options: SqliteOptions) -> Self {
        Self {
            options: Arc::new(options),
            handle: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    /// Run `func` against the open connection.
    ///
    /// # Errors
    /// Returns `SqlContextError::ConnectionError` if the connection is closed, or whatever
    /// `func` returns.
    pub fn with_connection<F, R>(&self, func: F) -> Result<R, SqlContextError>
    where
        F: FnOnce(&Connection) -> Result<R, SqlContextError>,
    {
        with_open(&self.handle, func)
    }

    /// Run a batch of `;`-separated statements on the open connection.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the connection is closed, `ExecutionFailed` otherwise.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlContextError> {
        self.with_connection(|conn| Ok(conn.execute_batch(sql)?))
    }

    pub(crate) fn handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.handle)
    }
}

pub(crate) fn with_open<F, R>(handle: &SharedSqliteConnection, func: F) -> Result<R, SqlContextError>
where
    F: FnOnce(&Connection) -> Result<R, SqlContextError>,
{
    let guard = handle.lock();
    let conn = guard
        .as_ref()
        .ok_or_else(|| SqlContextError::ConnectionError("SQLite connection is closed".into()))?;
    func(conn)
}

impl DbConnection for SqliteClient {
    type Command = SqliteCommand;
    type Transaction = SqliteTransaction;

    fn is_open(&self) -> bool {
        self.handle.lock().is_some()
    }

    fn open(&self) -> Result<(), SqlContextError> {
        let mut slot = self.handle.lock();
        if slot.is_some() {
            return Ok(());
        }
        let conn = Connection::open(&self.options.db_path).map_err(|e| {
            SqlContextError::ConnectionError(format!(
                "Failed to open SQLite database {}: {e}",
                self.options.db_path
            ))
        })?;
        if self.options.wal && !self.options.is_memory() {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        tracing::debug!(path = %self.options.db_path, "opened SQLite connection");
        *slot = Some(conn);
        Ok(())
    }

    fn close(&self) -> Result<(), SqlContextError> {
        let Some(conn) = self.handle.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| {
            SqlContextError::ConnectionError(format!("Failed to close SQLite connection: {e}"))
        })?;
        tracing::debug!(path = %self.options.db_path, "closed SQLite connection");
        Ok(())
    }

    fn create_command(&self) -> SqliteCommand {
        SqliteCommand::new(self.handle())
    }

    fn begin_transaction(&self) -> Result<SqliteTransaction, SqlContextError> {
        self.execute_batch("BEGIN")?;
        Ok(SqliteTransaction::new(self.clone()))
    }
}

impl fmt::Debug for SqliteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteClient")
            .field("options", &self.options)
            .field("open", &self.is_open())
            .finish()
    }
}
