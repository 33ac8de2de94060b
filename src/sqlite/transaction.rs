use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::connection::SqliteClient;
use crate::client::DbTransaction;
use crate::error::SqlContextError;

/// Handle to a transaction started with `BEGIN`. Clones refer to the same transaction;
/// once one of them commits or rolls back, the others report it as completed.
///
/// Dropping the handles does not roll back.
#[derive(Clone, Debug)]
pub struct SqliteTransaction {
    client: SqliteClient,
    completed: Arc<AtomicBool>,
}

impl SqliteTransaction {
    pub(crate) fn new(client: SqliteClient) -> Self {
        Self {
            client,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn finish(&self, statement: &str) -> Result<(), SqlContextError> {
        if self.is_completed() {
            return Err(SqlContextError::ExecutionFailed(
                "SQLite transaction already completed".into(),
            ));
        }
        self.client.execute_batch(statement)?;
        self.completed.store(true, Ordering::Release);
        tracing::debug!(statement, "finished SQLite transaction");
        Ok(())
    }
}

impl DbTransaction for SqliteTransaction {
    type Connection = SqliteClient;

    fn connection(&self) -> &SqliteClient {
        &self.client
    }

    fn commit(&self) -> Result<(), SqlContextError> {
        self.finish("COMMIT")
    }

    fn rollback(&self) -> Result<(), SqlContextError> {
        self.finish("ROLLBACK")
    }
}
