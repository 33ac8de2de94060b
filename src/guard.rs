use crate::client::DbConnection;
use crate::error::SqlContextError;

/// Scoped use of a connection that closes it again only if this guard opened it.
///
/// Obtain one with [`ConnectionGuard::acquire`]. Call [`release`](ConnectionGuard::release)
/// on the success path so a failing close is reported; on any other path `Drop` closes the
/// connection and logs a close failure instead of replacing the error already in flight.
pub struct ConnectionGuard<'c, C: DbConnection> {
    conn: &'c C,
    opened_by_self: bool,
}

impl<'c, C: DbConnection> ConnectionGuard<'c, C> {
    /// Open `conn` if it is closed and take responsibility for closing it.
    ///
    /// # Errors
    /// Returns the client's error if opening fails; nothing is left to clean up then.
    pub fn acquire(conn: &'c C) -> Result<Self, SqlContextError> {
        if conn.is_open() {
            return Ok(Self {
                conn,
                opened_by_self: false,
            });
        }
        conn.open()?;
        tracing::debug!("opened connection for statement");
        Ok(Self {
            conn,
            opened_by_self: true,
        })
    }

    #[must_use]
    pub fn opened_by_self(&self) -> bool {
        self.opened_by_self
    }

    #[must_use]
    pub fn connection(&self) -> &'c C {
        self.conn
    }

    /// Close the connection if this guard opened it.
    ///
    /// # Errors
    /// Returns the client's error if closing fails.
    pub fn release(mut self) -> Result<(), SqlContextError> {
        self.close_if_owned()
    }

    fn close_if_owned(&mut self) -> Result<(), SqlContextError> {
        if !self.opened_by_self {
            return Ok(());
        }
        self.opened_by_self = false;
        tracing::debug!("closing connection opened for statement");
        self.conn.close()
    }
}

impl<C: DbConnection> Drop for ConnectionGuard<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.close_if_owned() {
            tracing::warn!(error = %err, "failed to close connection after failed statement");
        }
    }
}

impl<C: DbConnection> std::fmt::Debug for ConnectionGuard<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("opened_by_self", &self.opened_by_self)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockConnection;

    #[test]
    fn opens_and_releases_closed_connection() {
        let conn = MockConnection::new();
        let guard = ConnectionGuard::acquire(&conn).unwrap();
        assert!(guard.opened_by_self());
        assert!(conn.is_open());
        guard.release().unwrap();
        assert!(!conn.is_open());
        assert_eq!(conn.close_count(), 1);
    }

    #[test]
    fn leaves_open_connection_alone() {
        let conn = MockConnection::opened();
        let guard = ConnectionGuard::acquire(&conn).unwrap();
        assert!(!guard.opened_by_self());
        guard.release().unwrap();
        assert!(conn.is_open());
        assert_eq!(conn.close_count(), 0);
    }

    #[test]
    fn drop_closes_without_release() {
        let conn = MockConnection::new();
        conn.fail_close(true);
        {
            let _guard = ConnectionGuard::acquire(&conn).unwrap();
        }
        assert!(!conn.is_open());
        assert_eq!(conn.close_count(), 1);
    }

    #[test]
    fn release_reports_close_failure_once() {
        let conn = MockConnection::new();
        conn.fail_close(true);
        let guard = ConnectionGuard::acquire(&conn).unwrap();
        assert!(matches!(
            guard.release(),
            Err(SqlContextError::ConnectionError(_))
        ));
        assert_eq!(conn.close_count(), 1);
    }
}
