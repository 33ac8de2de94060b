use crate::binder::{ParameterBinder, ParameterCollection};
use crate::client::{DbCommand, DbConnection, DbTransaction, Row, RowCursor};
use crate::codec::TypeCodec;
use crate::config::ContextOptions;
use crate::error::SqlContextError;
use crate::guard::ConnectionGuard;
use crate::mapper::MapperRegistry;
use crate::types::{FromRowValue, ParamKind, RowValues};

/// One SQL statement bound to a connection, its parameters, and optionally a transaction.
///
/// Every execution method opens the connection if it is closed and closes it again
/// afterwards, whether the statement succeeded or not. A connection that was already open
/// is left open, so several contexts can share it inside one transaction.
///
/// ```rust
/// # #[cfg(feature = "sqlite")]
/// # fn demo() -> Result<(), sql_context::SqlContextError> {
/// use sql_context::prelude::*;
///
/// let conn = SqliteClient::new(SqliteOptions::in_memory());
/// conn.open()?;
/// conn.sql("CREATE TABLE t (a INTEGER, b TEXT)", sql_params![])?.non_query()?;
/// conn.sql("INSERT INTO t (a, b) VALUES (@a, @b)", sql_params![1, "x"])?
///     .non_query()?;
/// let count: i64 = conn.sql("SELECT COUNT(*) FROM t", sql_params![])?.single_value(None)?;
/// assert_eq!(count, 1);
/// # Ok(()) }
/// # #[cfg(feature = "sqlite")]
/// # demo().unwrap();
/// ```
pub struct SqlContext<'c, C: DbConnection> {
    command: C::Command,
    text: String,
    connection: &'c C,
    transaction: Option<C::Transaction>,
    binder: ParameterBinder,
}

// Client failures are reported uniformly as `ExecutionFailed`.
fn client_error(err: SqlContextError) -> SqlContextError {
    match err {
        err @ SqlContextError::ExecutionFailed(_) => err,
        other => SqlContextError::execution(other),
    }
}

impl<'c, C: DbConnection> SqlContext<'c, C> {
    /// Create a context for `sql` on `connection`.
    pub fn new(connection: &'c C, sql: impl Into<String>) -> Self {
        let text = sql.into();
        let mut command = connection.create_command();
        command.set_text(&text);
        Self {
            command,
            text,
            connection,
            transaction: None,
            binder: ParameterBinder::default(),
        }
    }

    /// Create a context for `sql` on the connection owning `transaction`.
    pub fn from_transaction(transaction: &'c C::Transaction, sql: impl Into<String>) -> Self {
        let mut context = Self::new(transaction.connection(), sql);
        context.transaction = Some(transaction.clone());
        context
    }

    /// Replace the binding options for subsequent `parameter*` calls.
    #[must_use]
    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.binder = ParameterBinder::new(options);
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn connection(&self) -> &'c C {
        self.connection
    }

    #[must_use]
    pub fn command(&self) -> &C::Command {
        &self.command
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterCollection {
        self.command.parameters()
    }

    #[must_use]
    pub fn transaction(&self) -> Option<&C::Transaction> {
        self.transaction.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> ContextOptions {
        self.binder.options()
    }

    /// Bind `value` under `name`, typed from `T`.
    ///
    /// `T` must be listed in the [`TypeCodec`]; borrowed strings need to be `'static` or
    /// converted to `String` first.
    ///
    /// # Errors
    /// Returns `SqlContextError::TypeNotSupported` if `T` has no parameter kind.
    pub fn parameter<T>(&mut self, name: &str, value: T) -> Result<&mut Self, SqlContextError>
    where
        T: Into<RowValues> + 'static,
    {
        let kind = TypeCodec::kind_of::<T>()?;
        Ok(self.parameter_with_kind(name, kind, value))
    }

    /// Bind `value` under `name` with an explicit kind.
    pub fn parameter_with_kind(
        &mut self,
        name: &str,
        kind: ParamKind,
        value: impl Into<RowValues>,
    ) -> &mut Self {
        self.binder
            .set(self.command.parameters_mut(), name, kind, value.into());
        self
    }

    /// Bind `values` in order to the placeholders that are not bound yet.
    ///
    /// # Errors
    /// Returns `TypeNotSupported` for a value without a parameter kind, or
    /// `ParameterMismatch` when strict binding is configured and the counts differ.
    pub fn parameters_positional<I>(&mut self, values: I) -> Result<&mut Self, SqlContextError>
    where
        I: IntoIterator<Item = RowValues>,
    {
        let values: Vec<RowValues> = values.into_iter().collect();
        self.binder
            .bind_positional(self.command.parameters_mut(), &self.text, values)?;
        Ok(self)
    }

    /// Drop every bound parameter, e.g. before re-executing with new values.
    pub fn clear_parameters(&mut self) -> &mut Self {
        self.command.parameters_mut().clear();
        self
    }

    /// Execute without reading rows and return the affected-row count.
    ///
    /// # Errors
    /// Returns `SqlContextError::ExecutionFailed` for any client failure.
    pub fn non_query(&mut self) -> Result<usize, SqlContextError> {
        let guard = ConnectionGuard::acquire(self.connection).map_err(client_error)?;
        let affected = self.command.execute_non_query().map_err(client_error)?;
        guard.release().map_err(client_error)?;
        tracing::debug!(affected, "executed non-query");
        Ok(affected)
    }

    /// Map every row with `mapper`, skipping rows it maps to `None`.
    ///
    /// # Errors
    /// Returns `ExecutionFailed` for client failures or the mapper's own error. Rows mapped
    /// before a failure are discarded.
    pub fn many<T, F>(&mut self, mut mapper: F) -> Result<Vec<T>, SqlContextError>
    where
        F: FnMut(&Row<'_>) -> Result<Option<T>, SqlContextError>,
    {
        let items = self.with_reader(None, |cursor| {
            let mut items = Vec::new();
            while cursor.advance().map_err(client_error)? {
                if let Some(item) = mapper(&Row::new(&*cursor))? {
                    items.push(item);
                }
            }
            Ok(items)
        })?;
        tracing::debug!(rows = items.len(), "mapped rows");
        Ok(items)
    }

    /// Map every row with the registered mapper for `T`.
    ///
    /// # Errors
    /// Returns `SqlContextError::NotMapped` before touching the connection if no mapper is
    /// registered for `T`; otherwise as [`many`](Self::many).
    pub fn many_mapped<T: 'static>(
        &mut self,
        registry: &MapperRegistry,
    ) -> Result<Vec<T>, SqlContextError> {
        self.many_mapped_with(registry, |_| {})
    }

    /// As [`many_mapped`](Self::many_mapped), then call `callback` once per item in order.
    ///
    /// # Errors
    /// As [`many_mapped`](Self::many_mapped).
    pub fn many_mapped_with<T: 'static>(
        &mut self,
        registry: &MapperRegistry,
        mut callback: impl FnMut(&T),
    ) -> Result<Vec<T>, SqlContextError> {
        let mapper = registry.require::<T>()?;
        let items = self.many(|row| mapper(row))?;
        items.iter().for_each(&mut callback);
        Ok(items)
    }

    /// Map the first row, if any.
    ///
    /// Returns `None` when the statement yields no rows or the mapper yields nothing.
    ///
    /// # Errors
    /// Returns `ExecutionFailed` for client failures or the mapper's own error.
    pub fn single<T, F>(&mut self, mapper: F) -> Result<Option<T>, SqlContextError>
    where
        F: FnOnce(&Row<'_>) -> Result<Option<T>, SqlContextError>,
    {
        self.with_reader(Some(1), |cursor| {
            if cursor.advance().map_err(client_error)? {
                mapper(&Row::new(&*cursor))
            } else {
                Ok(None)
            }
        })
    }

    /// As [`single`](Self::single), falling back to `T::default()`.
    ///
    /// # Errors
    /// As [`single`](Self::single).
    pub fn single_or_default<T, F>(&mut self, mapper: F) -> Result<T, SqlContextError>
    where
        T: Default,
        F: FnOnce(&Row<'_>) -> Result<Option<T>, SqlContextError>,
    {
        Ok(self.single(mapper)?.unwrap_or_default())
    }

    /// Map the first row with the registered mapper for `T`.
    ///
    /// # Errors
    /// Returns `SqlContextError::NotMapped` before touching the connection if no mapper is
    /// registered for `T`; otherwise as [`single`](Self::single).
    pub fn single_mapped<T: 'static>(
        &mut self,
        registry: &MapperRegistry,
    ) -> Result<Option<T>, SqlContextError> {
        self.single_mapped_with(registry, |_| {})
    }

    /// As [`single_mapped`](Self::single_mapped), then call `callback` with the item if one
    /// was produced.
    ///
    /// # Errors
    /// As [`single_mapped`](Self::single_mapped).
    pub fn single_mapped_with<T: 'static>(
        &mut self,
        registry: &MapperRegistry,
        callback: impl FnOnce(&T),
    ) -> Result<Option<T>, SqlContextError> {
        let mapper = registry.require::<T>()?;
        let item = self.single(|row| mapper(row))?;
        if let Some(item) = &item {
            callback(item);
        }
        Ok(item)
    }

    /// Read one cell of the first row: the named column, or the first one when `column` is
    /// `None` or empty. Returns `T::default()` when there are no rows.
    ///
    /// # Errors
    /// Returns `CastFailed` if the cell does not convert to `T`, `ColumnNotFound` for an
    /// unknown column, or `ExecutionFailed` for client failures.
    pub fn single_value<T>(&mut self, column: Option<&str>) -> Result<T, SqlContextError>
    where
        T: FromRowValue + Default,
    {
        let column = column.filter(|c| !c.is_empty());
        self.with_reader(Some(1), |cursor| {
            if !cursor.advance().map_err(client_error)? {
                return Ok(T::default());
            }
            let row = Row::new(&*cursor);
            match column {
                Some(name) => row.get(name),
                None => row.get_at(0),
            }
        })
    }

    /// Start a transaction on the connection and bind it to this context, replacing any
    /// previously bound one. The returned handle can be used to build further contexts.
    ///
    /// # Errors
    /// Returns `ExecutionFailed` if the client cannot start a transaction.
    pub fn begin_transaction(&mut self) -> Result<C::Transaction, SqlContextError> {
        let transaction = self
            .connection
            .begin_transaction()
            .map_err(client_error)?;
        if self.transaction.is_some() {
            tracing::debug!("replacing bound transaction");
        }
        self.transaction = Some(transaction.clone());
        Ok(transaction)
    }

    /// Commit the bound transaction and unbind it. Without one this does nothing.
    ///
    /// # Errors
    /// Returns `ExecutionFailed` if the commit fails; the transaction stays bound then.
    pub fn commit(&mut self) -> Result<(), SqlContextError> {
        if let Some(transaction) = &self.transaction {
            transaction.commit().map_err(client_error)?;
            self.transaction = None;
        }
        Ok(())
    }

    /// Roll back the bound transaction and unbind it. Without one this does nothing.
    ///
    /// # Errors
    /// Returns `ExecutionFailed` if the rollback fails; the transaction stays bound then.
    pub fn rollback(&mut self) -> Result<(), SqlContextError> {
        if let Some(transaction) = &self.transaction {
            transaction.rollback().map_err(client_error)?;
            self.transaction = None;
        }
        Ok(())
    }

    // `max_rows` bounds how far the client fetches for the single-row shapes.
    fn with_reader<R, F>(&mut self, max_rows: Option<usize>, read: F) -> Result<R, SqlContextError>
    where
        F: for<'r> FnOnce(&mut (dyn RowCursor + 'r)) -> Result<R, SqlContextError>,
    {
        let guard = ConnectionGuard::acquire(self.connection).map_err(client_error)?;
        let result = {
            let cursor = match max_rows {
                Some(limit) => self.command.execute_reader_limited(limit),
                None => self.command.execute_reader(),
            };
            let mut cursor = cursor.map_err(client_error)?;
            read(&mut *cursor)
        };
        let value = result?;
        guard.release().map_err(client_error)?;
        Ok(value)
    }
}

impl<C: DbConnection> std::fmt::Debug for SqlContext<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlContext")
            .field("text", &self.text)
            .field("parameters", self.command.parameters())
            .field("in_transaction", &self.transaction.is_some())
            .finish()
    }
}

/// Build contexts straight from a connection.
pub trait ConnectionExt: DbConnection + Sized {
    /// A context for `sql` with no parameters bound.
    fn context(&self, sql: &str) -> SqlContext<'_, Self> {
        SqlContext::new(self, sql)
    }

    /// A context for `sql` with `values` bound positionally.
    ///
    /// # Errors
    /// As [`SqlContext::parameters_positional`].
    fn sql<I>(&self, sql: &str, values: I) -> Result<SqlContext<'_, Self>, SqlContextError>
    where
        I: IntoIterator<Item = RowValues>,
    {
        let mut context = self.context(sql);
        context.parameters_positional(values)?;
        Ok(context)
    }
}

impl<C: DbConnection> ConnectionExt for C {}

/// Build contexts that run inside a transaction.
pub trait TransactionExt: DbTransaction + Sized
where
    Self::Connection: DbConnection<Transaction = Self>,
{
    fn context(&self, sql: &str) -> SqlContext<'_, Self::Connection> {
        SqlContext::from_transaction(self, sql)
    }

    /// # Errors
    /// As [`SqlContext::parameters_positional`].
    fn sql<I>(
        &self,
        sql: &str,
        values: I,
    ) -> Result<SqlContext<'_, Self::Connection>, SqlContextError>
    where
        I: IntoIterator<Item = RowValues>,
    {
        let mut context = self.context(sql);
        context.parameters_positional(values)?;
        Ok(context)
    }
}

impl<T> TransactionExt for T
where
    T: DbTransaction,
    T::Connection: DbConnection<Transaction = T>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindingMode;
    use crate::test_utils::{MockConnection, MockResponse, result_set};

    #[test]
    fn scenario_insert_binds_kinds_and_restores_closed_state() {
        let conn = MockConnection::new();
        conn.push_response(MockResponse::Affected(1));
        let mut ctx = conn
            .sql(
                "INSERT INTO t(a,b) VALUES(@a,@b)",
                crate::sql_params![1, "x"],
            )
            .unwrap();

        let bound: Vec<_> = ctx
            .parameters()
            .iter()
            .map(|p| (p.name().to_string(), p.kind(), p.value().clone()))
            .collect();
        assert_eq!(
            bound,
            vec![
                ("@a".to_string(), ParamKind::Int32, RowValues::Int(1)),
                ("@b".to_string(), ParamKind::String, RowValues::Text("x".into())),
            ]
        );

        assert_eq!(ctx.non_query().unwrap(), 1);
        assert!(!conn.is_open());
        assert_eq!((conn.open_count(), conn.close_count()), (1, 1));
    }

    #[test]
    fn already_open_connection_is_left_open() {
        let conn = MockConnection::opened();
        conn.push_response(MockResponse::Fail("boom".into()));
        let mut ctx = conn.context("UPDATE t SET a = 1");
        assert!(ctx.non_query().is_err());
        assert_eq!(ctx.non_query().unwrap(), 0);
        assert!(conn.is_open());
        assert_eq!((conn.open_count(), conn.close_count()), (0, 0));
    }

    #[test]
    fn self_opened_connection_closes_even_on_failure() {
        let conn = MockConnection::new();
        conn.push_response(MockResponse::Fail("boom".into()));
        let err = conn.context("DELETE FROM t").non_query().unwrap_err();
        assert!(matches!(err, SqlContextError::ExecutionFailed(msg) if msg == "boom"));
        assert!(!conn.is_open());
        assert_eq!(conn.close_count(), 1);
    }

    #[test]
    fn close_failure_does_not_mask_execution_failure() {
        let conn = MockConnection::new();
        conn.fail_close(true);
        conn.push_response(MockResponse::Fail("original".into()));
        let err = conn.context("SELECT 1").many(|row| row.get_at::<i32>(0).map(Some));
        assert!(matches!(err, Err(SqlContextError::ExecutionFailed(msg)) if msg == "original"));
        assert_eq!(conn.close_count(), 1);
    }

    #[test]
    fn close_failure_on_success_is_reported() {
        let conn = MockConnection::new();
        conn.fail_close(true);
        let err = conn.context("UPDATE t SET a = 1").non_query().unwrap_err();
        assert!(matches!(err, SqlContextError::ExecutionFailed(msg) if msg.contains("close")));
    }

    #[test]
    fn open_failure_surfaces_as_execution_failure() {
        let conn = MockConnection::new();
        conn.fail_open(true);
        let err = conn.context("SELECT 1").single_value::<i32>(None).unwrap_err();
        assert!(matches!(err, SqlContextError::ExecutionFailed(_)));
        assert_eq!(conn.close_count(), 0);
    }

    #[test]
    fn many_skips_none_and_keeps_cursor_order() {
        let conn = MockConnection::new();
        conn.push_rows(result_set(
            &["id"],
            vec![
                vec![RowValues::Int(3)],
                vec![RowValues::Null],
                vec![RowValues::Int(1)],
            ],
        ));
        let ids = conn
            .context("SELECT id FROM t")
            .many(|row| row.get::<Option<i32>>("id"))
            .unwrap();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn many_over_empty_cursor_is_empty() {
        let conn = MockConnection::new();
        let ids: Vec<i32> = conn
            .context("SELECT id FROM t")
            .many(|row| row.get("id").map(Some))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn failure_mid_iteration_discards_rows_and_closes() {
        let conn = MockConnection::new();
        conn.push_response(MockResponse::RowsThenFail(
            result_set(&["id"], vec![vec![RowValues::Int(1)]]),
            "cursor broke".into(),
        ));
        let res = conn
            .context("SELECT id FROM t")
            .many(|row| row.get::<i32>("id").map(Some));
        assert!(matches!(res, Err(SqlContextError::ExecutionFailed(msg)) if msg == "cursor broke"));
        assert!(!conn.is_open());
    }

    #[test]
    fn single_shapes_read_only_the_first_row() {
        let conn = MockConnection::new();
        for _ in 0..2 {
            conn.push_response(MockResponse::RowsThenFail(
                result_set(&["v"], vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]]),
                "fails past the first row".into(),
            ));
        }
        let mut ctx = conn.context("SELECT v FROM t");
        assert_eq!(ctx.single_value::<i32>(None).unwrap(), 1);
        assert_eq!(
            ctx.single(|row| row.get::<i32>("v").map(Some)).unwrap(),
            Some(1)
        );
        assert!(conn.executed().iter().all(|cmd| cmd.max_rows == Some(1)));

        conn.push_rows(result_set(&["v"], vec![vec![RowValues::Int(1)]]));
        ctx.many(|row| row.get::<i32>("v").map(Some)).unwrap();
        assert_eq!(conn.executed().last().and_then(|cmd| cmd.max_rows), None);
    }

    #[test]
    fn registry_variants_resolve_mapper_and_run_callback() {
        let registry = MapperRegistry::new();
        registry.register(|row: &Row<'_>| row.get::<String>("name").map(Some));
        let conn = MockConnection::new();
        conn.push_rows(result_set(
            &["name"],
            vec![vec![RowValues::Text("a".into())], vec![RowValues::Text("b".into())]],
        ));

        let mut seen = Vec::new();
        let names: Vec<String> = conn
            .context("SELECT name FROM t")
            .many_mapped_with(&registry, |name: &String| seen.push(name.clone()))
            .unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(seen, names);
    }

    #[test]
    fn missing_mapper_fails_before_opening() {
        let registry = MapperRegistry::new();
        let conn = MockConnection::new();
        let err = conn
            .context("SELECT 1")
            .many_mapped::<String>(&registry)
            .unwrap_err();
        assert!(matches!(err, SqlContextError::NotMapped(_)));
        let err = conn
            .context("SELECT 1")
            .single_mapped::<String>(&registry)
            .unwrap_err();
        assert!(matches!(err, SqlContextError::NotMapped(_)));
        assert_eq!(conn.open_count(), 0);
    }

    #[test]
    fn single_reads_first_row_or_none() {
        let conn = MockConnection::new();
        conn.push_rows(result_set(
            &["id"],
            vec![vec![RowValues::Int(7)], vec![RowValues::Int(8)]],
        ));
        let mut ctx = conn.context("SELECT id FROM t");
        assert_eq!(ctx.single(|row| row.get::<i32>("id").map(Some)).unwrap(), Some(7));
        assert_eq!(ctx.single(|row| row.get::<i32>("id").map(Some)).unwrap(), None);
        assert_eq!(
            ctx.single_or_default(|row| row.get::<i32>("id").map(Some)).unwrap(),
            0
        );
    }

    #[test]
    fn single_mapped_with_calls_back_only_with_a_row() {
        let registry = MapperRegistry::new();
        registry.register(|row: &Row<'_>| row.get::<i64>("n").map(Some));
        let conn = MockConnection::new();
        conn.push_rows(result_set(&["n"], vec![vec![RowValues::BigInt(4)]]));

        let mut calls = 0;
        let mut ctx = conn.context("SELECT n FROM t");
        assert_eq!(
            ctx.single_mapped_with(&registry, |_: &i64| calls += 1).unwrap(),
            Some(4)
        );
        assert_eq!(
            ctx.single_mapped_with(&registry, |_: &i64| calls += 1).unwrap(),
            None
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn single_value_by_name_first_column_and_default() {
        let conn = MockConnection::new();
        conn.push_rows(result_set(&["count"], vec![vec![RowValues::Int(5)]]));
        conn.push_rows(result_set(
            &["a", "b"],
            vec![vec![RowValues::Text("first".into()), RowValues::Int(2)]],
        ));
        let mut ctx = conn.context("SELECT COUNT(*) AS count FROM t");
        assert_eq!(ctx.single_value::<i32>(Some("count")).unwrap(), 5);
        assert_eq!(ctx.single_value::<String>(Some("")).unwrap(), "first");
        assert_eq!(ctx.single_value::<i32>(Some("count")).unwrap(), 0);
    }

    #[test]
    fn single_value_cast_and_column_errors() {
        let conn = MockConnection::new();
        conn.push_rows(result_set(&["v"], vec![vec![RowValues::Text("x".into())]]));
        conn.push_rows(result_set(&["v"], vec![vec![RowValues::Int(1)]]));
        let mut ctx = conn.context("SELECT v FROM t");
        assert!(matches!(
            ctx.single_value::<i32>(None),
            Err(SqlContextError::CastFailed { .. })
        ));
        assert!(matches!(
            ctx.single_value::<i32>(Some("missing")),
            Err(SqlContextError::ColumnNotFound(name)) if name == "missing"
        ));
        assert!(!conn.is_open());
    }

    #[test]
    fn explicit_then_positional_binding() {
        let conn = MockConnection::new();
        let mut ctx = conn.context("SELECT * FROM t WHERE x = @x AND y = @y");
        ctx.parameter("x", "explicit").unwrap();
        ctx.parameters_positional(crate::sql_params![10, 20]).unwrap();
        assert_eq!(
            ctx.parameters().get("@x").unwrap().value(),
            &RowValues::Text("explicit".into())
        );
        assert_eq!(ctx.parameters().get("@y").unwrap().value(), &RowValues::Int(10));
        assert_eq!(ctx.parameters().len(), 2);
    }

    #[test]
    fn typed_parameter_rejects_unlisted_types() {
        let conn = MockConnection::new();
        let mut ctx = conn.context("SELECT @a");
        let err = ctx.parameter("a", vec![1_u8, 2]).unwrap_err();
        assert!(matches!(err, SqlContextError::TypeNotSupported(_)));
        ctx.parameter_with_kind("a", ParamKind::Binary, vec![1_u8, 2]);
        assert_eq!(ctx.parameters().get("@a").unwrap().kind(), ParamKind::Binary);
    }

    #[test]
    fn strict_options_apply_to_positional_binding() {
        let conn = MockConnection::new();
        let mut ctx = conn
            .context("SELECT @a, @b")
            .with_options(ContextOptions::default().with_binding(BindingMode::Strict));
        assert!(matches!(
            ctx.parameters_positional(crate::sql_params![1]),
            Err(SqlContextError::ParameterMismatch { .. })
        ));
        ctx.parameters_positional(crate::sql_params![1, 2]).unwrap();
        assert_eq!(ctx.parameters().len(), 2);
    }

    #[test]
    fn records_executed_text_and_parameters() {
        let conn = MockConnection::new();
        conn.sql("DELETE FROM t WHERE id = @id", crate::sql_params![9_i64])
            .unwrap()
            .non_query()
            .unwrap();
        let executed = conn.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].text, "DELETE FROM t WHERE id = @id");
        assert_eq!(
            executed[0].parameters.get("@id").unwrap().kind(),
            ParamKind::Int64
        );
    }

    #[test]
    fn transaction_begin_commit_and_noop_commit() {
        let conn = MockConnection::opened();
        let mut ctx = conn.context("UPDATE t SET a = 1");
        ctx.commit().unwrap();
        ctx.rollback().unwrap();
        assert_eq!(conn.commit_count() + conn.rollback_count(), 0);

        let first = ctx.begin_transaction().unwrap();
        let second = ctx.begin_transaction().unwrap();
        assert_eq!(ctx.transaction().map(|t| t.id()), Some(second.id()));
        assert_ne!(first.id(), second.id());

        ctx.non_query().unwrap();
        ctx.commit().unwrap();
        assert!(ctx.transaction().is_none());
        assert_eq!(conn.commit_count(), 1);
        ctx.commit().unwrap();
        assert_eq!(conn.commit_count(), 1);
    }

    #[test]
    fn failed_commit_keeps_transaction_bound() {
        let conn = MockConnection::opened();
        conn.fail_commit(true);
        let mut ctx = conn.context("UPDATE t SET a = 1");
        ctx.begin_transaction().unwrap();
        assert!(matches!(ctx.commit(), Err(SqlContextError::ExecutionFailed(_))));
        assert!(ctx.transaction().is_some());
        ctx.rollback().unwrap();
        assert!(ctx.transaction().is_none());
        assert_eq!(conn.rollback_count(), 1);
    }

    #[test]
    fn contexts_built_from_a_transaction_share_it() {
        let conn = MockConnection::opened();
        let tx = conn.begin_transaction().unwrap();
        let mut ctx = tx.sql("INSERT INTO t(a) VALUES(@a)", crate::sql_params![1]).unwrap();
        assert_eq!(ctx.transaction().map(|t| t.id()), Some(tx.id()));
        ctx.non_query().unwrap();
        ctx.commit().unwrap();
        assert_eq!(conn.commit_count(), 1);
        assert!(conn.is_open());
    }
}
