use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::binder::ParameterCollection;
use crate::client::{DbCommand, DbConnection, DbTransaction, RowCursor};
use crate::error::SqlContextError;
use crate::results::{ResultSet, ResultSetCursor};
use crate::types::RowValues;

/// Scripted outcome for the next command executed on a [`MockConnection`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows(ResultSet),
    Affected(usize),
    Fail(String),
    /// Yield the rows, then fail on the following advance.
    RowsThenFail(ResultSet, String),
}

/// Text and parameters of a command at the moment it executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCommand {
    pub text: String,
    pub parameters: ParameterCollection,
    /// Row limit the reader was asked for, if any.
    pub max_rows: Option<usize>,
}

#[derive(Default)]
struct MockState {
    open: Cell<bool>,
    opens: Cell<usize>,
    closes: Cell<usize>,
    fail_open: Cell<bool>,
    fail_close: Cell<bool>,
    begins: Cell<usize>,
    commits: Cell<usize>,
    rollbacks: Cell<usize>,
    fail_commit: Cell<bool>,
    responses: RefCell<VecDeque<MockResponse>>,
    executed: RefCell<Vec<ExecutedCommand>>,
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

/// In-memory connection that records lifecycle calls and replays scripted responses.
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Rc<MockState>,
}

impl MockConnection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection that starts open; the initial open is not counted.
    #[must_use]
    pub fn opened() -> Self {
        let conn = Self::new();
        conn.state.open.set(true);
        conn
    }

    pub fn push_response(&self, response: MockResponse) -> &Self {
        self.state.responses.borrow_mut().push_back(response);
        self
    }

    pub fn push_rows(&self, result_set: ResultSet) -> &Self {
        self.push_response(MockResponse::Rows(result_set))
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.fail_open.set(fail);
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.set(fail);
    }

    pub fn fail_commit(&self, fail: bool) {
        self.state.fail_commit.set(fail);
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.opens.get()
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.state.closes.get()
    }

    #[must_use]
    pub fn begin_count(&self) -> usize {
        self.state.begins.get()
    }

    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.state.commits.get()
    }

    #[must_use]
    pub fn rollback_count(&self) -> usize {
        self.state.rollbacks.get()
    }

    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.state.executed.borrow().clone()
    }
}

impl DbConnection for MockConnection {
    type Command = MockCommand;
    type Transaction = MockTransaction;

    fn is_open(&self) -> bool {
        self.state.open.get()
    }

    fn open(&self) -> Result<(), SqlContextError> {
        if self.state.fail_open.get() {
            return Err(SqlContextError::ConnectionError("mock open failure".into()));
        }
        bump(&self.state.opens);
        self.state.open.set(true);
        Ok(())
    }

    fn close(&self) -> Result<(), SqlContextError> {
        bump(&self.state.closes);
        self.state.open.set(false);
        if self.state.fail_close.get() {
            return Err(SqlContextError::ConnectionError("mock close failure".into()));
        }
        Ok(())
    }

    fn create_command(&self) -> MockCommand {
        MockCommand {
            state: Rc::clone(&self.state),
            text: String::new(),
            params: ParameterCollection::new(),
        }
    }

    fn begin_transaction(&self) -> Result<MockTransaction, SqlContextError> {
        bump(&self.state.begins);
        Ok(MockTransaction {
            conn: self.clone(),
            id: self.state.begins.get(),
        })
    }
}

pub struct MockCommand {
    state: Rc<MockState>,
    text: String,
    params: ParameterCollection,
}

impl MockCommand {
    fn next_response(&self, max_rows: Option<usize>) -> Result<MockResponse, SqlContextError> {
        if !self.state.open.get() {
            return Err(SqlContextError::ConnectionError(
                "mock connection is closed".into(),
            ));
        }
        self.state.executed.borrow_mut().push(ExecutedCommand {
            text: self.text.clone(),
            parameters: self.params.clone(),
            max_rows,
        });
        Ok(self
            .state
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(MockResponse::Rows(ResultSet::default())))
    }
}

impl DbCommand for MockCommand {
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
        match self.next_response(None)? {
            MockResponse::Affected(n) => Ok(n),
            MockResponse::Rows(rs) => Ok(rs.results.len()),
            MockResponse::Fail(msg) | MockResponse::RowsThenFail(_, msg) => {
                Err(SqlContextError::ExecutionFailed(msg))
            }
        }
    }

    fn execute_reader(&mut self) -> Result<Box<dyn RowCursor + '_>, SqlContextError> {
        match self.next_response(None)? {
            MockResponse::Rows(rs) => Ok(Box::new(ResultSetCursor::new(rs))),
            MockResponse::Affected(_) => Ok(Box::new(ResultSetCursor::new(ResultSet::default()))),
            MockResponse::Fail(msg) => Err(SqlContextError::ExecutionFailed(msg)),
            MockResponse::RowsThenFail(rs, msg) => Ok(Box::new(FailingCursor {
                inner: ResultSetCursor::new(rs),
                error: Some(msg),
            })),
        }
    }

    // Stops short of a scripted failure that lies beyond the requested rows.
    fn execute_reader_limited(
        &mut self,
        max_rows: usize,
    ) -> Result<Box<dyn RowCursor + '_>, SqlContextError> {
        match self.next_response(Some(max_rows))? {
            MockResponse::RowsThenFail(mut rs, _) if rs.results.len() >= max_rows => {
                rs.results.truncate(max_rows);
                Ok(Box::new(ResultSetCursor::new(rs)))
            }
            MockResponse::RowsThenFail(rs, msg) => Ok(Box::new(FailingCursor {
                inner: ResultSetCursor::new(rs),
                error: Some(msg),
            })),
            MockResponse::Rows(mut rs) => {
                rs.results.truncate(max_rows);
                Ok(Box::new(ResultSetCursor::new(rs)))
            }
            MockResponse::Affected(_) => Ok(Box::new(ResultSetCursor::new(ResultSet::default()))),
            MockResponse::Fail(msg) => Err(SqlContextError::ExecutionFailed(msg)),
        }
    }
}

struct FailingCursor {
    inner: ResultSetCursor,
    error: Option<String>,
}

impl RowCursor for FailingCursor {
    fn advance(&mut self) -> Result<bool, SqlContextError> {
        if self.inner.advance()? {
            return Ok(true);
        }
        Err(SqlContextError::ExecutionFailed(
            self.error.take().unwrap_or_default(),
        ))
    }

    fn column_names(&self) -> &[String] {
        self.inner.column_names()
    }

    fn value_at(&self, index: usize) -> Option<&RowValues> {
        self.inner.value_at(index)
    }
}

#[derive(Clone)]
pub struct MockTransaction {
    conn: MockConnection,
    id: usize,
}

impl MockTransaction {
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

impl DbTransaction for MockTransaction {
    type Connection = MockConnection;

    fn connection(&self) -> &MockConnection {
        &self.conn
    }

    fn commit(&self) -> Result<(), SqlContextError> {
        if self.conn.state.fail_commit.get() {
            return Err(SqlContextError::ConnectionError("mock commit failure".into()));
        }
        bump(&self.conn.state.commits);
        Ok(())
    }

    fn rollback(&self) -> Result<(), SqlContextError> {
        bump(&self.conn.state.rollbacks);
        Ok(())
    }
}
