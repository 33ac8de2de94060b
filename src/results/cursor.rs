use std::sync::Arc;

use super::result_set::ResultSet;
use crate::client::RowCursor;
use crate::error::SqlContextError;
use crate::types::RowValues;

/// Forward-only cursor over a materialized [`ResultSet`].
#[derive(Debug, Clone)]
pub struct ResultSetCursor {
    result_set: ResultSet,
    column_names: Arc<Vec<String>>,
    position: Option<usize>,
}

impl ResultSetCursor {
    #[must_use]
    pub fn new(result_set: ResultSet) -> Self {
        let column_names = result_set
            .get_column_names()
            .cloned()
            .unwrap_or_default();
        Self {
            result_set,
            column_names,
            position: None,
        }
    }

    /// Rows not yet visited.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let consumed = self.position.map_or(0, |p| p + 1);
        self.result_set.results.len().saturating_sub(consumed)
    }
}

impl From<ResultSet> for ResultSetCursor {
    fn from(result_set: ResultSet) -> Self {
        Self::new(result_set)
    }
}

impl RowCursor for ResultSetCursor {
    fn advance(&mut self) -> Result<bool, SqlContextError> {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.result_set.results.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.result_set.results.len());
            Ok(false)
        }
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn value_at(&self, index: usize) -> Option<&RowValues> {
        self.position
            .and_then(|p| self.result_set.results.get(p))
            .and_then(|row| row.get_by_index(index))
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.position
            .and_then(|p| self.result_set.results.get(p))
            .and_then(|row| row.get_column_index(name))
            .or_else(|| self.column_names.iter().position(|col| col == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_rows_in_order() {
        let rs = ResultSet::from_rows(
            vec!["id".into(), "name".into()],
            vec![
                vec![RowValues::Int(1), RowValues::Text("a".into())],
                vec![RowValues::Int(2), RowValues::Text("b".into())],
            ],
        );
        let mut cursor = ResultSetCursor::new(rs);
        assert!(cursor.value_at(0).is_none());
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.value_at(0), Some(&RowValues::Int(1)));
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.column_index("name"), Some(1));
        assert_eq!(cursor.value_at(1), Some(&RowValues::Text("b".into())));
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(cursor.value_at(0).is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn empty_result_set_has_no_rows() {
        let mut cursor = ResultSetCursor::new(ResultSet::default());
        assert!(!cursor.advance().unwrap());
        assert!(cursor.column_names().is_empty());
    }
}
