//! Registry of row mappers keyed by target type.
//!
//! The registry is an ordinary value: build one at startup, register the domain's mappers,
//! then share it (by reference or `Arc`) with every context that maps rows. Lookups take a
//! read lock, so request threads can resolve mappers concurrently.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::client::Row;
use crate::error::SqlContextError;

/// Converts the current row into a `T`; `Ok(None)` means "no value for this row".
pub type Mapper<T> = Arc<dyn Fn(&Row<'_>) -> Result<Option<T>, SqlContextError> + Send + Sync>;

#[derive(Default)]
pub struct MapperRegistry {
    mappers: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl MapperRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the mapper for `T`, replacing any earlier one.
    pub fn register<T, F>(&self, mapper: F)
    where
        T: 'static,
        F: Fn(&Row<'_>) -> Result<Option<T>, SqlContextError> + Send + Sync + 'static,
    {
        let mapper: Mapper<T> = Arc::new(mapper);
        let replaced = self
            .mappers
            .write()
            .insert(TypeId::of::<T>(), Box::new(mapper))
            .is_some();
        tracing::debug!(target_type = type_name::<T>(), replaced, "registered row mapper");
    }

    /// The mapper registered for `T`, if any.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Mapper<T>> {
        self.mappers
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Mapper<T>>())
            .cloned()
    }

    /// The mapper for `T`, or `NotMapped`.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::NotMapped` if no mapper is registered for `T`.
    pub fn require<T: 'static>(&self) -> Result<Mapper<T>, SqlContextError> {
        self.get::<T>()
            .ok_or_else(|| SqlContextError::NotMapped(type_name::<T>().to_string()))
    }

    /// Run the registered mapper for `T` against `row`.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::NotMapped` if no mapper is registered, or whatever the
    /// mapper itself returns.
    pub fn map<T: 'static>(&self, row: &Row<'_>) -> Result<Option<T>, SqlContextError> {
        let mapper = self.require::<T>()?;
        mapper(row)
    }

    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.mappers.read().contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.read().is_empty()
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("mappers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RowCursor;
    use crate::results::{ResultSet, ResultSetCursor};
    use crate::types::RowValues;

    #[derive(Debug, PartialEq)]
    struct User {
        id: i32,
    }

    fn one_row_cursor() -> ResultSetCursor {
        let mut cursor = ResultSetCursor::new(ResultSet::from_rows(
            vec!["id".into()],
            vec![vec![RowValues::Int(7)]],
        ));
        cursor.advance().unwrap();
        cursor
    }

    #[test]
    fn register_then_get_returns_mapper() {
        let registry = MapperRegistry::new();
        assert!(registry.get::<User>().is_none());
        registry.register(|row: &Row<'_>| Ok(Some(User { id: row.get("id")? })));
        assert!(registry.contains::<User>());

        let cursor = one_row_cursor();
        let mapper = registry.get::<User>().unwrap();
        assert_eq!(mapper(&Row::new(&cursor)).unwrap(), Some(User { id: 7 }));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = MapperRegistry::new();
        registry.register(|_: &Row<'_>| Ok(Some(User { id: 1 })));
        registry.register(|_: &Row<'_>| Ok(Some(User { id: 2 })));
        assert_eq!(registry.len(), 1);

        let cursor = one_row_cursor();
        let mapped = registry.map::<User>(&Row::new(&cursor)).unwrap();
        assert_eq!(mapped, Some(User { id: 2 }));
    }

    #[test]
    fn map_without_mapper_fails_not_mapped() {
        let registry = MapperRegistry::new();
        let cursor = one_row_cursor();
        let err = registry.map::<User>(&Row::new(&cursor)).unwrap_err();
        assert!(matches!(err, SqlContextError::NotMapped(name) if name.ends_with("User")));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let registry = Arc::new(MapperRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    if i == 0 {
                        registry.register(|_: &Row<'_>| Ok(Some(0_i64)));
                    }
                    registry.contains::<i64>()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.contains::<i64>());
    }
}
