//! Result store shared between the passes of one run

use crate::error::StoreError;
use crate::pass::PassId;
use std::any::{type_name, Any};
use std::collections::HashMap;

/// Type-erased results keyed by the identity of the pass that produced them.
///
/// Each entry is written at most once per run.
#[derive(Default)]
pub struct ResultStore {
    entries: HashMap<PassId, Box<dyn Any>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the result of `pass`. Fails with `Conflict` if one is already set.
    pub fn set<T: Any>(&mut self, pass: PassId, value: T) -> Result<(), StoreError> {
        if self.entries.contains_key(&pass) {
            return Err(StoreError::Conflict { pass });
        }
        self.entries.insert(pass, Box::new(value));
        Ok(())
    }

    /// Borrow the result of `pass` as a `T`.
    pub fn get<T: Any>(&self, pass: PassId) -> Result<&T, StoreError> {
        let entry = self
            .entries
            .get(&pass)
            .ok_or(StoreError::MissingInput { pass })?;
        entry.downcast_ref::<T>().ok_or(StoreError::TypeMismatch {
            pass,
            expected: type_name::<T>(),
        })
    }

    pub fn has(&self, pass: PassId) -> bool {
        self.entries.contains_key(&pass)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities with a stored result, sorted
    pub fn ids(&self) -> Vec<PassId> {
        let mut ids: Vec<PassId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PassId = PassId::new("a");
    const B: PassId = PassId::new("b");

    #[test]
    fn test_set_and_get() {
        let mut store = ResultStore::new();
        assert!(store.is_empty());
        store.set(A, String::from("source")).unwrap();
        assert!(store.has(A));
        assert!(!store.has(B));
        assert_eq!(store.get::<String>(A).unwrap(), "source");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_conflict() {
        let mut store = ResultStore::new();
        store.set(A, 1u32).unwrap();
        assert_eq!(store.set(A, 2u32), Err(StoreError::Conflict { pass: A }));
        assert_eq!(*store.get::<u32>(A).unwrap(), 1);
    }

    #[test]
    fn test_missing_and_mismatch() {
        let mut store = ResultStore::new();
        assert_eq!(
            store.get::<u32>(B).unwrap_err(),
            StoreError::MissingInput { pass: B }
        );
        store.set(B, 7i64).unwrap();
        assert!(matches!(
            store.get::<String>(B),
            Err(StoreError::TypeMismatch { pass: B, .. })
        ));
    }

    #[test]
    fn test_ids_sorted() {
        let mut store = ResultStore::new();
        store.set(B, ()).unwrap();
        store.set(A, ()).unwrap();
        assert_eq!(store.ids(), vec![A, B]);
    }
}
