//! # In-memory Document Store
//!
//! Documents are kept encoded, exactly as the redb store keeps them, so a
//! caller never observes shared mutable state and both backends agree on
//! serialization failures. One mutex serializes every write.

use super::{
    Document, DocumentStore, IndexDiff, decode, encode, index_diff, index_key, not_found,
};
use crate::clock::Clock;
use crate::types::PortalError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    /// collection -> key -> encoded document
    collections: BTreeMap<&'static str, BTreeMap<u128, Vec<u8>>>,
    /// `<collection>/<field>/<value>` -> key
    unique_index: BTreeMap<String, u128>,
}

impl Tables {
    fn check_unique(&self, diff: &IndexDiff, key: u128) -> Result<(), PortalError> {
        for (index, unique) in &diff.added {
            if self.unique_index.get(index).is_some_and(|owner| *owner != key) {
                return Err(PortalError::DuplicateKey {
                    field: unique.field,
                    value: unique.value.clone(),
                });
            }
        }
        Ok(())
    }

    fn apply_index(&mut self, diff: IndexDiff, key: u128) {
        for index in diff.removed {
            self.unique_index.remove(&index);
        }
        for (index, _) in diff.added {
            self.unique_index.insert(index, key);
        }
    }
}

/// A volatile store behind a single mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn insert<D: Document>(&self, mut doc: D, now: DateTime<Utc>) -> Result<D, PortalError> {
        doc.before_persist(now);
        let key = doc.key();
        let bytes = encode(&doc)?;
        let diff = index_diff::<D>(None, Some(&doc));

        let mut tables = self.lock();
        tables.check_unique(&diff, key)?;
        tables.apply_index(diff, key);
        tables
            .collections
            .entry(D::COLLECTION)
            .or_default()
            .insert(key, bytes);
        Ok(doc)
    }

    fn get<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        let tables = self.lock();
        tables
            .collections
            .get(D::COLLECTION)
            .and_then(|c| c.get(&key))
            .map(|bytes| decode(bytes))
            .transpose()
    }

    fn find_unique<D: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<D>, PortalError> {
        let key = {
            let tables = self.lock();
            tables
                .unique_index
                .get(&index_key(D::COLLECTION, field, value))
                .copied()
        };
        match key {
            Some(key) => self.get(key),
            None => Ok(None),
        }
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, PortalError> {
        let tables = self.lock();
        tables
            .collections
            .get(D::COLLECTION)
            .map(|c| c.values().map(|bytes| decode(bytes)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn count<D: Document>(&self) -> Result<usize, PortalError> {
        let tables = self.lock();
        Ok(tables
            .collections
            .get(D::COLLECTION)
            .map(BTreeMap::len)
            .unwrap_or(0))
    }

    fn update<D, T, F>(&self, key: u128, clock: &dyn Clock, f: F) -> Result<(D, T), PortalError>
    where
        D: Document,
        F: FnOnce(&mut D) -> Result<T, PortalError>,
    {
        let mut tables = self.lock();
        let current: D = match tables.collections.get(D::COLLECTION).and_then(|c| c.get(&key)) {
            Some(bytes) => decode(bytes)?,
            None => return Err(not_found::<D>(key)),
        };

        let mut next = current.clone();
        let output = f(&mut next)?;
        next.before_persist(clock.now());
        if next.key() != key {
            return Err(PortalError::Validation("Document id cannot change".to_string()));
        }

        let bytes = encode(&next)?;
        let diff = index_diff(Some(&current), Some(&next));
        tables.check_unique(&diff, key)?;
        tables.apply_index(diff, key);
        tables
            .collections
            .entry(D::COLLECTION)
            .or_default()
            .insert(key, bytes);
        Ok((next, output))
    }

    fn delete<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        let mut tables = self.lock();
        let Some(bytes) = tables
            .collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.remove(&key))
        else {
            return Ok(None);
        };
        let removed: D = decode(&bytes)?;
        tables.apply_index(index_diff(Some(&removed), None), key);
        Ok(Some(removed))
    }
}
