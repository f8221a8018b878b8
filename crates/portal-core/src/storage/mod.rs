//! # Document Storage
//!
//! Collections of postcard-encoded documents keyed by their 128-bit id, with
//! a shared unique-key index.
//!
//! Two backends implement [`DocumentStore`]:
//! - [`MemoryStore`]: a mutex-guarded map, volatile
//! - [`RedbStore`]: a redb database on disk, ACID
//!
//! ## Write path
//!
//! Every write runs the [`BeforePersist`] stage with the caller's clock
//! instant, then checks unique keys, then commits. [`DocumentStore::update`]
//! performs read, decision, before-persist and write as ONE atomic step: a
//! membership decision made inside the closure always sees the latest
//! committed state, so concurrent joins cannot push a set past its capacity.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::clock::Clock;
use crate::lifecycle::BeforePersist;
use crate::model::{College, Event, MatchRequest, ProjectPosting, User};
use crate::types::PortalError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

// =============================================================================
// DOCUMENT TRAIT
// =============================================================================

/// A value that must be unique across one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
}

impl UniqueKey {
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Key in the shared index table: `<collection>/<field>/<value>`.
    fn index_key(&self, collection: &str) -> String {
        index_key(collection, self.field, &self.value)
    }
}

fn index_key(collection: &str, field: &str, value: &str) -> String {
    format!("{}/{}/{}", collection, field, value)
}

/// A persistable document kind.
pub trait Document: Clone + Serialize + DeserializeOwned + BeforePersist {
    /// Table name.
    const COLLECTION: &'static str;
    /// Human-readable kind for not-found errors.
    const KIND: &'static str;

    fn key(&self) -> u128;

    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "User";

    fn key(&self) -> u128 {
        self.id.as_u128()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new("email", &self.email),
            UniqueKey::new("username", &self.username),
        ]
    }
}

impl Document for College {
    const COLLECTION: &'static str = "colleges";
    const KIND: &'static str = "College";

    fn key(&self) -> u128 {
        self.id.as_u128()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("domain", &self.domain)]
    }
}

impl Document for Event {
    const COLLECTION: &'static str = "events";
    const KIND: &'static str = "Event";

    fn key(&self) -> u128 {
        self.id.as_u128()
    }
}

impl Document for MatchRequest {
    const COLLECTION: &'static str = "match_requests";
    const KIND: &'static str = "Match request";

    fn key(&self) -> u128 {
        self.id.as_u128()
    }
}

impl Document for ProjectPosting {
    const COLLECTION: &'static str = "projects";
    const KIND: &'static str = "Project";

    fn key(&self) -> u128 {
        self.id.as_u128()
    }
}

/// Every collection a store must be able to open.
pub const COLLECTIONS: [&str; 5] = [
    User::COLLECTION,
    College::COLLECTION,
    Event::COLLECTION,
    MatchRequest::COLLECTION,
    ProjectPosting::COLLECTION,
];

// =============================================================================
// STORE TRAIT
// =============================================================================

pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `DuplicateKey` on a unique conflict.
    fn insert<D: Document>(&self, doc: D, now: DateTime<Utc>) -> Result<D, PortalError>;

    fn get<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError>;

    /// Look a document up by one of its unique keys.
    fn find_unique<D: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<D>, PortalError>;

    /// All documents of a kind, in key order.
    fn list<D: Document>(&self) -> Result<Vec<D>, PortalError>;

    fn count<D: Document>(&self) -> Result<usize, PortalError>;

    /// Atomic read-modify-write.
    ///
    /// `f` receives the current document; if it returns `Ok`, the document is
    /// passed through before-persist and written. If it returns `Err`, nothing
    /// is written. Fails with `NotFound` when the key is absent.
    ///
    /// `clock` is read once the write lock or transaction is held, so the
    /// before-persist instant is never older than the state it is applied to.
    fn update<D, T, F>(&self, key: u128, clock: &dyn Clock, f: F) -> Result<(D, T), PortalError>
    where
        D: Document,
        F: FnOnce(&mut D) -> Result<T, PortalError>;

    /// Remove a document, returning it if it existed.
    fn delete<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError>;
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

pub(crate) fn encode<D: Document>(doc: &D) -> Result<Vec<u8>, PortalError> {
    postcard::to_allocvec(doc).map_err(|e| PortalError::Serialization(e.to_string()))
}

pub(crate) fn decode<D: Document>(bytes: &[u8]) -> Result<D, PortalError> {
    postcard::from_bytes(bytes).map_err(|e| PortalError::Serialization(e.to_string()))
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> PortalError {
    PortalError::Storage(e.to_string())
}

pub(crate) fn not_found<D: Document>(key: u128) -> PortalError {
    PortalError::not_found(D::KIND, uuid::Uuid::from_u128(key))
}

/// Index entries a write must drop and add, given the previous version.
pub(crate) struct IndexDiff {
    pub removed: Vec<String>,
    pub added: Vec<(String, UniqueKey)>,
}

pub(crate) fn index_diff<D: Document>(old: Option<&D>, new: Option<&D>) -> IndexDiff {
    let old_keys = old.map(Document::unique_keys).unwrap_or_default();
    let new_keys = new.map(Document::unique_keys).unwrap_or_default();

    let removed = old_keys
        .iter()
        .filter(|k| !new_keys.contains(k))
        .map(|k| k.index_key(D::COLLECTION))
        .collect();
    let added = new_keys
        .into_iter()
        .filter(|k| !old_keys.contains(k))
        .map(|k| (k.index_key(D::COLLECTION), k))
        .collect();

    IndexDiff { removed, added }
}

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend for a [`crate::Portal`].
#[derive(Debug)]
pub enum StorageBackend {
    /// Volatile map, for tests and throwaway servers.
    InMemory(MemoryStore),
    /// redb database on disk.
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Open (or create) a redb database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        RedbStore::open(path).map(Self::Persistent)
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

impl DocumentStore for StorageBackend {
    fn insert<D: Document>(&self, doc: D, now: DateTime<Utc>) -> Result<D, PortalError> {
        match self {
            Self::InMemory(s) => s.insert(doc, now),
            Self::Persistent(s) => s.insert(doc, now),
        }
    }

    fn get<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        match self {
            Self::InMemory(s) => s.get(key),
            Self::Persistent(s) => s.get(key),
        }
    }

    fn find_unique<D: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<D>, PortalError> {
        match self {
            Self::InMemory(s) => s.find_unique(field, value),
            Self::Persistent(s) => s.find_unique(field, value),
        }
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, PortalError> {
        match self {
            Self::InMemory(s) => s.list(),
            Self::Persistent(s) => s.list(),
        }
    }

    fn count<D: Document>(&self) -> Result<usize, PortalError> {
        match self {
            Self::InMemory(s) => s.count::<D>(),
            Self::Persistent(s) => s.count::<D>(),
        }
    }

    fn update<D, T, F>(&self, key: u128, clock: &dyn Clock, f: F) -> Result<(D, T), PortalError>
    where
        D: Document,
        F: FnOnce(&mut D) -> Result<T, PortalError>,
    {
        match self {
            Self::InMemory(s) => s.update(key, clock, f),
            Self::Persistent(s) => s.update(key, clock, f),
        }
    }

    fn delete<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        match self {
            Self::InMemory(s) => s.delete(key),
            Self::Persistent(s) => s.delete(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCollege;

    fn college(domain: &str) -> College {
        NewCollege {
            name: "Test College".to_string(),
            domain: domain.to_string(),
            ..NewCollege::default()
        }
        .into_college(Utc::now())
        .expect("valid college")
    }

    #[test]
    fn index_diff_only_reports_changed_keys() {
        let old = college("old.ac.in");
        let mut new = old.clone();
        new.domain = "new.ac.in".to_string();

        let diff = index_diff(Some(&old), Some(&new));
        assert_eq!(diff.removed, vec!["colleges/domain/old.ac.in".to_string()]);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].0, "colleges/domain/new.ac.in");

        let unchanged = index_diff(Some(&old), Some(&old));
        assert!(unchanged.removed.is_empty());
        assert!(unchanged.added.is_empty());
    }

    #[test]
    fn collections_are_distinct() {
        let mut names = COLLECTIONS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COLLECTIONS.len());
    }
}
