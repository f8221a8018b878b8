//! # redb-backed Document Store
//!
//! One table per collection (`u128 -> postcard bytes`) plus a shared
//! `unique_index` table (`&str -> u128`).
//!
//! redb serializes write transactions, so [`DocumentStore::update`] holds the
//! single writer for the whole read-decide-write cycle. Readers see the last
//! committed snapshot and never block writers.

use super::{
    COLLECTIONS, Document, DocumentStore, IndexDiff, decode, encode, index_diff, index_key,
    not_found, storage_err,
};
use crate::clock::Clock;
use crate::types::PortalError;
use chrono::{DateTime, Utc};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
    WriteTransaction,
};
use std::path::{Path, PathBuf};

/// Table for unique keys: `<collection>/<field>/<value>` -> document key
const UNIQUE_INDEX: TableDefinition<&str, u128> = TableDefinition::new("unique_index");

fn collection(name: &str) -> TableDefinition<'_, u128, &'static [u8]> {
    TableDefinition::new(name)
}

/// A disk-backed document store using redb.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            for name in COLLECTIONS {
                let _ = write_txn.open_table(collection(name)).map_err(storage_err)?;
            }
            let _ = write_txn.open_table(UNIQUE_INDEX).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `body` inside one write transaction; commit on `Ok`, abort on `Err`.
    fn write<T>(
        &self,
        body: impl FnOnce(&WriteTransaction) -> Result<T, PortalError>,
    ) -> Result<T, PortalError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        match body(&write_txn) {
            Ok(value) => {
                write_txn.commit().map_err(storage_err)?;
                Ok(value)
            }
            Err(e) => {
                write_txn.abort().map_err(storage_err)?;
                Err(e)
            }
        }
    }

    fn reindex(
        index: &mut Table<'_, &'static str, u128>,
        diff: IndexDiff,
        key: u128,
    ) -> Result<(), PortalError> {
        for (entry, unique) in &diff.added {
            let owner = index
                .get(entry.as_str())
                .map_err(storage_err)?
                .map(|v| v.value());
            if owner.is_some_and(|owner| owner != key) {
                return Err(PortalError::DuplicateKey {
                    field: unique.field,
                    value: unique.value.clone(),
                });
            }
        }
        for entry in &diff.removed {
            index.remove(entry.as_str()).map_err(storage_err)?;
        }
        for (entry, _) in &diff.added {
            index.insert(entry.as_str(), key).map_err(storage_err)?;
        }
        Ok(())
    }
}

impl DocumentStore for RedbStore {
    fn insert<D: Document>(&self, mut doc: D, now: DateTime<Utc>) -> Result<D, PortalError> {
        doc.before_persist(now);
        let key = doc.key();
        let bytes = encode(&doc)?;

        self.write(|txn| {
            let mut index = txn.open_table(UNIQUE_INDEX).map_err(storage_err)?;
            Self::reindex(&mut index, index_diff::<D>(None, Some(&doc)), key)?;
            let mut table = txn.open_table(collection(D::COLLECTION)).map_err(storage_err)?;
            table.insert(key, bytes.as_slice()).map_err(storage_err)?;
            Ok(())
        })?;
        Ok(doc)
    }

    fn get<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn
            .open_table(collection(D::COLLECTION))
            .map_err(storage_err)?;
        match table.get(key).map_err(storage_err)? {
            Some(value) => decode(value.value()).map(Some),
            None => Ok(None),
        }
    }

    fn find_unique<D: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<D>, PortalError> {
        let key = {
            let read_txn = self.db.begin_read().map_err(storage_err)?;
            let index = read_txn.open_table(UNIQUE_INDEX).map_err(storage_err)?;
            let entry = index_key(D::COLLECTION, field, value);
            index
                .get(entry.as_str())
                .map_err(storage_err)?
                .map(|v| v.value())
        };
        match key {
            Some(key) => self.get(key),
            None => Ok(None),
        }
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, PortalError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn
            .open_table(collection(D::COLLECTION))
            .map_err(storage_err)?;

        let mut docs = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            docs.push(decode(value.value())?);
        }
        Ok(docs)
    }

    fn count<D: Document>(&self) -> Result<usize, PortalError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn
            .open_table(collection(D::COLLECTION))
            .map_err(storage_err)?;
        let len = table.len().map_err(storage_err)?;
        usize::try_from(len).map_err(storage_err)
    }

    fn update<D, T, F>(&self, key: u128, clock: &dyn Clock, f: F) -> Result<(D, T), PortalError>
    where
        D: Document,
        F: FnOnce(&mut D) -> Result<T, PortalError>,
    {
        self.write(|txn| {
            let mut table = txn.open_table(collection(D::COLLECTION)).map_err(storage_err)?;
            let current: D = match table.get(key).map_err(storage_err)? {
                Some(value) => decode(value.value())?,
                None => return Err(not_found::<D>(key)),
            };

            let mut next = current.clone();
            let output = f(&mut next)?;
            next.before_persist(clock.now());
            if next.key() != key {
                return Err(PortalError::Validation("Document id cannot change".to_string()));
            }

            let bytes = encode(&next)?;
            let mut index = txn.open_table(UNIQUE_INDEX).map_err(storage_err)?;
            Self::reindex(&mut index, index_diff(Some(&current), Some(&next)), key)?;
            table.insert(key, bytes.as_slice()).map_err(storage_err)?;
            Ok((next, output))
        })
    }

    fn delete<D: Document>(&self, key: u128) -> Result<Option<D>, PortalError> {
        self.write(|txn| {
            let mut table = txn.open_table(collection(D::COLLECTION)).map_err(storage_err)?;
            let removed: D = match table.remove(key).map_err(storage_err)? {
                Some(value) => decode(value.value())?,
                None => return Ok(None),
            };
            let mut index = txn.open_table(UNIQUE_INDEX).map_err(storage_err)?;
            Self::reindex(&mut index, index_diff(Some(&removed), None), key)?;
            Ok(Some(removed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::model::{College, NewCollege};
    use tempfile::tempdir;

    fn college(domain: &str) -> College {
        NewCollege {
            name: "IIT Bombay".to_string(),
            domain: domain.to_string(),
            ..NewCollege::default()
        }
        .into_college(Utc::now())
        .expect("valid college")
    }

    #[test]
    fn open_creates_empty_collections() {
        let dir = tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("portal.redb")).expect("open");
        assert_eq!(store.count::<College>().expect("count"), 0);
        assert!(store.list::<College>().expect("list").is_empty());
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("portal.redb");

        let id = {
            let store = RedbStore::open(&path).expect("open");
            store.insert(college("iitb.ac.in"), Utc::now()).expect("insert").id
        };

        let store = RedbStore::open(&path).expect("reopen");
        let fetched: College = store.get(id.as_u128()).expect("get").expect("present");
        assert_eq!(fetched.domain, "iitb.ac.in");
        let by_domain: Option<College> =
            store.find_unique("domain", "iitb.ac.in").expect("find");
        assert_eq!(by_domain.map(|c| c.id), Some(id));
    }

    #[test]
    fn duplicate_domain_is_rejected_and_rolled_back() {
        let dir = tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("portal.redb")).expect("open");
        store.insert(college("iitb.ac.in"), Utc::now()).expect("insert");

        let err = store
            .insert(college("iitb.ac.in"), Utc::now())
            .expect_err("duplicate");
        assert!(matches!(err, PortalError::DuplicateKey { field: "domain", .. }));
        assert_eq!(store.count::<College>().expect("count"), 1);
    }

    #[test]
    fn rejected_update_is_aborted() {
        let dir = tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("portal.redb")).expect("open");
        let c = store.insert(college("iitb.ac.in"), Utc::now()).expect("insert");

        let result: Result<(College, ()), _> = store.update(c.id.as_u128(), &SystemClock, |doc: &mut College| {
            doc.name = "Renamed".to_string();
            Err(PortalError::Validation("no".to_string()))
        });
        assert!(result.is_err());

        let stored: College = store.get(c.id.as_u128()).expect("get").expect("present");
        assert_eq!(stored.name, "IIT Bombay");
    }

    #[test]
    fn delete_returns_document_and_frees_domain() {
        let dir = tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("portal.redb")).expect("open");
        let c = store.insert(college("iitb.ac.in"), Utc::now()).expect("insert");

        let removed: Option<College> = store.delete(c.id.as_u128()).expect("delete");
        assert_eq!(removed.map(|r| r.id), Some(c.id));
        assert_eq!(store.count::<College>().expect("count"), 0);
        store.insert(college("iitb.ac.in"), Utc::now()).expect("domain is free");
    }
}
