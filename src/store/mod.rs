//! Pseudonym store
//!
//! The only component touching persistent storage. Maps raw patient
//! identifiers to stable pseudonyms and opportunistically accumulates
//! non-identifying demographic metadata with fill-if-empty merge semantics.
//!
//! The SQLite connection is opened once at startup and shared behind a mutex;
//! the mutex serializes every per-identifier read-modify-write, which is what
//! guarantees first-write-wins when concurrent sessions upload files for the
//! same patient.

pub mod csv;

use crate::domain::{DemographicHints, PatientRecord, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Durable identifier-to-pseudonym mapping.
///
/// Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct PseudonymStore {
    conn: Arc<Mutex<Connection>>,
}

impl PseudonymStore {
    /// Opens (creating if necessary) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a transient in-memory store. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS patients(
                id           TEXT PRIMARY KEY,
                pseudonym    TEXT NOT NULL,
                name         TEXT NOT NULL DEFAULT '',
                birth_period TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoned mutex means a panic mid-statement; the connection itself
        // is still usable for independent statements.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the stable pseudonym for a raw identifier.
    ///
    /// An existing record wins unconditionally; the seed only matters the
    /// first time an identifier is seen, when the pseudonym is derived as
    /// `hex(sha256(id ++ seed))` and persisted.
    ///
    /// # Errors
    ///
    /// Fails only on storage I/O errors.
    pub fn resolve_pseudonym(&self, id: &str, seed: &str) -> Result<String> {
        let conn = self.lock();

        let existing: Option<String> = conn
            .query_row(
                "SELECT pseudonym FROM patients WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(pseudonym) = existing {
            return Ok(pseudonym);
        }

        let pseudonym = derive_pseudonym(id, seed);
        conn.execute(
            "INSERT INTO patients (id, pseudonym) VALUES (?1, ?2)",
            [id, pseudonym.as_str()],
        )?;
        Ok(pseudonym)
    }

    /// Merges demographic hints into an existing record.
    ///
    /// Best-effort and idempotent: each column is set only if it is currently
    /// empty and the supplied value is non-empty. A missing record is a no-op;
    /// the record is expected to exist from [`resolve_pseudonym`](Self::resolve_pseudonym).
    pub fn merge_demographics(&self, id: &str, hints: &DemographicHints) -> Result<()> {
        if hints.is_empty() {
            return Ok(());
        }

        let conn = self.lock();
        conn.execute(
            "UPDATE patients SET
                name = CASE WHEN name = '' AND ?2 <> '' THEN ?2 ELSE name END,
                birth_period = CASE WHEN birth_period = '' AND ?3 <> '' THEN ?3 ELSE birth_period END
             WHERE id = ?1",
            [id, hints.name.as_str(), hints.birth_period.as_str()],
        )?;
        Ok(())
    }

    /// Deletes every record. Administrative reset, not part of the upload
    /// hot path. Returns the number of deleted records.
    pub fn clear_all(&self) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM patients", [])?;
        tx.commit()?;
        Ok(deleted)
    }

    /// Snapshot of all records, ordered by identifier.
    pub fn export_all(&self) -> Result<Vec<PatientRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, pseudonym, name, birth_period FROM patients ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PatientRecord {
                id: row.get(0)?,
                pseudonym: row.get(1)?,
                name: row.get(2)?,
                birth_period: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}

/// Derives the hex-encoded SHA-256 pseudonym for an identifier/seed pair.
pub fn derive_pseudonym(id: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(seed.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pseudonym_is_deterministic() {
        let store = PseudonymStore::open_in_memory().unwrap();
        let first = store.resolve_pseudonym("P001", "secret").unwrap();
        let second = store.resolve_pseudonym("P001", "secret").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, derive_pseudonym("P001", "secret"));
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_resolve_pseudonym_first_write_wins() {
        let store = PseudonymStore::open_in_memory().unwrap();
        let first = store.resolve_pseudonym("P001", "seed-one").unwrap();
        let second = store.resolve_pseudonym("P001", "seed-two").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_pseudonym_differs_per_id() {
        let store = PseudonymStore::open_in_memory().unwrap();
        let a = store.resolve_pseudonym("P001", "secret").unwrap();
        let b = store.resolve_pseudonym("P002", "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_merge_demographics_fill_if_empty() {
        let store = PseudonymStore::open_in_memory().unwrap();
        store.resolve_pseudonym("P001", "secret").unwrap();

        let hints = DemographicHints {
            name: "Alice".to_string(),
            birth_period: "2020/01".to_string(),
        };
        store.merge_demographics("P001", &hints).unwrap();

        // Neither an empty value nor a different non-empty value overwrites.
        let later = DemographicHints {
            name: String::new(),
            birth_period: "2020/02".to_string(),
        };
        store.merge_demographics("P001", &later).unwrap();

        let records = store.export_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[0].birth_period, "2020/01");
    }

    #[test]
    fn test_merge_demographics_missing_record_is_noop() {
        let store = PseudonymStore::open_in_memory().unwrap();
        let hints = DemographicHints {
            name: "Alice".to_string(),
            birth_period: String::new(),
        };
        store.merge_demographics("ghost", &hints).unwrap();
        assert!(store.export_all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let store = PseudonymStore::open_in_memory().unwrap();
        store.resolve_pseudonym("P001", "secret").unwrap();
        store.resolve_pseudonym("P002", "secret").unwrap();
        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.export_all().unwrap().is_empty());
    }

    #[test]
    fn test_export_all_is_ordered() {
        let store = PseudonymStore::open_in_memory().unwrap();
        store.resolve_pseudonym("P002", "secret").unwrap();
        store.resolve_pseudonym("P001", "secret").unwrap();
        let ids: Vec<String> = store
            .export_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["P001", "P002"]);
    }

    #[test]
    fn test_open_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.db");

        let store = PseudonymStore::open(&path).unwrap();
        let pseudonym = store.resolve_pseudonym("P001", "secret").unwrap();
        drop(store);

        let reopened = PseudonymStore::open(&path).unwrap();
        assert_eq!(
            reopened.resolve_pseudonym("P001", "other").unwrap(),
            pseudonym
        );
    }
}
