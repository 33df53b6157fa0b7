//! Patient record model
//!
//! The pseudonym mapping persisted by the store. The raw identifier never
//! leaves the store boundary; only the pseudonym appears in output file names
//! and redacted documents.

use serde::{Deserialize, Serialize};

/// A persisted pseudonym mapping for one patient.
///
/// Created on first sighting of a raw identifier. The pseudonym is immutable
/// for the lifetime of the store; `name` and `birth_period` follow a
/// fill-if-empty merge rule and are never overwritten once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Raw patient identifier (primary key, never exported outside the store)
    pub id: String,

    /// Hex-encoded SHA-256 digest of `id ++ seed`
    pub pseudonym: String,

    /// Patient name, empty until learned from an uploaded document
    #[serde(default)]
    pub name: String,

    /// Birth period at year/month granularity (`YYYY/MM`), empty until learned
    #[serde(default)]
    pub birth_period: String,
}

impl PatientRecord {
    /// Creates a record with no demographic data yet
    pub fn new(id: impl Into<String>, pseudonym: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pseudonym: pseudonym.into(),
            name: String::new(),
            birth_period: String::new(),
        }
    }
}

/// Best-effort demographic hints extracted from an uploaded document.
///
/// Either field may be empty when the document does not carry it; empty values
/// never participate in a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemographicHints {
    /// Patient name as written in the document
    pub name: String,

    /// Birth period at year/month granularity (`YYYY/MM`)
    pub birth_period: String,
}

impl DemographicHints {
    /// Whether there is nothing to merge
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.birth_period.is_empty()
    }
}
