//! In-memory file model
//!
//! Files move through the system entirely in memory: they are extracted from
//! an uploaded ZIP batch, redacted, renamed, and appended to the outbound
//! archive without ever touching disk.

use serde::{Deserialize, Serialize};

/// An in-memory file: a name and its raw content.
///
/// Transient by design. A `RawFile` is created per upload and discarded once
/// its redacted counterpart has been written to the output archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    /// File name, including extension
    pub name: String,

    /// Raw file content
    pub content: Vec<u8>,
}

impl RawFile {
    /// Creates a new in-memory file
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Content size in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the file has no content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
