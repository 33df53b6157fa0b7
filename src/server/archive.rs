//! In-memory ZIP handling
//!
//! Batches arrive and leave the ingest session as ZIP archives held entirely
//! in memory. The container format itself is a primitive here: unpacking
//! yields [`RawFile`]s in the archive's listing order, and the builder
//! appends redacted files in the order they are produced.

use crate::domain::{CardiomaskError, RawFile, Result};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Unpacks a ZIP archive into its files, in listing order.
///
/// Directory entries are ignored. An entry that cannot be opened or read is
/// logged and skipped; only a corrupt central directory fails the whole
/// batch.
pub fn unpack(bytes: &[u8]) -> Result<Vec<RawFile>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CardiomaskError::Io(format!("failed to read ZIP archive: {e}")))?;

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable ZIP entry");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_end(&mut content) {
            tracing::warn!(entry = %entry.name(), error = %e, "Skipping unreadable ZIP entry");
            continue;
        }
        files.push(RawFile::new(entry.name(), content));
    }
    Ok(files)
}

/// Accumulates output files into a growing in-memory ZIP archive.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveBuilder {
    /// Creates an empty archive
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Appends one file, preserving insertion order
    pub fn append(&mut self, file: &RawFile) -> Result<()> {
        self.writer
            .start_file(file.name.as_str(), FileOptions::default())
            .map_err(|e| CardiomaskError::Io(format!("failed to create ZIP entry: {e}")))?;
        self.writer
            .write_all(&file.content)
            .map_err(|e| CardiomaskError::Io(format!("failed to write ZIP entry: {e}")))?;
        self.entries += 1;
        Ok(())
    }

    /// Number of appended entries
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Seals the archive and returns its bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| CardiomaskError::Io(format!("failed to seal ZIP archive: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_unpack_preserves_order() {
        let mut builder = ArchiveBuilder::new();
        builder.append(&RawFile::new("b.mwf", vec![1, 2])).unwrap();
        builder.append(&RawFile::new("a.xml", vec![3])).unwrap();
        assert_eq!(builder.entries(), 2);

        let bytes = builder.finish().unwrap();
        let files = unpack(&bytes).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], RawFile::new("b.mwf", vec![1, 2]));
        assert_eq!(files[1], RawFile::new("a.xml", vec![3]));
    }

    #[test]
    fn test_unpack_empty_archive() {
        let bytes = ArchiveBuilder::new().finish().unwrap();
        assert!(unpack(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let err = unpack(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, CardiomaskError::Io(_)));
    }
}
