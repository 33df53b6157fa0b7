//! File dispatch
//!
//! Routes an uploaded file to the right redactor by extension, swaps the raw
//! identifier in its name for the stored pseudonym, and feeds demographic
//! hints from CDA documents into the store along the way.
//!
//! Upload names follow `{identifier}_{date}.{ext}`; outputs are renamed to
//! `{pseudonym}_{date}.{ext}`.

use crate::domain::{CardiomaskError, RawFile, Result};
use crate::redaction::{cda, mfer};
use crate::store::PseudonymStore;

/// Recognized file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// MFER binary waveform container
    Mfer,
    /// HL7 CDA XML document
    Cda,
}

impl FileKind {
    /// Classifies a file by its extension, case-insensitively.
    ///
    /// Returns `None` for unrecognized extensions; those files are skipped,
    /// not rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "mwf" => Some(FileKind::Mfer),
            "xml" => Some(FileKind::Cda),
            _ => None,
        }
    }

    /// Canonical lowercase extension, with the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Mfer => ".mwf",
            FileKind::Cda => ".xml",
        }
    }
}

/// Result of dispatching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file was redacted and renamed
    Redacted(RawFile),
    /// The file is not a recognized format and was left out of the output
    Skipped,
}

/// Routes files through classification, pseudonym resolution, and redaction.
#[derive(Clone)]
pub struct FileDispatcher {
    store: PseudonymStore,
}

impl FileDispatcher {
    /// Creates a dispatcher over the shared pseudonym store
    pub fn new(store: PseudonymStore) -> Self {
        Self { store }
    }

    /// De-identifies a single file.
    ///
    /// Unrecognized extensions yield [`Outcome::Skipped`]. A filename that
    /// does not match `{identifier}_{date}.{ext}` is a
    /// [`CardiomaskError::Format`]; redactor and store failures propagate
    /// as their own error kinds. All of these are file-scoped: the caller
    /// logs, skips the file, and continues its batch.
    pub fn process(&self, file: &RawFile, seed: &str) -> Result<Outcome> {
        let Some(kind) = FileKind::from_name(&file.name) else {
            tracing::debug!(file = %file.name, "Skipping unrecognized file type");
            return Ok(Outcome::Skipped);
        };

        let (identifier, date) = parse_file_name(&file.name)?;
        let pseudonym = self.store.resolve_pseudonym(identifier, seed)?;

        if kind == FileKind::Cda {
            let hints = cda::extract_demographics(&file.content);
            if !hints.is_empty() {
                // Demographics are opportunistic; losing them never costs
                // the file.
                if let Err(e) = self.store.merge_demographics(identifier, &hints) {
                    tracing::warn!(error = %e, file = %file.name, "Failed to merge demographics");
                }
            }
        }

        let content = match kind {
            FileKind::Mfer => mfer::redact(&file.content)?,
            FileKind::Cda => cda::redact(&file.content)?,
        };

        Ok(Outcome::Redacted(RawFile::new(
            format!("{pseudonym}_{date}{}", kind.extension()),
            content,
        )))
    }
}

/// Splits a file name into its identifier and date components.
///
/// The stem before the extension must be exactly two `_`-separated parts.
fn parse_file_name(name: &str) -> Result<(&str, &str)> {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    };

    let mut parts = stem.split('_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(identifier), Some(date), None) => Ok((identifier, date)),
        _ => Err(CardiomaskError::Format(format!(
            "expected {{identifier}}_{{date}} before the extension, got {name:?}"
        ))),
    }
}
