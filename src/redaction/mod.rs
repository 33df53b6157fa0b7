//! Redaction module for Cardiomask
//!
//! This module provides the de-identification engine for ECG record files.
//! Two formats are understood: MFER binary waveform containers and HL7 CDA
//! XML documents.
//!
//! # Architecture
//!
//! The redaction pipeline consists of:
//! - **MFER codec**: TLV scan that removes identity-bearing binary fields
//! - **CDA rewriter**: streaming XML transform that blanks identity content
//! - **Dispatch**: per-file routing, pseudonym renaming, demographic capture
//!
//! # Usage
//!
//! ```rust,ignore
//! use cardiomask::redaction::{FileDispatcher, Outcome};
//! use cardiomask::store::PseudonymStore;
//!
//! let store = PseudonymStore::open("patients.db")?;
//! let dispatcher = FileDispatcher::new(store);
//! let outcome = dispatcher.process(&raw_file, seed)?;
//! ```

pub mod cda;
pub mod dispatcher;
pub mod mfer;

// Re-export main types
pub use dispatcher::{FileDispatcher, FileKind, Outcome};
