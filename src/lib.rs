// Cardiomask - ECG De-identification Service
// Copyright (c) 2025 Cardiomask Contributors
// Licensed under the MIT License

//! # Cardiomask - ECG De-identification Service
//!
//! Cardiomask de-identifies electrocardiogram record files before they leave
//! a clinical environment. It strips or pseudonymizes patient-identifying
//! fields from MFER binary waveform containers and HL7 CDA XML documents,
//! replaces the raw patient identifier with a deterministic pseudonym, and
//! returns the redacted files as a single ZIP archive.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Redacting** identity fields inside MFER TLV streams and CDA documents
//! - **Pseudonymizing** raw identifiers with a stable, seed-derived digest
//! - **Streaming** batches of files over one websocket session, with
//!   receiving and processing overlapped
//! - **Exporting** the pseudonym mapping as CSV snapshots for reporting
//!
//! ## Architecture
//!
//! Cardiomask follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`redaction`] - De-identification engine (MFER codec, CDA rewriter,
//!   file dispatch)
//! - [`store`] - Pseudonym store over SQLite
//! - [`server`] - HTTP/websocket surface and the ingest session pipeline
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardiomask::redaction::{FileDispatcher, Outcome};
//! use cardiomask::domain::RawFile;
//! use cardiomask::store::PseudonymStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open the shared pseudonym store
//!     let store = PseudonymStore::open("patients.db")?;
//!
//!     // De-identify one file
//!     let dispatcher = FileDispatcher::new(store);
//!     let file = RawFile::new("P001_20230101.mwf", std::fs::read("P001_20230101.mwf")?);
//!     match dispatcher.process(&file, "secret")? {
//!         Outcome::Redacted(output) => std::fs::write(&output.name, &output.content)?,
//!         Outcome::Skipped => println!("not an ECG record"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Cardiomask uses the [`domain::CardiomaskError`] type for all errors:
//!
//! ```rust,no_run
//! use cardiomask::domain::CardiomaskError;
//!
//! fn example() -> Result<(), CardiomaskError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = cardiomask::config::CardiomaskConfig::from_file("cardiomask.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Cardiomask uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting session");
//! warn!(file = "P001_20230101.mwf", "Skipping file");
//! error!(error = "storage failure", "Session failed");
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod redaction;
pub mod server;
pub mod store;
