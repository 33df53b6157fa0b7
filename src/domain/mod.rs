//! Domain models and types for Cardiomask.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **In-memory file model** ([`RawFile`])
//! - **Pseudonym mapping model** ([`PatientRecord`], [`DemographicHints`])
//! - **Error types** ([`CardiomaskError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CardiomaskError>`]:
//!
//! ```rust
//! use cardiomask::domain::{CardiomaskError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let redacted = cardiomask::redaction::mfer::redact(&[0x80])?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod file;
pub mod patient;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::CardiomaskError;
pub use file::RawFile;
pub use patient::{DemographicHints, PatientRecord};
pub use result::Result;
