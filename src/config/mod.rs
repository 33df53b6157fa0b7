//! Configuration management for Cardiomask.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Cardiomask uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`CARDIOMASK_*` prefix)
//! - Default values for optional settings
//! - Comprehensive validation
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [server]
//! bind_address = "0.0.0.0:8080"
//! allowed_origin = "http://localhost:3000"
//!
//! [database]
//! path = "${CARDIOMASK_DATA_DIR}/patients.db"
//!
//! [export]
//! output_dir = "exports"
//!
//! [logging]
//! local_enabled = true
//! local_path = "log"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used items
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CardiomaskConfig, DatabaseConfig, ExportConfig, LoggingConfig, ServerConfig,
};
