//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Cardiomask using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cardiomask - ECG de-identification service
#[derive(Parser, Debug)]
#[command(name = "cardiomask")]
#[command(version, about, long_about = None)]
#[command(author = "Cardiomask Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cardiomask.toml", env = "CARDIOMASK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CARDIOMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the de-identification server
    Serve(commands::serve::ServeArgs),

    /// Write a CSV snapshot of the pseudonym store to the export directory
    Export(commands::export::ExportArgs),

    /// Delete every record from the pseudonym store
    Clear(commands::clear::ClearArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
