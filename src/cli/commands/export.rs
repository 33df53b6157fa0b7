//! Export command implementation
//!
//! Writes a CSV snapshot of the pseudonym store into the configured export
//! directory.

use crate::config::load_config;
use crate::store::{csv, PseudonymStore};
use clap::Args;
use std::path::Path;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory that receives the snapshot (defaults to export.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;
        let output_dir = self
            .output_dir
            .as_deref()
            .unwrap_or(&config.export.output_dir);

        let store = PseudonymStore::open(&config.database.path)?;
        let records = store.export_all()?;

        std::fs::create_dir_all(output_dir)?;
        let path = Path::new(output_dir).join(csv::snapshot_filename());
        std::fs::write(&path, csv::to_csv(&records))?;

        tracing::info!(records = records.len(), path = %path.display(), "Snapshot written");
        println!("Exported {} records to {}", records.len(), path.display());
        Ok(0)
    }
}
