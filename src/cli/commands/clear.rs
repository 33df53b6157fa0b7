//! Clear command implementation
//!
//! Administrative reset: deletes every record from the pseudonym store.
//! Pseudonyms derived after a clear will differ from earlier ones whenever a
//! different seed is used, so this is guarded behind an explicit flag.

use crate::config::load_config;
use crate::store::PseudonymStore;
use clap::Args;

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm deletion of all pseudonym records
    #[arg(long)]
    pub yes: bool,
}

impl ClearArgs {
    /// Execute the clear command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        if !self.yes {
            eprintln!("Refusing to clear the pseudonym store without --yes");
            return Ok(1);
        }

        let config = load_config(config_path)?;
        let store = PseudonymStore::open(&config.database.path)?;
        let deleted = store.clear_all()?;

        tracing::info!(deleted, "Pseudonym store cleared");
        println!("Deleted {deleted} records");
        Ok(0)
    }
}
