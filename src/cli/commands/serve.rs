//! Serve command implementation
//!
//! Runs the de-identification server until a shutdown signal arrives.

use crate::config::CardiomaskConfig;
use crate::server;
use crate::store::PseudonymStore;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config: &CardiomaskConfig,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let store = PseudonymStore::open(&config.database.path)?;
        tracing::info!(path = %config.database.path, "Pseudonym store ready");

        server::serve(config, store, shutdown).await?;

        tracing::info!("Server stopped");
        Ok(0)
    }
}
