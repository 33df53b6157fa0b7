//! Streaming ingest session
//!
//! One websocket connection carries one de-identification session:
//!
//! 1. **Authenticating**: the first message must be JSON credentials
//!    `{"seed": ..., "seedConfirmation": ...}`; a mismatch aborts the session
//!    before any file is accepted. A match is acknowledged with the literal
//!    text `"ok"`.
//! 2. **Streaming**: the client pushes any number of ZIP batches as binary
//!    messages. A receiver task decodes each batch and hands it, in receipt
//!    order, to the processor over a bounded channel; the processor redacts
//!    every file and appends the results to the outbound archive. Receiving
//!    batch N+1 overlaps processing of batch N.
//! 3. **Finalizing**: after the client sends the `"end"` sentinel (or the
//!    connection drops), the processor drains the channel, the archive is
//!    sealed, and the server replies with one metadata message followed by
//!    the archive bytes.
//!
//! Per-file failures never abort a session; the offending file is logged and
//! left out of the output.

use crate::domain::{CardiomaskError, RawFile, Result};
use crate::redaction::{FileDispatcher, Outcome};
use crate::server::archive::{self, ArchiveBuilder};
use axum::extract::ws::{Message, WebSocket};
use chrono::Local;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Acknowledgment sent after successful authentication.
const ACK: &str = "ok";

/// Inbound text sentinel signalling end-of-stream.
const END_SENTINEL: &str = "end";

/// Content type reported in the final metadata message.
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Batches buffered between the receiver and the processor before the
/// receiver back-pressures on the socket.
const BATCH_QUEUE_DEPTH: usize = 8;

/// First inbound message of a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    seed: String,
    seed_confirmation: String,
}

/// Metadata sent ahead of the final archive bytes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveMetadata {
    file_name: String,
    file_type: String,
}

/// Runs one ingest session over an upgraded websocket.
///
/// Always consumes the socket; errors after authentication are logged rather
/// than surfaced, since the client has no mid-session error channel.
pub async fn run_session(mut socket: WebSocket, dispatcher: FileDispatcher) {
    let seed = match authenticate(&mut socket).await {
        Ok(seed) => seed,
        Err(e) => {
            tracing::warn!(error = %e, "Session aborted during authentication");
            let _ = socket.send(Message::Text(e.to_string())).await;
            let _ = socket.close().await;
            return;
        }
    };

    if let Err(e) = socket.send(Message::Text(ACK.to_string())).await {
        tracing::warn!(error = %e, "Failed to acknowledge authentication");
        return;
    }

    let (sender, receiver) = socket.split();
    let (batch_tx, batch_rx) = mpsc::channel(BATCH_QUEUE_DEPTH);

    // The receiver owns queue closure: dropping the sender ends the
    // processor's drain loop.
    let receiver_task = tokio::spawn(receive_batches(receiver, batch_tx));
    let archive = process_batches(batch_rx, dispatcher, seed).await;

    if let Err(e) = receiver_task.await {
        tracing::error!(error = %e, "Receiver task panicked");
    }

    match archive {
        Ok(archive) => {
            if let Err(e) = finalize(sender, archive).await {
                tracing::warn!(error = %e, "Failed to deliver output archive");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to seal output archive"),
    }
}

/// Reads and checks the credentials message.
async fn authenticate(socket: &mut WebSocket) -> Result<String> {
    let message = socket
        .recv()
        .await
        .ok_or_else(|| CardiomaskError::Io("connection closed before credentials".to_string()))?
        .map_err(|e| CardiomaskError::Io(e.to_string()))?;

    let Message::Text(text) = message else {
        return Err(CardiomaskError::Auth(
            "expected a credentials message".to_string(),
        ));
    };

    let credentials: Credentials = serde_json::from_str(&text)
        .map_err(|e| CardiomaskError::Auth(format!("malformed credentials: {e}")))?;

    if credentials.seed != credentials.seed_confirmation {
        return Err(CardiomaskError::Auth(
            "seed and confirmation do not match".to_string(),
        ));
    }

    Ok(credentials.seed)
}

/// Receiver half: decodes inbound binary messages into batches and forwards
/// them in receipt order until the sentinel, a read failure, or closure.
async fn receive_batches(
    mut receiver: SplitStream<WebSocket>,
    batches: mpsc::Sender<Vec<RawFile>>,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Binary(bytes)) => {
                let batch = match archive::unpack(&bytes) {
                    Ok(batch) => batch,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable batch");
                        continue;
                    }
                };
                tracing::debug!(files = batch.len(), "Received batch");
                if batches.send(batch).await.is_err() {
                    // Processor is gone; nothing left to feed.
                    break;
                }
            }
            Ok(Message::Text(text)) if text == END_SENTINEL => break,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                // An abrupt disconnect is just an early end-of-stream.
                tracing::debug!(error = %e, "Socket read ended");
                break;
            }
        }
    }
}

/// Processor half: drains batches in order and accumulates redacted files
/// into the session archive.
///
/// Exposed separately from the socket plumbing so the pipeline can be driven
/// directly in tests.
pub async fn process_batches(
    mut batches: mpsc::Receiver<Vec<RawFile>>,
    dispatcher: FileDispatcher,
    seed: String,
) -> Result<Vec<u8>> {
    let mut builder = ArchiveBuilder::new();

    while let Some(batch) = batches.recv().await {
        for file in batch {
            match dispatcher.process(&file, &seed) {
                Ok(Outcome::Redacted(output)) => {
                    if let Err(e) = builder.append(&output) {
                        tracing::error!(file = %output.name, error = %e, "Failed to archive file");
                    }
                }
                Ok(Outcome::Skipped) => {}
                Err(e) => {
                    tracing::warn!(file = %file.name, error = %e, "Skipping file");
                }
            }
        }
    }

    tracing::info!(entries = builder.entries(), "Session processing complete");
    builder.finish()
}

/// Sends the metadata message and the sealed archive, then closes.
async fn finalize(mut sender: SplitSink<WebSocket, Message>, archive: Vec<u8>) -> Result<()> {
    let metadata = ArchiveMetadata {
        file_name: format!("{}.zip", Local::now().format("%Y-%m-%d_%H-%M-%S")),
        file_type: ZIP_CONTENT_TYPE.to_string(),
    };

    sender
        .send(Message::Text(serde_json::to_string(&metadata)?))
        .await
        .map_err(|e| CardiomaskError::Io(e.to_string()))?;
    sender
        .send(Message::Binary(archive))
        .await
        .map_err(|e| CardiomaskError::Io(e.to_string()))?;
    let _ = sender.close().await;
    Ok(())
}
