// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Background writer feeding an [`ArtifactStore`].
//!
//! Submissions are numbered. The writer task always picks up the newest one, so
//! anything submitted while a write is in flight collapses into a single follow-up
//! write. Each finished write (successful or not) publishes its number, which is
//! what [`CacheWriter::flush`] waits on.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::store::{ArtifactStore, PendingArtifact};

#[derive(Clone)]
struct Submission {
    generation: u64,
    artifact: Arc<PendingArtifact>,
}

/// Handle to the background cache writer.
pub struct CacheWriter {
    pending: watch::Sender<Option<Submission>>,
    settled: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl CacheWriter {
    /// Start the writer task on the current tokio runtime.
    pub fn spawn<S: ArtifactStore>(store: S) -> Self {
        let (pending, pending_rx) = watch::channel(None);
        let (settled_tx, settled) = watch::channel(0);
        let task = tokio::spawn(run(store, pending_rx, settled_tx));
        Self {
            pending,
            settled,
            task,
        }
    }

    /// Queue `artifact` for writing and return immediately.
    ///
    /// Returns the submission's generation number.
    pub fn submit(&self, artifact: PendingArtifact) -> u64 {
        let artifact = Arc::new(artifact);
        let mut generation = 0;
        // Numbering happens under the channel lock, so generations follow send order.
        self.pending.send_modify(|slot| {
            generation = slot.as_ref().map_or(0, |s| s.generation) + 1;
            *slot = Some(Submission {
                generation,
                artifact,
            });
        });
        generation
    }

    fn latest_generation(&self) -> u64 {
        self.pending
            .borrow()
            .as_ref()
            .map_or(0, |s| s.generation)
    }

    /// Wait until every submission made so far has settled.
    ///
    /// A write that failed counts as settled; the failure was already logged.
    pub async fn flush(&self) -> Result<()> {
        let target = self.latest_generation();
        let mut settled = self.settled.clone();
        settled
            .wait_for(|generation| *generation >= target)
            .await
            .map_err(|_| Error::WriterStopped)?;
        Ok(())
    }

    /// Flush outstanding writes and stop the task.
    pub async fn shutdown(self) -> Result<()> {
        self.flush().await?;
        let CacheWriter { pending, task, .. } = self;
        drop(pending);
        task.await?;
        Ok(())
    }
}

async fn run<S: ArtifactStore>(
    mut store: S,
    mut pending: watch::Receiver<Option<Submission>>,
    settled: watch::Sender<u64>,
) {
    while pending.changed().await.is_ok() {
        let latest = pending.borrow_and_update().clone();
        let Some(submission) = latest else {
            continue;
        };
        let generation = submission.generation;

        let joined = tokio::task::spawn_blocking(move || {
            let outcome = store.put(&submission.artifact);
            (store, outcome)
        })
        .await;

        match joined {
            Ok((returned, outcome)) => {
                store = returned;
                match outcome {
                    Ok(()) => debug!("Cache write {generation} settled"),
                    Err(e) => warn!("Failed to write cache: {e}"),
                }
                settled.send_replace(generation);
            }
            Err(e) => {
                // The store went down with the blocking task.
                warn!("Cache writer stopped: {e}");
                return;
            }
        }
    }
}
