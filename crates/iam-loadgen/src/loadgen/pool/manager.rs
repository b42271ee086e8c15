//! Fixed-size pool of competing workers.
//!
//! This module defines the [`WorkerPool`] struct, which opens one connection
//! per worker through a [`Connector`] and spawns a [`Worker`] for each. All
//! workers pull from the same work channel and push into the same completion
//! channel. The pool only owns the handles needed to stop and join them.

use crate::loadgen::{config::WorkerConfig, pool::worker::Worker};
use core::time::Duration;
use iam_loadgen_core::{Completion, Connector, Result, WorkItem};
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Connects and starts `count` workers with ordinal ids `0..count`.
    ///
    /// # Errors
    ///
    /// Returns the connector's error for the first worker that cannot
    /// connect. Workers started before it are stopped and joined first.
    pub async fn spawn<C: Connector>(
        connector: &C,
        count: usize,
        work_rx: &async_channel::Receiver<WorkItem>,
        completion_tx: &mpsc::UnboundedSender<Completion>,
        config: &WorkerConfig,
    ) -> Result<Self> {
        let mut workers = Vec::with_capacity(count);

        for worker_id in 0..count {
            let client = match connector.connect(worker_id) {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Worker {worker_id} failed to connect: {e}");
                    if let Err(stop_err) = (Self { workers }).shutdown(None).await {
                        tracing::warn!("Cleanup after failed connect also failed: {stop_err}");
                    }
                    return Err(e);
                }
            };

            workers.push(Worker::start(
                worker_id,
                client,
                work_rx.clone(),
                completion_tx.clone(),
                config.clone(),
            ));
        }

        tracing::debug!("Started {count} workers");
        Ok(Self { workers })
    }

    /// Stops every worker and waits for all of them to exit.
    ///
    /// Stop is signalled to the whole pool before any join, so workers wind
    /// down concurrently. Each join is bounded by `timeout` when given.
    ///
    /// # Errors
    ///
    /// Every worker is joined regardless; the first failure is returned.
    pub async fn shutdown(self, timeout: Option<Duration>) -> Result<()> {
        tracing::info!("Stopping {} workers", self.workers.len());
        self.workers.iter().for_each(Worker::request_stop);

        let results =
            futures::future::join_all(self.workers.into_iter().map(|w| w.stop(timeout))).await;

        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                tracing::warn!("Worker shutdown failed: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::debug!("Worker pool shutdown complete");
                Ok(())
            }
        }
    }
}
