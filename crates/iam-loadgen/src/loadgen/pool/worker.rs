use crate::loadgen::config::WorkerConfig;
use core::time::Duration;
use iam_loadgen_core::{Completion, Error, Outcome, PermissionClient, Result, WorkItem};
use tokio::{sync::mpsc, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

/// Handle to a running worker task.
///
/// The task owns one [`PermissionClient`] and competes with the other
/// workers for items on the shared work channel. Dropping the handle detaches
/// the task; it then runs until the work channel closes.
#[derive(Debug)]
pub struct Worker {
    worker_id: usize,
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawns the receive loop for `worker_id` on the current runtime.
    pub fn start<C: PermissionClient>(
        worker_id: usize,
        client: C,
        work_rx: async_channel::Receiver<WorkItem>,
        completion_tx: mpsc::UnboundedSender<Completion>,
        config: WorkerConfig,
    ) -> Self {
        let stop = CancellationToken::new();
        let handle = tokio::spawn(worker_loop(
            worker_id,
            client,
            work_rx,
            completion_tx,
            config,
            stop.clone(),
        ));

        Self {
            worker_id,
            stop,
            handle,
        }
    }

    /// Asks the loop to exit without waiting for it.
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    /// Requests a stop and waits for the loop to exit.
    ///
    /// An RPC already in flight is allowed to finish and still reports its
    /// completion. No new RPC starts once the stop is requested.
    ///
    /// # Errors
    ///
    /// - [`Error::ShutdownTimeout`] if `timeout` elapses first. The task is
    ///   detached and exits after its in-flight call.
    /// - [`Error::WorkerPanicked`] if the task panicked.
    pub async fn stop(self, timeout: Option<Duration>) -> Result<()> {
        let worker_id = self.worker_id;
        self.stop.cancel();

        let joined = match timeout {
            Some(limit) => time::timeout(limit, self.handle)
                .await
                .map_err(|_| Error::ShutdownTimeout { worker_id })?,
            None => self.handle.await,
        };

        joined.map_err(|_| Error::WorkerPanicked { worker_id })
    }
}

/// Receive loop run by every worker task.
///
/// Each iteration waits up to `poll_interval` for an item, calls the service
/// with `rpc_timeout`, and sends exactly one [`Completion`] whatever the
/// result. The loop ends when `stop` is cancelled, when the work channel is
/// closed and drained, or when nobody listens for completions anymore.
///
/// The stop token is raced against the dequeue only. It is never raced
/// against the RPC itself.
pub async fn worker_loop<C: PermissionClient>(
    worker_id: usize,
    mut client: C,
    work_rx: async_channel::Receiver<WorkItem>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    config: WorkerConfig,
    stop: CancellationToken,
) {
    tracing::trace!("Worker {worker_id} started");

    while !stop.is_cancelled() {
        let item = tokio::select! {
            biased;
            () = stop.cancelled() => break,
            polled = time::timeout(config.poll_interval, work_rx.recv()) => match polled {
                Ok(Ok(item)) => item,
                Ok(Err(_)) => {
                    tracing::debug!("Worker {worker_id} found the work channel closed");
                    break;
                }
                Err(_) => continue,
            },
        };

        let outcome = match client.create_permission(&item, config.rpc_timeout).await {
            Ok(_) => Outcome::Succeeded,
            Err(e) => {
                tracing::debug!(
                    object_aui = item.object_aui(),
                    "Worker {worker_id} createPermission failed: {e}"
                );
                Outcome::Failed
            }
        };

        if completion_tx.send(Completion { worker_id, outcome }).is_err() {
            tracing::warn!("Worker {worker_id} has no completion listener, exiting");
            break;
        }
    }

    tracing::trace!("Worker {worker_id} stopped");
}
