//! In-process stand-ins for the IAM service used by unit tests.

use core::time::Duration;
use iam_loadgen_core::{
    Connector, Error, PermissionClient, Result, WorkItem, proto::CreatePermissionResponse,
    tonic::Status,
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// How every stubbed `createPermission` call behaves.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Succeeds after the delay, or fails once the call timeout is reached.
    Delay(Duration),
}

/// Calls observed across all clients of one connector.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<AtomicUsize>,
    object_auis: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn object_auis(&self) -> Vec<String> {
        self.object_auis.lock().clone()
    }
}

#[derive(Debug)]
pub struct StubClient {
    behavior: Behavior,
    log: CallLog,
}

impl StubClient {
    pub fn new(behavior: Behavior) -> (Self, CallLog) {
        let log = CallLog::default();
        let client = Self {
            behavior,
            log: log.clone(),
        };
        (client, log)
    }
}

#[iam_loadgen_core::tonic::async_trait]
impl PermissionClient for StubClient {
    async fn create_permission(
        &mut self,
        item: &WorkItem,
        timeout: Duration,
    ) -> Result<CreatePermissionResponse> {
        self.log.calls.fetch_add(1, Ordering::SeqCst);
        self.log.object_auis.lock().push(item.object_aui().to_owned());

        match self.behavior {
            Behavior::Succeed => {}
            Behavior::Fail => return Err(Status::unavailable("stubbed failure").into()),
            Behavior::Delay(delay) if delay > timeout => {
                tokio::time::sleep(timeout).await;
                return Err(Status::deadline_exceeded("stubbed timeout").into());
            }
            Behavior::Delay(delay) => tokio::time::sleep(delay).await,
        }

        Ok(CreatePermissionResponse {
            permission_aui: format!("aui:iam:permission/{}", item.object_aui()),
        })
    }
}

/// Hands every worker a [`StubClient`] sharing one [`CallLog`].
#[derive(Debug, Clone)]
pub struct StubConnector {
    behavior: Behavior,
    log: CallLog,
    connected: Arc<AtomicUsize>,
    refuse_from: Option<usize>,
}

impl StubConnector {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            log: CallLog::default(),
            connected: Arc::default(),
            refuse_from: None,
        }
    }

    /// Fails `connect` for every worker id at or above `worker_id`.
    pub fn refusing_from(mut self, worker_id: usize) -> Self {
        self.refuse_from = Some(worker_id);
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Connector for StubConnector {
    type Client = StubClient;

    fn connect(&self, worker_id: usize) -> Result<Self::Client> {
        if self.refuse_from.is_some_and(|limit| worker_id >= limit) {
            return Err(Error::ChannelError {
                context: format!("stub refused worker {worker_id}"),
            });
        }
        self.connected.fetch_add(1, Ordering::SeqCst);
        Ok(StubClient {
            behavior: self.behavior,
            log: self.log.clone(),
        })
    }
}
