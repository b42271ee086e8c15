//! The RPC seam between workers and the IAM service.
//!
//! Workers never talk to tonic directly. Each one owns a
//! [`PermissionClient`] handed out by a [`Connector`], which lets the load
//! generator run against the real service ([`GrpcConnector`]) or an
//! in-process stub in tests.

use crate::{
    Result, WorkItem,
    proto::{CreatePermissionRequest, CreatePermissionResponse, iam_service_client::IamServiceClient},
};
use core::time::Duration;
use tonic::{
    Request, Status,
    transport::{Channel, Endpoint},
};

/// A single connection capable of issuing `createPermission` calls.
#[tonic::async_trait]
pub trait PermissionClient: Send + 'static {
    /// Issues one `createPermission` call, failing if it does not finish
    /// within `timeout`.
    async fn create_permission(
        &mut self,
        item: &WorkItem,
        timeout: Duration,
    ) -> Result<CreatePermissionResponse>;
}

/// Opens one [`PermissionClient`] per worker.
pub trait Connector: Send + Sync + 'static {
    type Client: PermissionClient;

    /// Opens the connection owned by worker `worker_id`.
    fn connect(&self, worker_id: usize) -> Result<Self::Client>;
}

/// Connects workers to a gRPC endpoint.
///
/// Connections are established lazily on the first call, so an unreachable
/// server shows up as per-call failures rather than a startup error.
#[derive(Debug, Clone)]
pub struct GrpcConnector {
    endpoint: Endpoint,
}

impl GrpcConnector {
    /// Parses `addr` (e.g. `http://localhost:9091`) into an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if `addr` is not a valid URI.
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let endpoint = Endpoint::from_shared(addr.into())?.connect_timeout(connect_timeout);
        Ok(Self { endpoint })
    }
}

impl Connector for GrpcConnector {
    type Client = GrpcPermissionClient;

    fn connect(&self, _worker_id: usize) -> Result<Self::Client> {
        Ok(GrpcPermissionClient::new(self.endpoint.connect_lazy()))
    }
}

/// [`PermissionClient`] backed by a dedicated tonic [`Channel`].
#[derive(Debug, Clone)]
pub struct GrpcPermissionClient {
    inner: IamServiceClient<Channel>,
}

impl GrpcPermissionClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: IamServiceClient::new(channel),
        }
    }
}

#[tonic::async_trait]
impl PermissionClient for GrpcPermissionClient {
    async fn create_permission(
        &mut self,
        item: &WorkItem,
        timeout: Duration,
    ) -> Result<CreatePermissionResponse> {
        let mut request = Request::new(CreatePermissionRequest::from(item));
        // Propagated to the server as `grpc-timeout`.
        request.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.inner.create_permission(request))
            .await
            .map_err(|_| {
                Status::deadline_exceeded(format!("createPermission exceeded {timeout:?}"))
            })??;

        Ok(response.into_inner())
    }
}
