//! Error types for the IAM load generator.
//!
//! This module defines the central `Error` enum shared by the driver, the
//! worker pool, and the RPC client seam.
//!
//! ## Error Cases
//! - `InvalidConfig`: Startup configuration was rejected.
//! - `InvalidRequest`: A work item was built from an empty identifier.
//! - `ChannelError`: The work or completion channel closed unexpectedly.
//! - `Transport`: The gRPC endpoint could not be constructed.
//! - `Rpc`: A `createPermission` call failed or timed out.
//! - `WorkerPanicked` / `ShutdownTimeout`: A worker could not be joined.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the load generator.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration failed validation before any work began.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A work item could not be constructed.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Internal channel send/receive failure (e.g., all receivers dropped).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The gRPC endpoint was malformed.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The remote call returned a non-OK status or exceeded its deadline.
    #[error("RPC failed: {0}")]
    Rpc(#[from] Status),

    /// A worker task panicked before acknowledging shutdown.
    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    /// A worker did not exit within the configured shutdown timeout.
    #[error("Worker {worker_id} did not stop in time")]
    ShutdownTimeout { worker_id: usize },
}

impl Error {
    /// Shorthand for [`Error::InvalidConfig`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
