//! Types shared between the load generator's driver and its workers.
//!
//! ## Submodules
//!
//! - [`error`] - Crate-wide error type and `Result` alias.
//! - [`types`] - [`WorkItem`], [`Completion`], and the synthetic AUI
//!   constants.
//! - [`client`] - The [`Connector`] / [`PermissionClient`] seam and its gRPC
//!   implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Connector, GrpcConnector, GrpcPermissionClient, PermissionClient};
pub use error::{Error, Result};
pub use types::{Completion, Outcome, WorkItem};
