#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

/// Messages and the `iam.IamService` client generated from `proto/iam.proto`.
pub mod proto {
    tonic::include_proto!("iam");
}

// Public re-export so downstream crates share the exact `tonic` build used by
// the generated client, e.g. `iam_loadgen_core::tonic::async_trait`.
pub use tonic;
