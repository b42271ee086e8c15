//! Worker pool for issuing `createPermission` calls.
//!
//! - [`worker`] - A single worker task and its stop handle.
//! - [`manager`] - Spawning and joining the fixed-size pool.

pub mod manager;
pub mod worker;
