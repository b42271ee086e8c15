//! Load generation pipeline.
//!
//! - [`config`] - CLI arguments and the validated [`config::LoadConfig`].
//! - [`driver`] - Rate-shaped dispatch, the completion barrier, and shutdown.
//! - [`pool`] - Worker tasks and the fixed-size pool that owns them.
//! - [`report`] - The throughput summary printed at the end of a run.
//! - [`telemetry`] - `tracing` subscriber setup.

pub mod config;
pub mod driver;
pub mod pool;
pub mod report;
pub mod telemetry;

#[cfg(test)]
mod testing;
