//! # Logging
//!
//! Diagnostics go through `tracing` and are written to stderr, keeping stdout
//! for the final run report. Verbosity follows `RUST_LOG` and defaults to
//! `info`:
//!
//! - `info`: run phases (dispatch, drain, shutdown).
//! - `debug`: per-burst progress and individual RPC failures.
//! - `trace`: worker start/stop and every completion.
//!
//! ```bash
//! RUST_LOG=debug iam-loadgen 10 100 8
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .compact(),
        )
        .try_init()?;

    Ok(())
}
