use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use iam_loadgen_core::{Error, Result};

/// Command-line arguments for the `iam-loadgen` binary.
///
/// The three positionals describe the load shape. Everything else is
/// connection and timing tuning with defaults matching a local IAM
/// deployment, and can also be supplied through the environment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "iam-loadgen",
    version,
    about = "Rate-controlled createPermission load generator for the IAM gRPC service"
)]
pub struct CliArgs {
    /// Test duration in seconds.
    pub duration: f64,

    /// Permissions to create per second.
    pub items_per_second: u64,

    /// Number of worker connections issuing requests concurrently.
    pub worker_count: usize,

    /// IAM service endpoint.
    ///
    /// Environment variable: `IAM_SERVER_ADDR`
    #[arg(long, env = "IAM_SERVER_ADDR", default_value_t = String::from("http://localhost:9091"))]
    pub server_addr: String,

    /// Per-call deadline for `createPermission`, in seconds.
    ///
    /// Environment variable: `IAM_RPC_TIMEOUT_SECS`
    #[arg(long, env = "IAM_RPC_TIMEOUT_SECS", default_value_t = 10.0)]
    pub rpc_timeout_secs: f64,

    /// How long a worker waits on an empty queue before re-checking for stop.
    ///
    /// Environment variable: `IAM_POLL_INTERVAL_MS`
    #[arg(long, env = "IAM_POLL_INTERVAL_MS", default_value_t = 50)]
    pub poll_interval_ms: u64,

    /// Upper bound on joining each worker at shutdown, in seconds. Unbounded
    /// when not set.
    ///
    /// Environment variable: `IAM_SHUTDOWN_TIMEOUT_SECS`
    #[arg(long, env = "IAM_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: Option<f64>,

    /// How bursts are spaced.
    ///
    /// Environment variable: `IAM_PACING`
    #[arg(long, env = "IAM_PACING", value_enum, default_value_t = Pacing::Naive)]
    pub pacing: Pacing,
}

/// Spacing between consecutive bursts.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Sleep one second after each burst. Enqueue time is not compensated,
    /// so the achieved rate drifts below the target as bursts grow.
    #[default]
    Naive,
    /// Fire burst `k` at `start + k` seconds on a monotonic tick.
    Scheduled,
}

/// Settings forwarded to every worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub rpc_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub duration: Duration,
    pub items_per_second: u64,
    pub worker_count: usize,
    pub pacing: Pacing,
    pub shutdown_timeout: Option<Duration>,
    pub server_addr: String,
    pub worker: WorkerConfig,
}

impl LoadConfig {
    /// Checks the invariants the driver relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if there would be no worker to drain
    /// the queue, or if the run or poll interval is empty.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::config("worker_count must be greater than 0"));
        }
        if self.duration.is_zero() {
            return Err(Error::config("duration must be greater than 0"));
        }
        if self.worker.poll_interval.is_zero() {
            return Err(Error::config("poll_interval must be greater than 0"));
        }
        if self.worker.rpc_timeout.is_zero() {
            return Err(Error::config("rpc_timeout must be greater than 0"));
        }
        Ok(())
    }
}

impl TryFrom<CliArgs> for LoadConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> anyhow::Result<Self> {
        let shutdown_timeout = args
            .shutdown_timeout_secs
            .map(|secs| seconds("shutdown_timeout_secs", secs))
            .transpose()?;

        let config = Self {
            duration: seconds("duration", args.duration)?,
            items_per_second: args.items_per_second,
            worker_count: args.worker_count,
            pacing: args.pacing,
            shutdown_timeout,
            server_addr: args.server_addr,
            worker: WorkerConfig {
                rpc_timeout: seconds("rpc_timeout_secs", args.rpc_timeout_secs)?,
                poll_interval: Duration::from_millis(args.poll_interval_ms),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Converts a CLI seconds value, rejecting NaN, negatives, and anything too
/// large for a [`Duration`].
fn seconds(name: &str, value: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| anyhow!("{name} must be a non-negative number of seconds (got {value}): {e}"))
}
