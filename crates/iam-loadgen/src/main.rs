#![doc = include_str!("../README.md")]

mod loadgen;

use clap::Parser;
use iam_loadgen_core::GrpcConnector;
use loadgen::config::{CliArgs, LoadConfig};
use loadgen::driver;
use loadgen::telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = LoadConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let connector = GrpcConnector::new(config.server_addr.clone(), config.worker.rpc_timeout)?;
    let report = driver::run(&config, &connector).await?;

    println!("{report}");
    println!("Bye!");
    Ok(())
}

fn log_startup_info(config: &LoadConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting load against {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting load against {}: {} permissions/sec for {:?} across {} workers",
            config.server_addr,
            config.items_per_second,
            config.duration,
            config.worker_count
        );
    }
}
