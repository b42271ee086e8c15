//! Rate-shaped dispatch and the completion barrier.
//!
//! [`run`] is the whole load test:
//!
//! 1. Start a [`WorkerPool`] bound to one work channel and one completion
//!    channel.
//! 2. While the configured duration has not elapsed, enqueue a burst of
//!    `items_per_second` synthetic [`WorkItem`]s, then wait for the next
//!    burst as dictated by [`Pacing`].
//! 3. Drain exactly as many completions as items were sent.
//! 4. Stop and join the pool, then hand back a [`RunReport`].
//!
//! The drain has no deadline. Every worker bounds each call by its RPC
//! timeout and always reports a completion, so the drain ends as long as at
//! least one worker is alive. If every worker is gone the completion channel
//! closes and the drain fails instead of hanging.

use crate::loadgen::{
    config::{LoadConfig, Pacing},
    pool::manager::WorkerPool,
    report::RunReport,
};
use core::time::Duration;
use iam_loadgen_core::{Completion, Connector, Error, Result, WorkItem};
use tokio::{
    sync::mpsc,
    time::{Instant, interval_at, sleep},
};

/// Spacing between bursts.
const BURST_PERIOD: Duration = Duration::from_secs(1);

/// Runs a complete load test against the workers produced by `connector`.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] before any work starts if `config` is invalid.
/// - The connector's error if a worker cannot connect.
/// - [`Error::ChannelError`] if every worker exits before the drain is done.
/// - Join errors from [`WorkerPool::shutdown`].
#[tracing::instrument(
    skip_all,
    fields(
        duration = ?config.duration,
        items_per_second = config.items_per_second,
        workers = config.worker_count,
    )
)]
pub async fn run<C: Connector>(config: &LoadConfig, connector: &C) -> Result<RunReport> {
    config.validate()?;

    let (work_tx, work_rx) = async_channel::unbounded::<WorkItem>();
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<Completion>();

    let pool = WorkerPool::spawn(
        connector,
        config.worker_count,
        &work_rx,
        &completion_tx,
        &config.worker,
    )
    .await?;
    // Only the workers may keep these ends alive, otherwise losing every
    // worker would leave the driver blocked forever.
    drop(work_rx);
    drop(completion_tx);

    let start = Instant::now();
    let total_sent = dispatch(&work_tx, config, start).await?;
    let elapsed = start.elapsed();

    tracing::info!(total_sent, "Dispatched all create requests, waiting for workers to complete");
    let mut report = RunReport {
        elapsed,
        total_sent,
        ..RunReport::default()
    };
    drain(&mut completion_rx, &mut report).await?;

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "All dispatched requests attempted"
    );
    drop(work_tx);
    pool.shutdown(config.shutdown_timeout).await?;

    Ok(report)
}

/// Enqueues bursts until `config.duration` has elapsed since `start`.
/// Returns how many items were sent.
async fn dispatch(
    work_tx: &async_channel::Sender<WorkItem>,
    config: &LoadConfig,
    start: Instant,
) -> Result<u64> {
    let mut ticker = match config.pacing {
        Pacing::Naive => None,
        Pacing::Scheduled => Some(interval_at(start + BURST_PERIOD, BURST_PERIOD)),
    };
    let mut total_sent = 0_u64;
    let mut bursts = 0_u64;

    while start.elapsed() < config.duration {
        for _ in 0..config.items_per_second {
            work_tx
                .try_send(WorkItem::synthetic())
                .map_err(|_| Error::ChannelError {
                    context: format!("work channel closed after {total_sent} items"),
                })?;
            total_sent += 1;
        }
        bursts += 1;
        tracing::debug!(bursts, total_sent, "Burst enqueued");

        match ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => sleep(BURST_PERIOD).await,
        }
    }

    Ok(total_sent)
}

/// Blocks until `report.total_sent` completions have been recorded.
async fn drain(
    completion_rx: &mut mpsc::UnboundedReceiver<Completion>,
    report: &mut RunReport,
) -> Result<()> {
    while report.completed() < report.total_sent {
        let completion = completion_rx.recv().await.ok_or_else(|| Error::ChannelError {
            context: format!(
                "completion channel closed after {} of {} completions",
                report.completed(),
                report.total_sent
            ),
        })?;
        tracing::trace!(
            worker_id = completion.worker_id,
            outcome = ?completion.outcome,
            "Completion received"
        );
        report.record(completion.outcome);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadgen::{
        config::WorkerConfig,
        testing::{Behavior, StubConnector},
    };
    use iam_loadgen_core::{GrpcConnector, types::ASSET_PREFIX};
    use std::collections::HashSet;

    fn config(duration: f64, items_per_second: u64, worker_count: usize) -> LoadConfig {
        LoadConfig {
            duration: Duration::from_secs_f64(duration),
            items_per_second,
            worker_count,
            pacing: Pacing::Naive,
            shutdown_timeout: None,
            server_addr: String::from("http://localhost:9091"),
            worker: WorkerConfig {
                rpc_timeout: Duration::from_secs(1),
                poll_interval: Duration::from_millis(50),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn two_second_run_sends_two_bursts() {
        let connector = StubConnector::new(Behavior::Succeed);

        let report = run(&config(2.0, 5, 3), &connector).await.unwrap();

        assert_eq!(report.total_sent, 10);
        assert_eq!(report.succeeded, 10);
        assert_eq!(report.failed, 0);
        assert_eq!(connector.log().calls(), 10);
        assert!(report.elapsed >= Duration::from_secs(2));
        assert!(report.elapsed < Duration::from_millis(2100));
        assert!((report.effective_rate() - 10.0 / report.elapsed.as_secs_f64()).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_follow_whole_seconds_of_duration() {
        for (duration, items_per_second, expected) in
            [(0.5, 7, 7), (1.0, 4, 4), (2.5, 3, 9), (3.0, 4, 12), (4.0, 0, 0)]
        {
            let connector = StubConnector::new(Behavior::Succeed);
            let report = run(&config(duration, items_per_second, 2), &connector)
                .await
                .unwrap();
            assert_eq!(report.total_sent, expected, "duration={duration} ips={items_per_second}");
            assert_eq!(report.completed(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_pacing_sends_same_bursts() {
        let connector = StubConnector::new(Behavior::Succeed);
        let mut config = config(3.0, 5, 2);
        config.pacing = Pacing::Scheduled;

        let report = run(&config, &connector).await.unwrap();

        assert_eq!(report.total_sent, 15);
        assert!(report.elapsed >= Duration::from_secs(3));
        assert!(report.elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_rpcs_do_not_block_the_drain() {
        let connector = StubConnector::new(Behavior::Fail);

        let report = run(&config(2.0, 6, 2), &connector).await.unwrap();

        assert_eq!(report.total_sent, 12);
        assert_eq!(report.failed, 12);
        assert_eq!(report.succeeded, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_rpcs_do_not_block_the_drain() {
        let connector = StubConnector::new(Behavior::Delay(Duration::from_secs(30)));

        let report = run(&config(1.0, 4, 4), &connector).await.unwrap();

        assert_eq!(report.total_sent, 4);
        assert_eq!(report.failed, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn object_auis_are_unique_across_run() {
        let connector = StubConnector::new(Behavior::Succeed);

        let report = run(&config(3.0, 50, 4), &connector).await.unwrap();

        let auis = connector.log().object_auis();
        assert_eq!(auis.len() as u64, report.total_sent);
        assert!(auis.iter().all(|aui| aui.starts_with(ASSET_PREFIX)));
        let unique: HashSet<_> = auis.into_iter().collect();
        assert_eq!(unique.len() as u64, report.total_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_workers_is_rejected_up_front() {
        let connector = StubConnector::new(Behavior::Succeed);

        let err = run(&config(2.0, 5, 0), &connector).await.unwrap_err();

        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert_eq!(connector.connected(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_failure_aborts_before_dispatch() {
        let connector = StubConnector::new(Behavior::Succeed).refusing_from(1);

        let err = run(&config(2.0, 5, 3), &connector).await.unwrap_err();

        assert!(matches!(err, Error::ChannelError { .. }));
        assert_eq!(connector.log().calls(), 0);
    }

    #[tokio::test]
    async fn unreachable_service_still_terminates() {
        let connector =
            GrpcConnector::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();

        let report = run(&config(0.5, 3, 2), &connector).await.unwrap();

        assert_eq!(report.total_sent, 3);
        assert_eq!(report.failed, 3);
    }
}
