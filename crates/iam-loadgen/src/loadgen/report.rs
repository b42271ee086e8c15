use core::{fmt, time::Duration};
use iam_loadgen_core::Outcome;

/// Throughput summary of a completed run.
///
/// `elapsed` covers the send phase only, ending right after the last burst
/// was paced out. Draining and shutdown are not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub elapsed: Duration,
    pub total_sent: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl RunReport {
    /// Number of completions counted so far.
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Measured items per second, `0.0` for an instantaneous run.
    pub fn effective_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_sent as f64 / secs
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elapsed: {:.3} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "Sent: {} permissions", self.total_sent)?;
        writeln!(f, "Effective: {:.2} permissions/sec", self.effective_rate())?;
        write!(f, "Succeeded: {}, Failed: {}", self.succeeded, self.failed)
    }
}
