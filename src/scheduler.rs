use crate::engine::Organizer;
use crate::mailer::FailureNotifier;
use colored::Colorize;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const HOURLY_SECS: u64 = 3600;
const DAILY_SECS: u64 = 86400;
const WEEKLY_SECS: u64 = 604800;

/// How often a pass runs. Loaded once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Hourly,
    Daily,
    Weekly,
    /// Custom interval in seconds.
    Every(u64),
}

impl Schedule {
    /// Parse the `SCHEDULE` setting. Anything unrecognized or
    /// non-positive warns and falls back to daily; a bad schedule is
    /// never fatal.
    pub fn parse(raw: &str) -> Schedule {
        match raw.to_lowercase().as_str() {
            "hourly" => Schedule::Hourly,
            "daily" => Schedule::Daily,
            "weekly" => Schedule::Weekly,
            other => match other.parse::<u64>() {
                Ok(secs) if secs > 0 => Schedule::Every(secs),
                _ => {
                    warn!("Invalid SCHEDULE value. Falling back to daily.");
                    Schedule::Daily
                }
            },
        }
    }

    pub fn interval(&self) -> Duration {
        let secs = match self {
            Schedule::Hourly => HOURLY_SECS,
            Schedule::Daily => DAILY_SECS,
            Schedule::Weekly => WEEKLY_SECS,
            Schedule::Every(secs) => *secs,
        };
        Duration::from_secs(secs)
    }
}

/// Pass loop: organize, report failures, sleep, repeat.
///
/// Sleeping is a `recv_timeout` on `stop`, so a message on the channel
/// shuts the loop down cleanly between passes. A disconnected channel
/// just means no stop signal can ever arrive; the loop then runs
/// forever, which is the unattended-daemon behavior.
pub fn run(
    organizer: &Organizer,
    notifier: &dyn FailureNotifier,
    schedule: Schedule,
    stop: &Receiver<()>,
) {
    let interval = schedule.interval();
    loop {
        run_one_pass(organizer, notifier);

        info!("Sleeping for {} seconds.", interval.as_secs());
        match stop.recv_timeout(interval) {
            Ok(()) => {
                info!("Stop signal received, shutting down.");
                return;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("No stop channel; continuing indefinitely.");
                std::thread::sleep(interval);
                continue;
            }
        }
    }
}

/// One pass plus its failure notification; shared by the daemon loop
/// and the one-shot CLI command.
pub fn run_one_pass(organizer: &Organizer, notifier: &dyn FailureNotifier) {
    let report = organizer.run_pass();

    info!(
        "Pass completed in {} seconds: {} transferred, {} replaced, {} skipped, {} failed",
        format_args!("{}", format!("{:.2}", report.duration.as_secs_f64()).green()),
        report.files_transferred + report.folders_transferred,
        report.files_replaced + report.folders_replaced,
        report.files_skipped + report.folders_skipped,
        format_args!("{}", format!("{}", report.failures.len()).red()),
    );

    if let Err(err) = notifier.send_failure_report(&report.failures) {
        // Logged only; the failure list is discarded with the pass.
        error!("Failed to send error email: {}", err);
    }
}
