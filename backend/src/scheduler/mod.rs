//! Periodic report runs.
//!
//! The scheduler fires the configured [`ReportRequest`] at the top of every
//! hour, alongside the HTTP server. A run's outcome is only logged; a failed
//! run never stops the schedule.

use chrono::{Local, Timelike};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::config::RuleSet;
use crate::transform::pipeline::{generate_report_async, ReportRequest, RunSummary};

const HOUR: Duration = Duration::from_secs(3600);

/// Fires one report request at a fixed period.
#[derive(Debug, Clone)]
pub struct Scheduler {
    request: ReportRequest,
    rules: Arc<RuleSet>,
    output_path: PathBuf,
    period: Duration,
    first_delay: Duration,
}

impl Scheduler {
    /// Run `request` at the top of every local hour.
    pub fn hourly(request: ReportRequest, rules: Arc<RuleSet>, output_path: PathBuf) -> Self {
        Self {
            request,
            rules,
            output_path,
            period: HOUR,
            first_delay: delay_until_next_hour(&Local::now()),
        }
    }

    /// Replace the hourly cadence, first firing after one `period`.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self.first_delay = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the schedule on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Loop forever, one run per tick.
    pub async fn run(self) {
        info!(
            period_secs = self.period.as_secs_f64(),
            first_in_secs = self.first_delay.as_secs(),
            "Scheduled report generation enabled"
        );

        let mut ticker = interval_at(Instant::now() + self.first_delay, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_scheduled(
                self.request.clone(),
                self.rules.clone(),
                self.output_path.clone(),
            )
            .await;
        }
    }
}

/// Run one scheduled report and log how it went.
pub async fn run_scheduled(
    request: ReportRequest,
    rules: Arc<RuleSet>,
    output_path: PathBuf,
) -> Option<RunSummary> {
    info!("Scheduled report generation triggered");
    match generate_report_async(request, rules, output_path).await {
        Ok(summary) => {
            info!(
                run_id = %summary.run_id,
                rows = summary.output_rows,
                "Scheduled report generation completed successfully"
            );
            Some(summary)
        }
        Err(e) => {
            error!(error = %e, "Error during scheduled report generation");
            None
        }
    }
}

/// Time left until minute 0, second 0 of the next hour.
pub fn delay_until_next_hour<T: Timelike>(now: &T) -> Duration {
    let into_hour = Duration::from_secs(u64::from(now.minute() * 60 + now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond().min(999_999_999)));
    HOUR.saturating_sub(into_hour)
}
