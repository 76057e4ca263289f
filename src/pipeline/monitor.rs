// src/pipeline/monitor.rs

//! Poll loop: fixed wall-clock scheduling of check cycles.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::check::run_check;
use crate::services::{Detector, Notify};
use crate::storage::StatusStore;
use crate::utils::log;

/// Coarse sleep increment between due-time checks.
const POLL_TICK: Duration = Duration::from_secs(60);

/// Run the monitor loop until the process is terminated.
///
/// An initial check runs immediately, independent of the schedule. After
/// that the loop wakes every [`POLL_TICK`] and runs a check once the
/// configured interval has elapsed. Checks never overlap: a cycle runs to
/// completion before the next can become due. Per-cycle errors are logged
/// and the loop carries on.
pub async fn run_monitor(
    config: &Config,
    detector: &Detector,
    store: &mut StatusStore,
    notifier: &dyn Notify,
) -> Result<()> {
    let item = config.item();
    let interval = chrono::Duration::hours(config.schedule.interval_hours as i64);

    log::header("Starting stock monitor");
    log::sub_item(&format!("Item: {}", item.name));
    log::sub_item(&format!(
        "Checking every {} hour(s)",
        config.schedule.interval_hours
    ));

    if let Err(e) = run_check(item, detector, store, notifier).await {
        log::error(&format!("Check failed: {e}"));
    }
    let mut next_due = Utc::now() + interval;

    loop {
        tokio::time::sleep(POLL_TICK).await;

        if Utc::now() >= next_due {
            if let Err(e) = run_check(item, detector, store, notifier).await {
                log::error(&format!("Check failed: {e}"));
            }
            next_due = Utc::now() + interval;
        }
    }
}
