//! Periodic pollers that mirror remote state into the gauge registry.
//!
//! Each poller owns its own state and writes to a disjoint set of gauge
//! families, so the two loops never coordinate with each other.
//!
//! ```text
//! ┌──────────────┐  fetch   ┌────────────────┐  set/delete  ┌──────────┐
//! │  UptimeApi   │◀─────────│ AccountPoller  │─────────────▶│          │
//! │ (UptimeRobot)│◀─────────│ MonitorRecon.  │─────────────▶│ Registry │◀── /metrics
//! └──────────────┘          └────────────────┘              └──────────┘
//! ```

mod account;
mod monitors;

pub use account::AccountPoller;
pub use monitors::MonitorReconciler;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Why a cycle made no changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The remote fetch failed; the message is the logged error.
    FetchFailed(String),
    /// The remote reported zero monitors and the result is not trusted yet.
    AwaitingEmptyConfirmation { seen: u32, required: u32 },
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    Skipped {
        reason: SkipReason,
    },
    Reconciled {
        /// Series created or updated.
        set: usize,
        /// Series removed.
        deleted: usize,
        /// Deletions of series that were expected but not present.
        missing_deletes: usize,
    },
}

impl CycleReport {
    pub fn skipped(reason: SkipReason) -> Self {
        CycleReport::Skipped { reason }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleReport::Skipped { .. })
    }
}

/// One unit of periodic work.
#[async_trait]
pub trait Poller: Send {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Run exactly one fetch-and-publish cycle.
    ///
    /// Never fails: remote and registry errors are logged and reported
    /// through the returned [`CycleReport`].
    async fn poll_once(&mut self) -> CycleReport;
}

/// Run `poller` once immediately and then once per `period` until `shutdown`
/// becomes `true` or its sender is dropped.
///
/// A slow cycle delays the next tick rather than queueing a backlog. Shutdown
/// also cancels a cycle that is still in flight, so a hung fetch cannot hold
/// the process open.
pub fn spawn<P>(mut poller: P, period: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()>
where
    P: Poller + 'static,
{
    tokio::spawn(async move {
        let name = poller.name();
        if *shutdown.borrow() {
            return;
        }

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poller = name, interval_secs = period.as_secs(), "poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stopped(&mut shutdown) => break,
            }

            // A cycle only mutates state after its fetch returns, so an
            // abandoned cycle leaves nothing half-applied.
            tokio::select! {
                report = poller.poll_once() => {
                    debug!(poller = name, ?report, "cycle finished");
                }
                _ = stopped(&mut shutdown) => {
                    info!(poller = name, "abandoning in-flight cycle");
                    break;
                }
            }
        }

        info!(poller = name, "poller stopped");
    })
}

/// Resolves once `shutdown` is `true` or its sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
