//! Monitor reconciliation.
//!
//! Every cycle diffs the freshly fetched monitor list against the previous
//! trusted one. Series for monitors that disappeared (or whose labels changed)
//! are deleted, series for current monitors are set, and the fetched list
//! becomes the new baseline.
//!
//! Monitors are identified by friendly name. Two monitors sharing a name are
//! one entity as far as the exported series are concerned; the duplicate is
//! logged every cycle it is seen.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uptimewatch_adapters::UptimeApi;
use uptimewatch_sdk::GaugeStore;
use uptimewatch_types::{MonitorRecord, MonitorSnapshot};

use super::{CycleReport, Poller, SkipReason};
use crate::metrics::{MONITOR_STATUS, RESPONSE_TIME};
use crate::settings::DEFAULT_EMPTY_CONFIRMATIONS;

type Tuple = [String; 3];

pub struct MonitorReconciler<S> {
    api: Arc<dyn UptimeApi>,
    store: S,
    previous: MonitorSnapshot,
    empty_confirmations: u32,
    empty_streak: u32,
}

impl<S: GaugeStore> MonitorReconciler<S> {
    pub fn new(api: Arc<dyn UptimeApi>, store: S) -> Self {
        Self {
            api,
            store,
            previous: MonitorSnapshot::empty(),
            empty_confirmations: DEFAULT_EMPTY_CONFIRMATIONS,
            empty_streak: 0,
        }
    }

    /// Number of consecutive empty results required before they are trusted.
    /// Values below 1 are treated as 1.
    pub fn with_empty_confirmations(mut self, confirmations: u32) -> Self {
        self.empty_confirmations = confirmations.max(1);
        self
    }

    /// The last trusted snapshot.
    pub fn previous(&self) -> &MonitorSnapshot {
        &self.previous
    }

    /// Apply `current` against the previous snapshot.
    pub fn reconcile(&mut self, current: MonitorSnapshot) -> CycleReport {
        if current.is_empty() && !self.previous.is_empty() {
            self.empty_streak += 1;
            if self.empty_streak < self.empty_confirmations {
                warn!(
                    seen = self.empty_streak,
                    required = self.empty_confirmations,
                    previous = self.previous.len(),
                    "remote reported no monitors, keeping previous series until confirmed"
                );
                return CycleReport::skipped(SkipReason::AwaitingEmptyConfirmation {
                    seen: self.empty_streak,
                    required: self.empty_confirmations,
                });
            }
            warn!(
                removed = self.previous.len(),
                "empty monitor list confirmed, removing all monitor series"
            );
        }
        self.empty_streak = 0;

        for name in current.duplicate_names() {
            warn!(
                friendly_name = name,
                "multiple monitors share a friendly name, exporting them as one"
            );
        }

        let current_status: BTreeSet<Tuple> = current.iter().map(status_labels).collect();
        let current_latency: BTreeSet<Tuple> = current.iter().map(latency_labels).collect();

        let mut deleted = 0;
        let mut missing_deletes = 0;
        let mut removed = BTreeSet::new();

        for record in self.previous.iter() {
            let status = status_labels(record);
            if !current_status.contains(&status) && removed.insert((MONITOR_STATUS, status.clone())) {
                self.delete(record, MONITOR_STATUS, &status, true, &mut deleted, &mut missing_deletes);
            }

            let latency = latency_labels(record);
            if !current_latency.contains(&latency) && removed.insert((RESPONSE_TIME, latency.clone())) {
                let expected = record.latest_latency().is_some();
                self.delete(record, RESPONSE_TIME, &latency, expected, &mut deleted, &mut missing_deletes);
            }
        }

        let mut set = 0;
        for record in current.iter() {
            let status = status_labels(record);
            if self.set(MONITOR_STATUS, &status, f64::from(record.status_code)) {
                set += 1;
            }

            // No sample this cycle leaves the previous value in place.
            if let Some(sample) = record.latest_latency() {
                let latency = latency_labels(record);
                if self.set(RESPONSE_TIME, &latency, sample.value as f64) {
                    set += 1;
                }
            }

            if record.status().is_down() {
                debug!(
                    friendly_name = %record.friendly_name,
                    kind = ?record.kind(),
                    status = %record.status(),
                    "monitor is down"
                );
            }
        }

        debug!(
            monitors = current.len(),
            distinct_names = current.names().len(),
            set, deleted, missing_deletes, "reconciled monitors"
        );
        self.previous = current;

        CycleReport::Reconciled {
            set,
            deleted,
            missing_deletes,
        }
    }

    fn set(&self, family: &str, labels: &Tuple, value: f64) -> bool {
        let labels = as_refs(labels);
        match self.store.set_gauge(family, &labels, value) {
            Ok(()) => true,
            Err(e) => {
                error!(family, error = %e, "failed to set gauge");
                false
            }
        }
    }

    fn delete(
        &self,
        record: &MonitorRecord,
        family: &str,
        labels: &Tuple,
        expected: bool,
        deleted: &mut usize,
        missing_deletes: &mut usize,
    ) {
        match self.store.delete_gauge(family, &as_refs(labels)) {
            Ok(true) => {
                info!(
                    family,
                    friendly_name = %record.friendly_name,
                    url = %record.url,
                    "removed series for monitor no longer reported"
                );
                *deleted += 1;
            }
            Ok(false) if expected => {
                warn!(
                    family,
                    friendly_name = %record.friendly_name,
                    url = %record.url,
                    "series to remove was not present"
                );
                *missing_deletes += 1;
            }
            Ok(false) => debug!(
                family,
                friendly_name = %record.friendly_name,
                url = %record.url,
                "series to remove was never published"
            ),
            Err(e) => error!(
                family,
                friendly_name = %record.friendly_name,
                error = %e,
                "failed to remove series"
            ),
        }
    }
}

#[async_trait]
impl<S: GaugeStore + 'static> Poller for MonitorReconciler<S> {
    fn name(&self) -> &'static str {
        "monitors"
    }

    async fn poll_once(&mut self) -> CycleReport {
        match self.api.monitors().await {
            Ok(current) => self.reconcile(current),
            Err(e) => {
                error!(error = %e, "failed to fetch monitors");
                CycleReport::skipped(SkipReason::FetchFailed(e.to_string()))
            }
        }
    }
}

fn status_labels(record: &MonitorRecord) -> Tuple {
    [
        record.url.clone(),
        record.friendly_name.clone(),
        record.interval.to_string(),
    ]
}

fn latency_labels(record: &MonitorRecord) -> Tuple {
    [
        record.url.clone(),
        record.friendly_name.clone(),
        record.monitor_type.to_string(),
    ]
}

fn as_refs(labels: &Tuple) -> [&str; 3] {
    [labels[0].as_str(), labels[1].as_str(), labels[2].as_str()]
}
