use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};
use uptimewatch_adapters::UptimeApi;
use uptimewatch_sdk::GaugeStore;
use uptimewatch_types::AccountSnapshot;

use super::{CycleReport, Poller, SkipReason};
use crate::metrics::{ACCOUNT_DETAILS, DOWN_MONITORS, PAUSED_MONITORS, UP_MONITORS};

/// Publishes account-level details and monitor counts.
pub struct AccountPoller<S> {
    api: Arc<dyn UptimeApi>,
    store: S,
    /// Label tuple of the details series written by the last cycle.
    published: Option<Vec<String>>,
}

impl<S: GaugeStore> AccountPoller<S> {
    pub fn new(api: Arc<dyn UptimeApi>, store: S) -> Self {
        Self {
            api,
            store,
            published: None,
        }
    }

    fn publish(&mut self, account: &AccountSnapshot) -> CycleReport {
        let labels = details_labels(account);
        let mut set = 0;
        let mut deleted = 0;
        let mut missing_deletes = 0;

        if let Some(previous) = self.published.as_ref().filter(|p| **p != labels) {
            let previous: Vec<&str> = previous.iter().map(String::as_str).collect();
            match self.store.delete_gauge(ACCOUNT_DETAILS, &previous) {
                Ok(true) => {
                    debug!("removed outdated account details series");
                    deleted += 1;
                }
                Ok(false) => {
                    warn!("outdated account details series was already gone");
                    missing_deletes += 1;
                }
                Err(e) => error!(error = %e, "failed to remove account details series"),
            }
        }

        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let writes: [(&str, &[&str], f64); 4] = [
            (ACCOUNT_DETAILS, label_refs.as_slice(), 1.0),
            (UP_MONITORS, &[], f64::from(account.up_monitors)),
            (DOWN_MONITORS, &[], f64::from(account.down_monitors)),
            (PAUSED_MONITORS, &[], f64::from(account.paused_monitors)),
        ];
        for (family, labels, value) in writes {
            match self.store.set_gauge(family, labels, value) {
                Ok(()) => set += 1,
                Err(e) => error!(family, error = %e, "failed to set gauge"),
            }
        }

        self.published = Some(labels);
        CycleReport::Reconciled {
            set,
            deleted,
            missing_deletes,
        }
    }
}

#[async_trait]
impl<S: GaugeStore + 'static> Poller for AccountPoller<S> {
    fn name(&self) -> &'static str {
        "account"
    }

    async fn poll_once(&mut self) -> CycleReport {
        let account = match self.api.account_details().await {
            Ok(account) => account,
            Err(e) => {
                error!(error = %e, "failed to fetch account details");
                return CycleReport::skipped(SkipReason::FetchFailed(e.to_string()));
            }
        };

        debug!(
            up = account.up_monitors,
            down = account.down_monitors,
            paused = account.paused_monitors,
            total = account.total_monitors(),
            "fetched account details"
        );
        self.publish(&account)
    }
}

/// Label values in the order of `ACCOUNT_DETAILS_LABELS`.
fn details_labels(account: &AccountSnapshot) -> Vec<String> {
    vec![
        account.firstname.clone(),
        account.email.clone(),
        account.monitor_limit.to_string(),
        account.monitor_interval.to_string(),
        account.up_monitors.to_string(),
        account.down_monitors.to_string(),
        account.paused_monitors.to_string(),
        account.payment_period.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::poller::testing::{capture_logs, RecordingStore, ScriptedApi};
    use uptimewatch_adapters::AdapterError;

    fn account(up: u32, down: u32, paused: u32) -> AccountSnapshot {
        AccountSnapshot {
            email: "ops@example.com".to_string(),
            user_id: 42,
            firstname: "Ops".to_string(),
            monitor_limit: 50,
            monitor_interval: 5,
            up_monitors: up,
            down_monitors: down,
            paused_monitors: paused,
            ..Default::default()
        }
    }

    fn details(up: &str, down: &str, paused: &str) -> [String; 8] {
        [
            "Ops".to_string(),
            "ops@example.com".to_string(),
            "50".to_string(),
            "5".to_string(),
            up.to_string(),
            down.to_string(),
            paused.to_string(),
            "0".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_publishes_details_and_counts() {
        let api = Arc::new(ScriptedApi::new().account(Ok(account(3, 1, 2))));
        let store = Arc::new(RecordingStore::default());
        let mut poller = AccountPoller::new(api, store.clone());

        let report = poller.poll_once().await;
        assert_eq!(
            report,
            CycleReport::Reconciled {
                set: 4,
                deleted: 0,
                missing_deletes: 0
            }
        );

        let labels = details("3", "1", "2");
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        assert_eq!(store.get(ACCOUNT_DETAILS, &labels), Some(1.0));
        assert_eq!(store.get(UP_MONITORS, &[]), Some(3.0));
        assert_eq!(store.get(DOWN_MONITORS, &[]), Some(1.0));
        assert_eq!(store.get(PAUSED_MONITORS, &[]), Some(2.0));
    }

    #[tokio::test]
    async fn test_changed_details_replace_old_series() {
        let api = Arc::new(
            ScriptedApi::new()
                .account(Ok(account(3, 1, 2)))
                .account(Ok(account(4, 0, 2))),
        );
        let store = Arc::new(RecordingStore::default());
        let mut poller = AccountPoller::new(api, store.clone());

        poller.poll_once().await;
        let report = poller.poll_once().await;
        assert_eq!(
            report,
            CycleReport::Reconciled {
                set: 4,
                deleted: 1,
                missing_deletes: 0
            }
        );

        let tuples = store.tuples(ACCOUNT_DETAILS);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0], details("4", "0", "2").to_vec());
        assert_eq!(store.get(UP_MONITORS, &[]), Some(4.0));
        assert_eq!(store.get(DOWN_MONITORS, &[]), Some(0.0));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_gauges_untouched() {
        let api = Arc::new(
            ScriptedApi::new()
                .account(Ok(account(3, 1, 2)))
                .account(Err(AdapterError::Timeout)),
        );
        let store = Arc::new(RecordingStore::default());
        let mut poller = AccountPoller::new(api, store.clone());

        poller.poll_once().await;
        let before = store.snapshot();
        store.take_ops();

        let report = poller.poll_once().await;
        assert_eq!(
            report,
            CycleReport::skipped(SkipReason::FetchFailed("Request timed out".to_string()))
        );
        assert!(store.take_ops().is_empty());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_publish_log_reports_total() {
        let api = Arc::new(ScriptedApi::new().account(Ok(account(3, 1, 2))));
        let mut poller = AccountPoller::new(api, Arc::new(RecordingStore::default()));
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let (_, logs) = capture_logs(|| runtime.block_on(poller.poll_once()));

        let line = logs
            .lines()
            .find(|l| l.contains("fetched account details"))
            .expect("no log line for the fetched account");
        assert!(line.contains("total=6"));
    }

    #[tokio::test]
    async fn test_unchanged_details_do_not_delete() {
        let api = Arc::new(
            ScriptedApi::new()
                .account(Ok(account(3, 1, 2)))
                .account(Ok(account(3, 1, 2))),
        );
        let store = Arc::new(RecordingStore::default());
        let mut poller = AccountPoller::new(api, store.clone());

        poller.poll_once().await;
        let report = poller.poll_once().await;
        assert_eq!(
            report,
            CycleReport::Reconciled {
                set: 4,
                deleted: 0,
                missing_deletes: 0
            }
        );
    }
}
