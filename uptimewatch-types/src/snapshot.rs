//! MonitorSnapshot - the full set of monitors observed in one poll cycle.

use std::collections::{BTreeSet, HashSet};

use crate::{MonitorRecord, MonitorRecordBuilder};

/// An ordered, point-in-time list of monitor records.
///
/// Records keep the order the API returned them in. Lookups go by friendly
/// name, which is the identity key used when diffing two snapshots.
///
/// # Example
///
/// ```rust
/// use uptimewatch_types::MonitorSnapshot;
///
/// let snapshot = MonitorSnapshot::builder()
///     .timestamp_ms(1703160000000)
///     .monitor("B", |m| m.url("http://b").interval(30).status(2).latency(150))
///     .build();
///
/// assert!(snapshot.contains("B"));
/// assert!(!snapshot.contains("A"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorSnapshot {
    /// Unix timestamp in milliseconds when the snapshot was fetched.
    pub fetched_at_ms: u64,

    pub monitors: Vec<MonitorRecord>,
}

impl MonitorSnapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(monitors: Vec<MonitorRecord>) -> Self {
        Self {
            fetched_at_ms: current_timestamp_ms(),
            monitors,
        }
    }

    /// An empty snapshot with a zero timestamp.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> MonitorSnapshotBuilder {
        MonitorSnapshotBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitorRecord> {
        self.monitors.iter()
    }

    /// First record with the given friendly name.
    pub fn get(&self, friendly_name: &str) -> Option<&MonitorRecord> {
        self.monitors.iter().find(|m| m.friendly_name == friendly_name)
    }

    pub fn contains(&self, friendly_name: &str) -> bool {
        self.get(friendly_name).is_some()
    }

    /// Distinct friendly names in the snapshot.
    pub fn names(&self) -> BTreeSet<&str> {
        self.monitors.iter().map(|m| m.friendly_name.as_str()).collect()
    }

    /// Friendly names that appear on more than one record.
    ///
    /// Such records collapse into a single entity during reconciliation.
    pub fn duplicate_names(&self) -> BTreeSet<&str> {
        let mut seen = HashSet::new();
        self.monitors
            .iter()
            .map(|m| m.friendly_name.as_str())
            .filter(|name| !seen.insert(*name))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MonitorSnapshot {
    type Item = &'a MonitorRecord;
    type IntoIter = std::slice::Iter<'a, MonitorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.monitors.iter()
    }
}

/// Builder for constructing `MonitorSnapshot` instances.
#[derive(Debug, Default)]
pub struct MonitorSnapshotBuilder {
    timestamp_ms: Option<u64>,
    monitors: Vec<MonitorRecord>,
}

impl MonitorSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a monitor built using a closure.
    pub fn monitor<F>(mut self, friendly_name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(MonitorRecordBuilder) -> MonitorRecordBuilder,
    {
        self.monitors
            .push(f(MonitorRecordBuilder::new(friendly_name)).build());
        self
    }

    pub fn build(self) -> MonitorSnapshot {
        MonitorSnapshot {
            fetched_at_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            monitors: self.monitors,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = MonitorSnapshot::builder()
            .timestamp_ms(1703160000000)
            .monitor("A", |m| m.url("http://a").interval(60))
            .monitor("B", |m| m.url("http://b").interval(30).status(2))
            .build();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.fetched_at_ms, 1703160000000);
        assert_eq!(snapshot.get("B").unwrap().status_code, 2);
        assert_eq!(
            snapshot.names().into_iter().collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let snapshot = MonitorSnapshot::builder()
            .monitor("zeta", |m| m)
            .monitor("alpha", |m| m)
            .build();

        let names: Vec<_> = snapshot.iter().map(|m| m.friendly_name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_duplicate_names() {
        let snapshot = MonitorSnapshot::builder()
            .monitor("X", |m| m.id(1).url("http://x1"))
            .monitor("X", |m| m.id(2).url("http://x2"))
            .monitor("Y", |m| m.id(3))
            .build();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.names().len(), 2);
        assert_eq!(
            snapshot.duplicate_names().into_iter().collect::<Vec<_>>(),
            vec!["X"]
        );
        // Lookup resolves to the first record with the name.
        assert_eq!(snapshot.get("X").unwrap().id, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = MonitorSnapshot::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.names().is_empty());
        assert!(snapshot.duplicate_names().is_empty());
    }

    #[test]
    fn test_new_is_timestamped() {
        let snapshot = MonitorSnapshot::new(Vec::new());
        assert!(snapshot.fetched_at_ms > 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = MonitorSnapshot::builder()
            .timestamp_ms(1703160000000)
            .monitor("api", |m| m.url("http://api").latency(42))
            .build();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: MonitorSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
    }
}
