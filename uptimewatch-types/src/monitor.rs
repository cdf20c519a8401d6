//! Per-resource monitor records.

use std::fmt;

/// A single monitored resource as of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorRecord {
    /// Numeric id assigned by UptimeRobot. Not used as the identity key.
    pub id: u64,

    /// Display name. This is the identity key during reconciliation, so two
    /// monitors sharing a name are treated as the same entity.
    pub friendly_name: String,

    pub url: String,

    /// Raw monitor type code (see [`MonitorType`]).
    pub monitor_type: u32,

    /// Check interval in seconds.
    pub interval: u32,

    /// Raw status code (see [`MonitorStatus`]).
    pub status_code: u32,

    /// Latency samples, most recent first. May be empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub latency: Vec<LatencySample>,
}

impl MonitorRecord {
    /// Create a builder for a record with the given friendly name.
    pub fn builder(friendly_name: impl Into<String>) -> MonitorRecordBuilder {
        MonitorRecordBuilder::new(friendly_name)
    }

    /// Decoded status.
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus::from_code(self.status_code)
    }

    /// Decoded monitor type.
    pub fn kind(&self) -> MonitorType {
        MonitorType::from_code(self.monitor_type)
    }

    /// The most recent latency sample, if the API returned any.
    pub fn latest_latency(&self) -> Option<&LatencySample> {
        self.latency.first()
    }
}

/// One response-time measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatencySample {
    /// Unix timestamp (seconds) of the measurement.
    pub datetime: i64,
    /// Response time in milliseconds.
    pub value: u64,
}

/// Monitor status as encoded by UptimeRobot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonitorStatus {
    Paused,
    NotCheckedYet,
    Up,
    SeemsDown,
    Down,
    Unknown(u32),
}

impl MonitorStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => MonitorStatus::Paused,
            1 => MonitorStatus::NotCheckedYet,
            2 => MonitorStatus::Up,
            8 => MonitorStatus::SeemsDown,
            9 => MonitorStatus::Down,
            other => MonitorStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            MonitorStatus::Paused => 0,
            MonitorStatus::NotCheckedYet => 1,
            MonitorStatus::Up => 2,
            MonitorStatus::SeemsDown => 8,
            MonitorStatus::Down => 9,
            MonitorStatus::Unknown(code) => *code,
        }
    }

    /// True for the two "down" states.
    pub fn is_down(&self) -> bool {
        matches!(self, MonitorStatus::SeemsDown | MonitorStatus::Down)
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorStatus::Paused => write!(f, "paused"),
            MonitorStatus::NotCheckedYet => write!(f, "not_checked_yet"),
            MonitorStatus::Up => write!(f, "up"),
            MonitorStatus::SeemsDown => write!(f, "seems_down"),
            MonitorStatus::Down => write!(f, "down"),
            MonitorStatus::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Kind of check a monitor performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonitorType {
    Http,
    Keyword,
    Ping,
    Port,
    Heartbeat,
    Other(u32),
}

impl MonitorType {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MonitorType::Http,
            2 => MonitorType::Keyword,
            3 => MonitorType::Ping,
            4 => MonitorType::Port,
            5 => MonitorType::Heartbeat,
            other => MonitorType::Other(other),
        }
    }
}

/// Builder for [`MonitorRecord`].
#[derive(Debug)]
pub struct MonitorRecordBuilder {
    record: MonitorRecord,
}

impl MonitorRecordBuilder {
    /// Start a record with the given friendly name and HTTP type.
    pub fn new(friendly_name: impl Into<String>) -> Self {
        Self {
            record: MonitorRecord {
                friendly_name: friendly_name.into(),
                monitor_type: 1,
                interval: 300,
                status_code: 1,
                ..Default::default()
            },
        }
    }

    pub fn id(mut self, id: u64) -> Self {
        self.record.id = id;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.record.url = url.into();
        self
    }

    pub fn monitor_type(mut self, code: u32) -> Self {
        self.record.monitor_type = code;
        self
    }

    pub fn interval(mut self, seconds: u32) -> Self {
        self.record.interval = seconds;
        self
    }

    pub fn status(mut self, code: u32) -> Self {
        self.record.status_code = code;
        self
    }

    /// Append a latency sample in milliseconds.
    ///
    /// Samples are kept in the order added, so the first call sets the most
    /// recent value.
    pub fn latency(mut self, value: u64) -> Self {
        self.record.latency.push(LatencySample { datetime: 0, value });
        self
    }

    pub fn build(self) -> MonitorRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_decode() {
        assert_eq!(MonitorStatus::from_code(0), MonitorStatus::Paused);
        assert_eq!(MonitorStatus::from_code(2), MonitorStatus::Up);
        assert_eq!(MonitorStatus::from_code(9), MonitorStatus::Down);
        assert_eq!(MonitorStatus::from_code(42), MonitorStatus::Unknown(42));
        assert_eq!(MonitorStatus::from_code(8).code(), 8);
        assert!(MonitorStatus::SeemsDown.is_down());
        assert!(!MonitorStatus::Up.is_down());
    }

    #[test]
    fn status_display() {
        assert_eq!(MonitorStatus::Up.to_string(), "up");
        assert_eq!(MonitorStatus::Unknown(7).to_string(), "unknown(7)");
    }

    #[test]
    fn type_codes_decode() {
        assert_eq!(MonitorType::from_code(1), MonitorType::Http);
        assert_eq!(MonitorType::from_code(5), MonitorType::Heartbeat);
        assert_eq!(MonitorType::from_code(99), MonitorType::Other(99));
    }

    #[test]
    fn latest_latency_is_first_sample() {
        let record = MonitorRecord::builder("api").latency(120).latency(300).build();
        assert_eq!(record.latest_latency().map(|s| s.value), Some(120));

        let empty = MonitorRecord::builder("api").build();
        assert!(empty.latest_latency().is_none());
    }

    #[test]
    fn builder_defaults() {
        let record = MonitorRecord::builder("api").build();
        assert_eq!(record.friendly_name, "api");
        assert_eq!(record.kind(), MonitorType::Http);
        assert_eq!(record.interval, 300);
        assert_eq!(record.status(), MonitorStatus::NotCheckedYet);
        assert!(record.latency.is_empty());
    }
}
