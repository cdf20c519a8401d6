//! Account-level aggregate counters.

/// Account details as reported by the `getAccountDetails` endpoint.
///
/// Snapshots are replaced wholesale on every poll; nothing is diffed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountSnapshot {
    pub email: String,
    pub user_id: u64,
    pub firstname: String,
    pub sms_credits: i64,
    pub payment_processor: i64,
    pub payment_period: i64,
    /// Subscription expiry as sent by the API (not parsed).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub subscription_expiry_date: Option<String>,
    pub monitor_limit: u32,
    /// Minimum check interval allowed by the plan, in seconds.
    pub monitor_interval: u32,
    pub up_monitors: u32,
    pub down_monitors: u32,
    pub paused_monitors: u32,
}

impl AccountSnapshot {
    /// Total number of monitors across all states.
    pub fn total_monitors(&self) -> u32 {
        self.up_monitors
            .saturating_add(self.down_monitors)
            .saturating_add(self.paused_monitors)
    }
}
