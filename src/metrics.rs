//! Gauge families published by the exporter.

use uptimewatch_sdk::{Registry, RegistryError};

pub const ACCOUNT_DETAILS: &str = "uptimerobot_account_details";
pub const UP_MONITORS: &str = "uptimerobot_up_monitors";
pub const DOWN_MONITORS: &str = "uptimerobot_down_monitors";
pub const PAUSED_MONITORS: &str = "uptimerobot_paused_monitors";
pub const MONITOR_STATUS: &str = "uptimerobot_monitors_status";
pub const RESPONSE_TIME: &str = "uptimerobot_response_time";

pub const ACCOUNT_DETAILS_LABELS: [&str; 8] = [
    "firstname",
    "email",
    "monitors_limit",
    "monitor_interval",
    "up_monitors",
    "down_monitors",
    "paused_monitors",
    "payment_period",
];
pub const MONITOR_STATUS_LABELS: [&str; 3] = ["url", "friendly_name", "interval"];
pub const RESPONSE_TIME_LABELS: [&str; 3] = ["url", "friendly_name", "type"];

/// Register every family on `registry`.
///
/// Fails if any family is already registered.
pub fn register_all(registry: &Registry) -> Result<(), RegistryError> {
    registry.register_gauge(
        ACCOUNT_DETAILS,
        "Account details of the UptimeRobot account",
        &ACCOUNT_DETAILS_LABELS,
    )?;
    registry.register_gauge(UP_MONITORS, "Number of monitors that are up", &[])?;
    registry.register_gauge(DOWN_MONITORS, "Number of monitors that are down", &[])?;
    registry.register_gauge(PAUSED_MONITORS, "Number of monitors that are paused", &[])?;
    registry.register_gauge(
        MONITOR_STATUS,
        "Status of the monitor (0 paused, 1 not checked yet, 2 up, 8 seems down, 9 down)",
        &MONITOR_STATUS_LABELS,
    )?;
    registry.register_gauge(
        RESPONSE_TIME,
        "Most recent response time of the monitor in milliseconds",
        &RESPONSE_TIME_LABELS,
    )?;
    Ok(())
}
