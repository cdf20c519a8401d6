//! # uptimewatch
//!
//! A Prometheus exporter that mirrors UptimeRobot account and monitor state.
//!
//! Two independent loops poll the UptimeRobot API on a fixed interval and
//! write into a shared gauge [`Registry`](uptimewatch_sdk::Registry), which
//! is rendered on demand at `/metrics`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Exporter                            │
//! │  ┌────────────────┐                                          │
//! │  │ AccountPoller  │───┐                                      │
//! │  └────────────────┘   │   ┌──────────┐    ┌───────────────┐  │
//! │                       ├──▶│ Registry │◀───│ MetricsServer │◀─┼── scrape
//! │  ┌────────────────┐   │   └──────────┘    └───────────────┘  │
//! │  │ MonitorRecon.  │───┘                                      │
//! │  └────────────────┘                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, file, env, flags)
//! - **[`poller`]**: the account poller, the monitor reconciler and the
//!   cancellable periodic runner
//! - **[`metrics`]**: exported gauge family names and registration
//! - **[`logging`]**: tracing subscriber setup
//!
//! ## Usage
//!
//! ```bash
//! uptimewatch --api-key u1234567-abcdef --port 9705 --interval 30
//!
//! # or through the environment
//! UPTIMEROBOT_API_KEY=u1234567-abcdef uptimewatch
//! ```

pub mod exporter;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod settings;

pub use exporter::Exporter;
pub use poller::{AccountPoller, CycleReport, MonitorReconciler, Poller, SkipReason};
pub use settings::{Args, Settings, SettingsError};
