//! # uptimewatch-adapters
//!
//! Adapters that fetch monitor state from remote uptime-monitoring services
//! and convert it into [`uptimewatch_types`] records.
//!
//! ## Supported Services
//!
//! - **UptimeRobot** (`uptimerobot` feature) - account details and monitor
//!   list with the most recent response-time sample, via the v2 HTTP API
//!
//! ## Quick Start (UptimeRobot)
//!
//! ```rust,no_run
//! use uptimewatch_adapters::uptimerobot::UptimeRobotClient;
//! use uptimewatch_adapters::UptimeApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = UptimeRobotClient::builder()
//!         .api_key("u1234567-abcdef")
//!         .build()?;
//!
//!     let snapshot = client.monitors().await?;
//!     println!("Collected {} monitors", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;

#[cfg(feature = "uptimerobot")]
pub mod uptimerobot;

pub use api::UptimeApi;
pub use error::AdapterError;

// Re-export types for convenience
pub use uptimewatch_types::{AccountSnapshot, LatencySample, MonitorRecord, MonitorSnapshot};
