//! # uptimewatch-types
//!
//! Core types shared by the uptimewatch crates. They describe what the
//! UptimeRobot API reports on one poll cycle, independent of the wire format
//! and of how the values are later published as metrics.
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for all public types
//!
//! ## Example
//!
//! ```rust
//! use uptimewatch_types::{MonitorSnapshot, MonitorStatus};
//!
//! let snapshot = MonitorSnapshot::builder()
//!     .monitor("api", |m| {
//!         m.url("https://api.example.com/health")
//!          .interval(60)
//!          .status(2)
//!          .latency(132)
//!     })
//!     .monitor("blog", |m| m.url("https://blog.example.com").status(9))
//!     .build();
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.get("api").unwrap().status(), MonitorStatus::Up);
//! ```

mod account;
mod monitor;
mod snapshot;

pub use account::*;
pub use monitor::*;
pub use snapshot::*;
