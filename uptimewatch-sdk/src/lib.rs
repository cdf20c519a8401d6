//! # uptimewatch-sdk
//!
//! Gauge registry and Prometheus exposition for uptimewatch.
//!
//! The [`Registry`] holds labeled gauge families that pollers update as
//! remote state changes. The optional `prometheus` feature adds an HTTP
//! server that renders the registry for scraping.
//!
//! ## Quick Start
//!
//! ```rust
//! use uptimewatch_sdk::Registry;
//!
//! let registry = Registry::new();
//! registry
//!     .register_gauge(
//!         "uptimerobot_monitors_status",
//!         "Monitor status code",
//!         &["url", "friendly_name", "interval"],
//!     )
//!     .unwrap();
//!
//! registry
//!     .set_gauge(
//!         "uptimerobot_monitors_status",
//!         &["https://example.com", "example", "300"],
//!         2.0,
//!     )
//!     .unwrap();
//!
//! assert!(registry.render().contains("friendly_name=\"example\""));
//! ```
//!
//! ## Features
//!
//! - **Explicit handle**: no global registry, clone and pass it around
//! - **Atomic scrapes**: a render never observes a half-applied mutation
//! - **Injectable**: pollers write through the [`GaugeStore`] trait

mod error;
mod registry;

#[cfg(feature = "prometheus")]
pub mod prometheus;

pub use error::RegistryError;
pub use registry::{GaugeStore, Registry};

#[cfg(feature = "prometheus")]
pub use prometheus::{ExporterConfig, MetricsServer};
