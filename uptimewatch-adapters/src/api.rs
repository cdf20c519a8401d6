//! The remote API seam used by the pollers.

use std::sync::Arc;

use async_trait::async_trait;
use uptimewatch_types::{AccountSnapshot, MonitorSnapshot};

use crate::AdapterError;

/// A source of account and monitor state.
///
/// Implemented by the real HTTP clients and by scripted fakes in tests.
/// Implementations hold their own credentials.
#[async_trait]
pub trait UptimeApi: Send + Sync {
    /// Fetch account-level aggregate counters.
    async fn account_details(&self) -> Result<AccountSnapshot, AdapterError>;

    /// Fetch every monitor together with its most recent latency sample.
    async fn monitors(&self) -> Result<MonitorSnapshot, AdapterError>;
}

#[async_trait]
impl<T: UptimeApi + ?Sized> UptimeApi for Arc<T> {
    async fn account_details(&self) -> Result<AccountSnapshot, AdapterError> {
        (**self).account_details().await
    }

    async fn monitors(&self) -> Result<MonitorSnapshot, AdapterError> {
        (**self).monitors().await
    }
}
