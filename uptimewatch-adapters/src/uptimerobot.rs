//! UptimeRobot adapter using the v2 HTTP API.
//!
//! Every call is a form-encoded `POST` carrying the API key and
//! `format=json`. Responses are JSON objects with a `stat` field that is
//! `"ok"` on success and `"fail"` alongside an `error` object otherwise.
//!
//! ## Endpoints Used
//!
//! - `getAccountDetails`: aggregate monitor counters and plan limits
//! - `getMonitors`: every monitor, paginated, with `response_times=1` and
//!   `response_times_limit=1` so only the latest latency sample is returned
//!
//! ## Example
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
//!     let account = client.account_details().await?;
//!     println!("{} up, {} down", account.up_monitors, account.down_monitors);
//!
//!     for monitor in &client.monitors().await? {
//!         println!("{}: {}", monitor.friendly_name, monitor.status());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use uptimewatch_types::{AccountSnapshot, LatencySample, MonitorRecord, MonitorSnapshot};

use crate::{AdapterError, UptimeApi};

/// Public API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.uptimerobot.com";

/// Largest page `getMonitors` will return.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Client for the UptimeRobot v2 API.
#[derive(Clone)]
pub struct UptimeRobotClient {
    client: Client,
    endpoint: String,
    api_key: String,
    page_size: u32,
}

impl fmt::Debug for UptimeRobotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UptimeRobotClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl UptimeRobotClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> UptimeRobotClientBuilder {
        UptimeRobotClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_account(&self) -> Result<AccountSnapshot, AdapterError> {
        let body = self.post("getAccountDetails", &[]).await?;
        decode_account(&body)
    }

    async fn fetch_monitors(&self) -> Result<MonitorSnapshot, AdapterError> {
        let mut monitors: Vec<MonitorRecord> = Vec::new();

        loop {
            let page = self.fetch_monitor_page(monitors.len()).await?;
            let received = page.monitors.len();
            monitors.extend(page.monitors);

            match page.total {
                Some(total) if received > 0 && (monitors.len() as u64) < total => continue,
                _ => break,
            }
        }

        Ok(MonitorSnapshot::new(monitors))
    }

    async fn fetch_monitor_page(&self, offset: usize) -> Result<MonitorPage, AdapterError> {
        let form = [
            ("response_times", "1".to_string()),
            ("response_times_limit", "1".to_string()),
            ("offset", offset.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        let body = self.post("getMonitors", &form).await?;
        decode_monitors(&body)
    }

    async fn post(&self, method: &str, extra: &[(&str, String)]) -> Result<Vec<u8>, AdapterError> {
        let url = format!("{}/v2/{}", self.endpoint, method);

        let mut form: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str()), ("format", "json")];
        form.extend(extra.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self.client.post(&url).form(&form).send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterError::Auth("Invalid API key".to_string()));
        }

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl UptimeApi for UptimeRobotClient {
    async fn account_details(&self) -> Result<AccountSnapshot, AdapterError> {
        self.fetch_account().await
    }

    async fn monitors(&self) -> Result<MonitorSnapshot, AdapterError> {
        self.fetch_monitors().await
    }
}

/// Builder for UptimeRobotClient.
#[derive(Debug, Default)]
pub struct UptimeRobotClientBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    timeout: Option<Duration>,
    page_size: Option<u32>,
}

impl UptimeRobotClientBuilder {
    /// Set the API key sent with every request. Required.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL (default: "https://api.uptimerobot.com").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a request timeout. Without one the transport defaults apply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the `getMonitors` page size (clamped to 1..=50, default 50).
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<UptimeRobotClient, AdapterError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AdapterError::Auth("missing API key".to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(UptimeRobotClient {
            client,
            endpoint,
            api_key,
            page_size: self.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }
}

/// One page of a `getMonitors` response.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorPage {
    pub monitors: Vec<MonitorRecord>,
    /// Total number of monitors on the account, when the API paginates.
    pub total: Option<u64>,
}

/// Decode a `getAccountDetails` response body.
pub fn decode_account(body: &[u8]) -> Result<AccountSnapshot, AdapterError> {
    let response: AccountDetailsResponse =
        serde_json::from_slice(body).map_err(|e| AdapterError::Parse(e.to_string()))?;
    check_stat(&response.stat, response.error)?;

    let account = response
        .account
        .ok_or_else(|| AdapterError::Parse("response has no account object".to_string()))?;

    Ok(AccountSnapshot {
        email: account.email.unwrap_or_default(),
        user_id: account.user_id.unwrap_or(0),
        firstname: account.firstname.unwrap_or_default(),
        sms_credits: account.sms_credits.unwrap_or(0),
        payment_processor: account.payment_processor.unwrap_or(0),
        payment_period: account.payment_period.unwrap_or(0),
        subscription_expiry_date: account.subscription_expiry_date,
        monitor_limit: account.monitor_limit.unwrap_or(0),
        monitor_interval: account.monitor_interval.unwrap_or(0),
        up_monitors: account.up_monitors.unwrap_or(0),
        down_monitors: account.down_monitors.unwrap_or(0),
        paused_monitors: account.paused_monitors.unwrap_or(0),
    })
}

/// Decode a `getMonitors` response body.
///
/// A successful response without a `monitors` array is an empty page, not an
/// error.
pub fn decode_monitors(body: &[u8]) -> Result<MonitorPage, AdapterError> {
    let response: MonitorsResponse =
        serde_json::from_slice(body).map_err(|e| AdapterError::Parse(e.to_string()))?;
    check_stat(&response.stat, response.error)?;

    let pagination = response.pagination.unwrap_or_default();
    let monitors = response
        .monitors
        .unwrap_or_default()
        .into_iter()
        .map(MonitorInfo::into_record)
        .collect();

    Ok(MonitorPage {
        monitors,
        total: pagination.total,
    })
}

fn check_stat(stat: &str, error: Option<ErrorInfo>) -> Result<(), AdapterError> {
    if stat.eq_ignore_ascii_case("ok") {
        return Ok(());
    }

    let error = error.unwrap_or_default();
    Err(AdapterError::Api {
        kind: error.kind.unwrap_or_else(|| "unknown".to_string()),
        message: error
            .message
            .unwrap_or_else(|| format!("stat was {:?}", stat)),
    })
}

#[derive(Debug, Deserialize)]
struct AccountDetailsResponse {
    stat: String,
    error: Option<ErrorInfo>,
    account: Option<AccountInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorInfo {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Account object. The API sends `null` for several of these on free plans.
#[derive(Debug, Deserialize)]
struct AccountInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_id: Option<u64>,
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    sms_credits: Option<i64>,
    #[serde(default)]
    payment_processor: Option<i64>,
    #[serde(default)]
    payment_period: Option<i64>,
    #[serde(default)]
    subscription_expiry_date: Option<String>,
    #[serde(default)]
    monitor_limit: Option<u32>,
    #[serde(default)]
    monitor_interval: Option<u32>,
    #[serde(default)]
    up_monitors: Option<u32>,
    #[serde(default)]
    down_monitors: Option<u32>,
    #[serde(default)]
    paused_monitors: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MonitorsResponse {
    stat: String,
    error: Option<ErrorInfo>,
    pagination: Option<Pagination>,
    monitors: Option<Vec<MonitorInfo>>,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MonitorInfo {
    id: u64,
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    url: String,
    #[serde(default, rename = "type")]
    monitor_type: u32,
    #[serde(default)]
    interval: u32,
    #[serde(default)]
    status: u32,
    #[serde(default)]
    response_times: Option<Vec<ResponseTime>>,
}

impl MonitorInfo {
    fn into_record(self) -> MonitorRecord {
        MonitorRecord {
            id: self.id,
            friendly_name: self.friendly_name,
            url: self.url,
            monitor_type: self.monitor_type,
            interval: self.interval,
            status_code: self.status,
            latency: self
                .response_times
                .unwrap_or_default()
                .into_iter()
                .map(|rt| LatencySample {
                    datetime: rt.datetime,
                    value: rt.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseTime {
    #[serde(default)]
    datetime: i64,
    value: u64,
}
