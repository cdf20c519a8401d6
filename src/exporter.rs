use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::error;
use uptimewatch_adapters::uptimerobot::UptimeRobotClient;
use uptimewatch_adapters::UptimeApi;
use uptimewatch_sdk::{ExporterConfig, MetricsServer, Registry};

use crate::metrics;
use crate::poller::{self, AccountPoller, MonitorReconciler};
use crate::settings::Settings;

/// The assembled exporter: a bound metrics server plus both pollers.
///
/// Building binds the listening socket, so configuration and bind errors
/// surface before anything starts polling.
pub struct Exporter {
    server: MetricsServer,
    account: AccountPoller<Registry>,
    monitors: MonitorReconciler<Registry>,
    interval: Duration,
}

impl Exporter {
    /// Build an exporter that talks to the UptimeRobot API.
    pub async fn build(settings: &Settings) -> Result<Self> {
        let mut client = UptimeRobotClient::builder()
            .api_key(settings.api_key.as_str())
            .endpoint(settings.endpoint.as_str());
        if let Some(timeout) = settings.request_timeout() {
            client = client.timeout(timeout);
        }
        let client = client.build().context("failed to build UptimeRobot client")?;

        Self::with_api(settings, Arc::new(client)).await
    }

    /// Build an exporter around any [`UptimeApi`] implementation.
    pub async fn with_api(settings: &Settings, api: Arc<dyn UptimeApi>) -> Result<Self> {
        let registry = Registry::new();
        metrics::register_all(&registry).context("failed to register metrics")?;

        let config = ExporterConfig::builder()
            .listen_addr(settings.listen_addr())
            .build();
        let server = MetricsServer::bind(config, registry.clone())
            .await
            .with_context(|| format!("failed to bind {}", settings.listen_addr()))?;

        Ok(Self {
            account: AccountPoller::new(api.clone(), registry.clone()),
            monitors: MonitorReconciler::new(api, registry)
                .with_empty_confirmations(settings.empty_confirmations),
            server,
            interval: settings.poll_interval(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.server.local_addr()
    }

    /// Poll and serve until `shutdown` becomes `true`.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let account = poller::spawn(self.account, self.interval, shutdown.clone());
        let monitors = poller::spawn(self.monitors, self.interval, shutdown.clone());

        let served = self.server.serve(shutdown).await;
        if served.is_err() {
            account.abort();
            monitors.abort();
        }

        for (name, handle) in [("account", account), ("monitors", monitors)] {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!(poller = name, error = %e, "poller task failed");
                }
            }
        }

        served.context("metrics server failed")
    }
}
