//! Prometheus exposition endpoint.
//!
//! Serves the contents of a [`Registry`] in the Prometheus text-based
//! exposition format, plus a static liveness endpoint.
//!
//! ## Example
//!
//! ```rust,no_run
//! use uptimewatch_sdk::prometheus::{ExporterConfig, MetricsServer};
//! use uptimewatch_sdk::Registry;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let registry = Registry::new();
//!     let config = ExporterConfig::builder()
//!         .listen_addr("0.0.0.0:9705")
//!         .build();
//!
//!     let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//!     let server = MetricsServer::bind(config, registry).await?;
//!
//!     // Metrics available at http://localhost:9705/metrics
//!     server.serve(stop_rx).await
//! }
//! ```

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::Registry;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for the exposition endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Address to listen on (e.g., "0.0.0.0:9705")
    pub listen_addr: String,
    /// Path for metrics endpoint (e.g., "/metrics")
    pub metrics_path: String,
    /// Path for the liveness endpoint (e.g., "/health")
    pub health_path: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9705".to_string(),
            metrics_path: "/metrics".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

impl ExporterConfig {
    /// Create a new builder for ExporterConfig.
    pub fn builder() -> ExporterConfigBuilder {
        ExporterConfigBuilder::default()
    }
}

/// Builder for ExporterConfig.
#[derive(Debug, Default)]
pub struct ExporterConfigBuilder {
    listen_addr: Option<String>,
    metrics_path: Option<String>,
    health_path: Option<String>,
}

impl ExporterConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the metrics path.
    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Set the liveness path.
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Build the ExporterConfig.
    pub fn build(self) -> ExporterConfig {
        let defaults = ExporterConfig::default();
        ExporterConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            metrics_path: self.metrics_path.unwrap_or(defaults.metrics_path),
            health_path: self.health_path.unwrap_or(defaults.health_path),
        }
    }
}

/// A bound exposition server.
///
/// Binding and serving are separate steps so a bind failure surfaces at
/// startup, before any background work is spawned.
#[derive(Debug)]
pub struct MetricsServer {
    listener: TcpListener,
    config: Arc<ExporterConfig>,
    registry: Registry,
}

impl MetricsServer {
    /// Bind the listening socket.
    pub async fn bind(config: ExporterConfig, registry: Registry) -> io::Result<Self> {
        let listener = TcpListener::bind(config.listen_addr.as_str()).await?;
        Ok(Self {
            listener,
            config: Arc::new(config),
            registry,
        })
    }

    /// The address actually bound (useful when listening on port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips to `true` or its sender is
    /// dropped.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> io::Result<()> {
        info!(
            addr = %self.local_addr()?,
            metrics_path = %self.config.metrics_path,
            "metrics server listening"
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    debug!(%peer, "accepted scrape connection");

                    let io = TokioIo::new(stream);
                    let config = self.config.clone();
                    let registry = self.registry.clone();

                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                            let response = handle_request(&req, &config, &registry);
                            async move { Ok::<_, Infallible>(response) }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            debug!(%peer, error = %e, "scrape connection error");
                        }
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("metrics server shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

fn handle_request<B>(
    req: &Request<B>,
    config: &ExporterConfig,
    registry: &Registry,
) -> Response<Full<Bytes>> {
    let path = req.uri().path();
    let known = path == config.metrics_path || path == config.health_path;

    if known && req.method() != Method::GET && req.method() != Method::HEAD {
        return text_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed".to_string(),
        );
    }

    if path == config.metrics_path {
        text_response(StatusCode::OK, EXPOSITION_CONTENT_TYPE, registry.render())
    } else if path == config.health_path {
        text_response(StatusCode::OK, "text/plain", "OK".to_string())
    } else {
        text_response(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string())
    }
}

fn text_response(
    status: StatusCode,
    content_type: &'static str,
    body: String,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    fn test_registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_gauge("uptimerobot_up_monitors", "Up monitors", &[])
            .unwrap();
        registry
            .set_gauge("uptimerobot_up_monitors", &[], 3.0)
            .unwrap();
        registry
    }

    #[test]
    fn test_exporter_config_builder() {
        let config = ExporterConfig::builder()
            .listen_addr("127.0.0.1:8080")
            .metrics_path("/custom-metrics")
            .health_path("/healthz")
            .build();

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.metrics_path, "/custom-metrics");
        assert_eq!(config.health_path, "/healthz");
    }

    #[test]
    fn test_exporter_config_defaults() {
        let config = ExporterConfig::default();

        assert_eq!(config.listen_addr, "0.0.0.0:9705");
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.health_path, "/health");
    }

    #[test]
    fn test_metrics_response() {
        let response = handle_request(
            &request(Method::GET, "/metrics"),
            &ExporterConfig::default(),
            &test_registry(),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            EXPOSITION_CONTENT_TYPE
        );
    }

    #[test]
    fn test_health_and_not_found() {
        let config = ExporterConfig::default();
        let registry = test_registry();

        let health = handle_request(&request(Method::GET, "/health"), &config, &registry);
        assert_eq!(health.status(), StatusCode::OK);

        let missing = handle_request(&request(Method::GET, "/nope"), &config, &registry);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let post = handle_request(&request(Method::POST, "/metrics"), &config, &registry);
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_server_serves_registry_and_stops() {
        let registry = test_registry();
        let config = ExporterConfig::builder().listen_addr("127.0.0.1:0").build();
        let server = MetricsServer::bind(config, registry.clone()).await.unwrap();
        let addr = server.local_addr().unwrap();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(server.serve(stop_rx));

        let metrics = http_get(addr, "/metrics").await;
        assert!(metrics.starts_with("HTTP/1.1 200"));
        assert!(metrics.contains("uptimerobot_up_monitors 3"));

        // Later writes are visible to the next scrape.
        registry
            .set_gauge("uptimerobot_up_monitors", &[], 5.0)
            .unwrap();
        let metrics = http_get(addr, "/metrics").await;
        assert!(metrics.contains("uptimerobot_up_monitors 5"));

        let health = http_get(addr, "/health").await;
        assert!(health.starts_with("HTTP/1.1 200"));
        assert!(health.ends_with("OK"));

        stop_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let first = MetricsServer::bind(
            ExporterConfig::builder().listen_addr("127.0.0.1:0").build(),
            Registry::new(),
        )
        .await
        .unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let second =
            MetricsServer::bind(ExporterConfig::builder().listen_addr(taken).build(), Registry::new())
                .await;
        assert!(second.is_err());
    }
}
