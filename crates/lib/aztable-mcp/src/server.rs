//! MCP server runners for aztable-mcp.
//!
//! Every runner takes a shutdown future. When it resolves the endpoint is
//! closed and the runner returns `Ok(())`, whether or not a client ever
//! completed the MCP handshake.

use std::net::{Ipv4Addr, SocketAddr};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use aztable_core::control::TableControlPlane;
use aztable_core::store::TableStore;
use rmcp::RoleServer;
use rmcp::serve_server;
use rmcp::transport::IntoTransport;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::AzTableMcp;

pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// How long open HTTP connections get to finish once shutdown starts.
pub const HTTP_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, 4020)))
    }
}

/// Returns a token that is cancelled on the first ctrl-c.
///
/// Call this as early as possible so the signal handler is installed before
/// any transport starts waiting on a client.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received");
                trigger.cancel();
            }
            Err(err) => {
                warn!(error = %err, "unable to listen for ctrl-c; shutdown must come from the peer");
            }
        }
    });
    token
}

/// Serves the MCP server over stdio until the peer disconnects or `shutdown` resolves.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<S: TableStore>(
    control: TableControlPlane<S>,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), ServeError> {
    serve_transport(control, stdio(), shutdown).await
}

/// Serves the MCP server over any rmcp transport until the peer disconnects
/// or `shutdown` resolves.
///
/// # Errors
/// Returns a handshake error from the peer, or a join error from the service task.
pub async fn serve_transport<S, T, E, A>(
    control: TableControlPlane<S>,
    transport: T,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), ServeError>
where
    S: TableStore,
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut shutdown = pin!(shutdown);
    let service = AzTableMcp::new(control);

    let running = tokio::select! {
        running = serve_server(service, transport) => running?,
        () = &mut shutdown => {
            info!("shutdown requested before the MCP handshake completed");
            return Ok(());
        }
    };
    info!("MCP endpoint ready");

    let cancel = running.cancellation_token();
    let mut waiting = pin!(running.waiting());
    let reason = tokio::select! {
        reason = &mut waiting => reason?,
        () = &mut shutdown => {
            info!("shutdown requested, closing MCP endpoint");
            cancel.cancel();
            waiting.await?
        }
    };
    info!(?reason, "MCP endpoint closed");
    Ok(())
}

/// Binds `config.addr` and serves streamable HTTP until `shutdown` resolves.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<S: TableStore>(
    control: TableControlPlane<S>,
    config: McpHttpServerConfig,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), ServeError> {
    let listener = TcpListener::bind(config.addr).await?;
    serve_http_listener(control, listener, &config, shutdown).await
}

/// Serves streamable HTTP on an already bound listener until `shutdown` resolves.
///
/// Shutdown cancels every MCP session, which ends open SSE streams, then
/// waits up to [`HTTP_DRAIN_TIMEOUT`] for connections to close.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_http_listener<S: TableStore>(
    control: TableControlPlane<S>,
    listener: TcpListener,
    config: &McpHttpServerConfig,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), ServeError> {
    let sessions = CancellationToken::new();
    let service: StreamableHttpService<AzTableMcp<S>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(AzTableMcp::new(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                stateful_mode: config.stateful_mode,
                cancellation_token: sessions.child_token(),
                ..Default::default()
            },
        );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service);
    let addr = listener.local_addr()?;
    info!(%addr, "MCP streamable HTTP endpoint listening");

    let mut server = pin!(
        axum::serve(listener, app)
            .with_graceful_shutdown(sessions.clone().cancelled_owned())
            .into_future()
    );
    tokio::select! {
        result = &mut server => result?,
        () = shutdown => {
            info!("shutdown requested, draining MCP HTTP endpoint");
            sessions.cancel();
            match tokio::time::timeout(HTTP_DRAIN_TIMEOUT, server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    timeout = ?HTTP_DRAIN_TIMEOUT,
                    "MCP HTTP connections still open after drain timeout, closing"
                ),
            }
        }
    }
    info!("MCP HTTP endpoint closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_config_binds_loopback() {
        let config = McpHttpServerConfig::default();

        assert_eq!(config.addr, "127.0.0.1:4020".parse::<SocketAddr>().unwrap());
        assert!(config.stateful_mode);
        assert_eq!(config.sse_keep_alive, Some(Duration::from_secs(15)));
    }

    #[test]
    fn builders_override_defaults() {
        let config = McpHttpServerConfig::default()
            .with_stateful_mode(false)
            .with_sse_keep_alive(None);

        assert!(!config.stateful_mode);
        assert!(config.sse_keep_alive.is_none());
    }
}
