//! Web server for eforice.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::router::create_router;
use crate::app::AppContext;
use crate::{EforiceError, Result};

/// HTTP server bound to the configured address.
pub struct WebServer {
    addr: SocketAddr,
    ctx: Arc<AppContext>,
}

impl WebServer {
    /// Create a server for the given context.
    pub fn new(ctx: Arc<AppContext>) -> Result<Self> {
        let server = &ctx.config.server;
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                EforiceError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        Ok(Self { addr, ctx })
    }

    /// Configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let router = create_router(self.ctx.clone());
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Web server stopped");
        self.ctx.db.close().await;
        Ok(())
    }

    /// Serve in the background and return the bound address.
    ///
    /// Binding port 0 picks a free port, which is what tests want.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = create_router(self.ctx);
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
