//! API server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use remindd_config::ServerConfig;

use crate::monitoring;
use crate::routes::build_router;
use crate::state::AppState;

/// The HTTP API server.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> io::Result<()> {
        monitoring::init_start_time();
        let app = build_router(self.state.clone());

        let addr: SocketAddr = self
            .addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;

        info!("API server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
                info!("API server shutting down");
            })
            .await
    }
}
