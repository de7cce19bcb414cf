//! paletted - color palette server
//!
//! A REST backend for palettes, favorites and palette-constrained image
//! generation through Stability AI.

pub mod api;
pub mod auth;
pub mod cache;
pub mod color;
pub mod config;
pub mod db;
pub mod generation;
pub mod init;
pub mod palettes;
pub mod prompt;
pub mod stability;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use api::AppState;
use cache::ResultCache;
pub use config::Config;
use db::Database;
use generation::GenerationService;
use stability::{ImageProvider, StabilityClient};

/// The paletted server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance.
    ///
    /// Fails before binding anything when the Stability API key is missing.
    pub async fn new(config: Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let provider = StabilityClient::new(api_key, config.stability_api_url.clone())?;
        info!("Stability AI endpoint: {}", provider.api_url());

        let cache = cache::connect(config.redis_url.as_deref()).await;
        Self::with_services(config, cache, Arc::new(provider)).await
    }

    /// Create a server around an explicit cache and image provider
    pub async fn with_services(
        config: Config,
        cache: Arc<dyn ResultCache>,
        provider: Arc<dyn ImageProvider>,
    ) -> Result<Self> {
        let db = Arc::new(Database::new(config.db_path.as_deref()).await?);
        let state = AppState::new(db.clone(), GenerationService::new(cache, provider));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db,
            state,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("paletted listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("paletted shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
