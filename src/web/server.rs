//! Web server for Cirrus.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::JwtState;
use crate::config::Config;
use crate::db::Database;
use crate::storage::BlobStore;
use crate::{CirrusError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server from configuration.
    pub fn new(config: &Config, db: Arc<Database>, store: Arc<dyn BlobStore>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| CirrusError::Config(format!("invalid server address: {e}")))?;

        let app_state = AppState::new(
            db,
            store,
            &config.auth.jwt_secret,
            config.auth.token_expiry_secs,
            config.quota.default_limit_bytes(),
            config.server.max_upload_size_mb as usize * 1024 * 1024,
        );

        let jwt_state = Arc::new(JwtState::new(&config.auth.jwt_secret));

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// The address the server will bind to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the complete router, API plus health check.
    pub fn router(&self) -> axum::Router {
        create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("web server listening on {}", self.addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| CirrusError::Io(e))?;

        Ok(())
    }
}
