use axum::Router;
use log::{info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::auth::{CredentialHasher, CredentialStore};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::model::RecommendationService;
use crate::server::routes::{AppState, build_router};

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Opens the credential store, trains the classifier, and binds the
    /// listener. Any failure here is fatal: nothing is served until the
    /// model is ready.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let hasher = CredentialHasher::from_config(&config.auth)?;
        let store = CredentialStore::open(config.auth.users_path(), hasher)?;

        info!(
            "Training classifier on {} (this may take a while)",
            config.model.dataset_file
        );
        let model_config = config.model.clone();
        let service =
            tokio::task::spawn_blocking(move || RecommendationService::from_config(&model_config))
                .await
                .map_err(|e| ServerError::Task(e.to_string()))??;

        let state = AppState::new(store, service, &config.auth);

        let socket = config.server.listen_socket();
        let listener = TcpListener::bind(&socket).await?;
        info!("Server bound to {}", socket);

        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until Ctrl-C, then let in-flight requests finish.
    pub async fn start(self) -> Result<(), ServerError> {
        info!("Starting crop recommender on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
