//! Crop recommender - Entry Point
//!
//! Web service that recommends a crop from soil and climate measurements,
//! behind username/password accounts.

use log::{error, info};

use crop_recommender::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching crop recommender...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration: {:?}", config);

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
