use std::sync::Arc;

use tracing::info;

use cirrus::storage::S3Store;
use cirrus::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = cirrus::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cirrus::logging::init_console_only(&config.logging.level);
    }

    info!("Cirrus - personal cloud storage");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            eprintln!("Failed to open database at {}: {e}", config.database.path);
            std::process::exit(1);
        }
    };
    info!("database ready at {}", config.database.path);

    let store = match S3Store::open(&config.storage) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to configure object storage: {e}");
            std::process::exit(1);
        }
    };
    info!("object storage bucket: {}", config.storage.bucket);

    let server = match WebServer::new(&config, db, store) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure web server: {e}");
            std::process::exit(1);
        }
    };

    info!("serving on {}", server.addr());
    if let Err(e) = server.serve().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
