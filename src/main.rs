use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use log::{info, warn};
use warp::Filter;

use property_analyzer::config::AppConfig;
use property_analyzer::handlers::AppState;
use property_analyzer::routes;
use property_analyzer::services::db::DbStore;
use property_analyzer::services::secrets::load_api_keys;
use property_analyzer::services::store::{MemoryStore, PropertyStore};

/// A missing or unreachable store is not fatal: the API still analyzes,
/// and store-backed routes answer 503.
async fn build_store(config: &AppConfig) -> Option<Arc<dyn PropertyStore>> {
    if let Some(database_url) = &config.database_url {
        let store = match DbStore::new(database_url, config.collections.clone()).await {
            Ok(store) => store,
            Err(e) => {
                warn!("Document store not initialized: {}", e);
                return None;
            }
        };
        if let Err(e) = store.ensure_schema().await {
            warn!("Document store schema check failed: {}", e);
            return None;
        }
        let store: Arc<dyn PropertyStore> = Arc::new(store);
        return Some(store);
    }

    if config.use_memory_store {
        info!("Using in-memory document store; data is lost on restart");
        let store: Arc<dyn PropertyStore> = Arc::new(MemoryStore::new());
        return Some(store);
    }

    warn!("DATABASE_URL not set, document store disabled");
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    info!(
        "Loaded config: environment={}, port={}, collections={:?}",
        config.environment, config.port, config.collections
    );

    let api_keys = load_api_keys(&config.secrets).await;
    info!("Listing provider keys available: {:?}", api_keys.configured());

    let store = build_store(&config).await;
    let state = AppState::new(store, config.environment);

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    let api = routes::routes(state).with(cors).with(warp::log("property_analyzer::http"));
    info!("Routes configured successfully with CORS.");

    let (bound, server) = warp::serve(api).bind_with_graceful_shutdown(addr, async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
    });
    info!("Starting server on {}", bound);
    server.await;

    Ok(())
}
