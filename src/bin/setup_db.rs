// src/bin/setup_db.rs
use std::env;
use std::error::Error;
use std::fs;
use dotenv::dotenv;
use log::info;
use property_analyzer::config::AppConfig;
use property_analyzer::models::PropertyInput;
use property_analyzer::services::db::DbStore;
use property_analyzer::services::store::PropertyStore;

/// Creates the document table. An optional argument names a JSON file with
/// an array of properties to load.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let database_url = config.database_url.ok_or("DATABASE_URL must be set")?;

    let store = DbStore::new(&database_url, config.collections).await?;
    store.ensure_schema().await?;
    info!("Document table ready");

    if let Some(path) = env::args().nth(1) {
        let inputs: Vec<PropertyInput> = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let total = inputs.len();
        for input in inputs {
            let property = input.validate()?;
            let id = store.save_property(&property).await?;
            info!("Loaded {} as {}", property.address, id);
        }
        info!("Loaded {} properties from {}", total, path);
    }

    println!("Database setup complete!");
    Ok(())
}
