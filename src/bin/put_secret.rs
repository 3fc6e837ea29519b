// src/bin/put_secret.rs
use std::env;
use anyhow::{bail, Result};
use dotenv::dotenv;
use log::info;
use property_analyzer::config::AppConfig;
use property_analyzer::services::secrets::SecretManager;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [name, value] = args.as_slice() else {
        bail!("usage: put_secret <SECRET_NAME> <VALUE>");
    };

    let config = AppConfig::from_env()?;
    let manager = SecretManager::from_settings(&config.secrets)?;

    if !manager.create_secret(name, value).await {
        bail!("failed to create secret {}", name);
    }
    info!("Secret {} stored; reading it back", name);

    match manager.get_secret(name, "latest").await {
        Some(stored) if stored == *value => println!("Secret {} stored and verified", name),
        Some(_) => bail!("secret {} read back with a different value", name),
        None => bail!("secret {} could not be read back", name),
    }
    Ok(())
}
