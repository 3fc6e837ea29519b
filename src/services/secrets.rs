// src/services/secrets.rs
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::SecretSettings;
use super::google_oauth::{fetch_access_token, ServiceAccountKey, CLOUD_PLATFORM_SCOPE};

const SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com/v1";

#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: String,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct CreatedSecret {
    name: String,
}

/// Client for Google Cloud Secret Manager, authenticated with a service
/// account key.
pub struct SecretManager {
    project_id: String,
    key: ServiceAccountKey,
    client: Client,
}

impl SecretManager {
    pub fn new(project_id: &str, credentials_path: &str) -> Result<Self> {
        if project_id.trim().is_empty() {
            return Err(anyhow!("GOOGLE_CLOUD_PROJECT environment variable must be set"));
        }
        let key = ServiceAccountKey::from_file(credentials_path)?;
        Ok(SecretManager {
            project_id: project_id.to_string(),
            key,
            client: Client::new(),
        })
    }

    pub fn from_settings(settings: &SecretSettings) -> Result<Self> {
        match (&settings.project_id, &settings.credentials_path) {
            (Some(project), Some(path)) => Self::new(project, path),
            (None, _) => Err(anyhow!("GOOGLE_CLOUD_PROJECT environment variable must be set")),
            (_, None) => Err(anyhow!("GOOGLE_APPLICATION_CREDENTIALS environment variable must be set")),
        }
    }

    fn version_path(&self, secret_name: &str, version: &str) -> String {
        format!(
            "{}/projects/{}/secrets/{}/versions/{}:access",
            SECRET_MANAGER_URL, self.project_id, secret_name, version
        )
    }

    async fn token(&self) -> Result<String> {
        fetch_access_token(&self.client, &self.key, CLOUD_PLATFORM_SCOPE).await
    }

    async fn access_secret(&self, secret_name: &str, version: &str) -> Result<String> {
        let token = self.token().await?;
        let response = self.client
            .get(self.version_path(secret_name, version))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json::<AccessSecretVersionResponse>()
            .await?;

        let bytes = STANDARD.decode(response.payload.data)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Reads a secret version ("latest" for the newest). Failures are logged
    /// and reported as `None`.
    pub async fn get_secret(&self, secret_name: &str, version: &str) -> Option<String> {
        match self.access_secret(secret_name, version).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Error retrieving secret {}: {}", secret_name, e);
                None
            }
        }
    }

    async fn create_secret_with_value(&self, secret_name: &str, secret_value: &str) -> Result<()> {
        let token = self.token().await?;

        let secret = self.client
            .post(format!("{}/projects/{}/secrets", SECRET_MANAGER_URL, self.project_id))
            .query(&[("secretId", secret_name)])
            .bearer_auth(&token)
            .json(&json!({ "replication": { "automatic": {} } }))
            .send()
            .await?
            .error_for_status()?
            .json::<CreatedSecret>()
            .await?;

        self.client
            .post(format!("{}/{}:addVersion", SECRET_MANAGER_URL, secret.name))
            .bearer_auth(&token)
            .json(&json!({ "payload": { "data": STANDARD.encode(secret_value) } }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Creates a secret with automatic replication and stores `secret_value`
    /// as its first version.
    pub async fn create_secret(&self, secret_name: &str, secret_value: &str) -> bool {
        match self.create_secret_with_value(secret_name, secret_value).await {
            Ok(()) => {
                info!("Created secret {}", secret_name);
                true
            }
            Err(e) => {
                error!("Error creating secret {}: {}", secret_name, e);
                false
            }
        }
    }
}

/// Keys for the listing providers. Empty when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub zillow: String,
    pub redfin: String,
    pub realtor: String,
}

impl ApiKeys {
    pub fn configured(&self) -> Vec<&'static str> {
        [("zillow", &self.zillow), ("redfin", &self.redfin), ("realtor", &self.realtor)]
            .into_iter()
            .filter(|(_, key)| !key.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Resolves provider API keys. Values from the environment win; the rest are
/// read from Secret Manager when it is configured. Never fails.
pub async fn load_api_keys(settings: &SecretSettings) -> ApiKeys {
    let mut keys = ApiKeys {
        zillow: settings.zillow_api_key.clone().unwrap_or_default(),
        redfin: settings.redfin_api_key.clone().unwrap_or_default(),
        realtor: settings.realtor_api_key.clone().unwrap_or_default(),
    };

    let missing = keys.zillow.is_empty() || keys.redfin.is_empty() || keys.realtor.is_empty();
    if !missing || settings.project_id.is_none() {
        return keys;
    }

    let manager = match SecretManager::from_settings(settings) {
        Ok(manager) => manager,
        Err(e) => {
            warn!("Could not load secrets from Secret Manager: {}", e);
            return keys;
        }
    };

    for (slot, secret_name) in [
        (&mut keys.zillow, "ZILLOW_API_KEY"),
        (&mut keys.redfin, "REDFIN_API_KEY"),
        (&mut keys.realtor, "REALTOR_API_KEY"),
    ] {
        if slot.is_empty() {
            *slot = manager.get_secret(secret_name, "latest").await.unwrap_or_default();
        }
    }
    keys
}
