// src/config.rs
use log::warn;
use std::env;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            other => {
                warn!("Unknown APP_ENV {:?}, falling back to production", other);
                Environment::Production
            }
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Names of the document collections for properties and analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub properties: String,
    pub analyses: String,
}

impl Default for Collections {
    fn default() -> Self {
        Collections {
            properties: "properties".to_string(),
            analyses: "analyses".to_string(),
        }
    }
}

/// Where secrets come from. Secret Manager is only consulted when both the
/// project and a service account key file are known.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretSettings {
    pub project_id: Option<String>,
    pub credentials_path: Option<String>,
    pub zillow_api_key: Option<String>,
    pub redfin_api_key: Option<String>,
    pub realtor_api_key: Option<String>,
}

impl fmt::Debug for SecretSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecretSettings")
            .field("project_id", &self.project_id)
            .field("credentials_path", &self.credentials_path)
            .field("zillow_api_key", &self.zillow_api_key.as_ref().map(|_| "<set>"))
            .field("redfin_api_key", &self.redfin_api_key.as_ref().map(|_| "<set>"))
            .field("realtor_api_key", &self.realtor_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database_url: Option<String>,
    pub use_memory_store: bool,
    pub collections: Collections,
    pub secrets: SecretSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = var("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Production);

        let port = match var("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value,
            })?,
            None => {
                warn!("$PORT not set, defaulting to 8080");
                8080
            }
        };

        let use_memory_store = match var("USE_MEMORY_STORE") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "USE_MEMORY_STORE",
                expected: "true or false",
                value,
            })?,
            None => false,
        };

        let defaults = Collections::default();
        let collections = Collections {
            properties: var("PROPERTIES_COLLECTION").unwrap_or(defaults.properties),
            analyses: var("ANALYSES_COLLECTION").unwrap_or(defaults.analyses),
        };

        Ok(AppConfig {
            environment,
            port,
            database_url: var("DATABASE_URL"),
            use_memory_store,
            collections,
            secrets: SecretSettings {
                project_id: var("GOOGLE_CLOUD_PROJECT"),
                credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS"),
                zillow_api_key: var("ZILLOW_API_KEY"),
                redfin_api_key: var("REDFIN_API_KEY"),
                realtor_api_key: var("REALTOR_API_KEY"),
            },
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
        assert!(!config.use_memory_store);
        assert_eq!(config.collections, Collections::default());
        assert!(config.secrets.project_id.is_none());
    }

    #[test]
    fn reads_values() {
        let config = config_from(&[
            ("APP_ENV", "development"),
            ("PORT", "3030"),
            ("DATABASE_URL", "postgres://localhost/properties"),
            ("USE_MEMORY_STORE", "true"),
            ("ANALYSES_COLLECTION", "analyses_v2"),
            ("GOOGLE_CLOUD_PROJECT", "demo-project"),
            ("ZILLOW_API_KEY", "  "),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 3030);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/properties"));
        assert!(config.use_memory_store);
        assert_eq!(config.collections.properties, "properties");
        assert_eq!(config.collections.analyses, "analyses_v2");
        assert_eq!(config.secrets.project_id.as_deref(), Some("demo-project"));
        assert!(config.secrets.zillow_api_key.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn debug_hides_api_keys() {
        let config = config_from(&[("REDFIN_API_KEY", "super-secret")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
