// src/services/google_oauth.rs
use chrono::{Utc, Duration};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use reqwest::Client;
use anyhow::{Context, Result};
use log::debug;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
// Google caps assertions at one hour.
const ASSERTION_LIFETIME_MINUTES: i64 = 59;

/// Credentials file downloaded for a service account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub r#type: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &str) -> Result<Self> {
        let json_bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&json_bytes)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Serialize)]
struct GrantRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Debug, Deserialize)]
struct GrantResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn build_claims(key: &ServiceAccountKey, scope: &str) -> AssertionClaims {
    let issued = Utc::now();
    let expires = issued + Duration::minutes(ASSERTION_LIFETIME_MINUTES);
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: scope.to_string(),
        aud: key.token_uri.clone(),
        exp: expires.timestamp(),
        iat: issued.timestamp(),
    }
}

/// RS256-signed assertion for `scope`, issued by the key's service account.
fn sign_assertion(key: &ServiceAccountKey, scope: &str) -> Result<String> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("service account private key is not valid PEM")?;
    let assertion = encode(&Header::new(Algorithm::RS256), &build_claims(key, scope), &encoding_key)?;
    Ok(assertion)
}

/// Trades a signed assertion for an access token at the key's token endpoint.
pub async fn fetch_access_token(client: &Client, key: &ServiceAccountKey, scope: &str) -> Result<String> {
    let assertion = sign_assertion(key, scope)?;
    let grant = GrantRequest {
        grant_type: JWT_BEARER_GRANT,
        assertion: &assertion,
    };

    let token = client
        .post(&key.token_uri)
        .json(&grant)
        .send()
        .await?
        .error_for_status()?
        .json::<GrantResponse>()
        .await?;

    debug!("Obtained access token for {} (expires in {:?}s)", scope, token.expires_in);
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            r#type: "service_account".to_string(),
            project_id: "demo-project".to_string(),
            private_key_id: "abc".to_string(),
            private_key: "not-a-real-key".to_string(),
            client_email: "analyzer@demo-project.iam.gserviceaccount.com".to_string(),
            client_id: "123".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            auth_provider_x509_cert_url: "https://www.googleapis.com/oauth2/v1/certs".to_string(),
            client_x509_cert_url: "https://www.googleapis.com/robot/v1/metadata/x509/analyzer".to_string(),
        }
    }

    #[test]
    fn claims_target_token_endpoint() {
        let claims = build_claims(&key(), CLOUD_PLATFORM_SCOPE);
        assert_eq!(claims.iss, "analyzer@demo-project.iam.gserviceaccount.com");
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.scope, CLOUD_PLATFORM_SCOPE);
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_MINUTES * 60);
    }

    #[tokio::test]
    async fn invalid_private_key_is_an_error() {
        assert!(sign_assertion(&key(), CLOUD_PLATFORM_SCOPE).is_err());
        let result = fetch_access_token(&Client::new(), &key(), CLOUD_PLATFORM_SCOPE).await;
        assert!(result.is_err());
    }

    #[test]
    fn grant_request_uses_jwt_bearer_type() {
        let grant = GrantRequest { grant_type: JWT_BEARER_GRANT, assertion: "signed" };
        let body = serde_json::to_value(&grant).unwrap();
        assert_eq!(body["grant_type"], "urn:ietf:params:oauth:grant-type:jwt-bearer");
        assert_eq!(body["assertion"], "signed");
    }

    #[test]
    fn missing_key_file_is_an_error() {
        assert!(ServiceAccountKey::from_file("/nonexistent/key.json").is_err());
    }
}
