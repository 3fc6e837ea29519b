// src/handlers/mod.rs
use std::sync::Arc;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::config::Environment;
use crate::services::store::PropertyStore;
use error::ApiError;

pub mod analysis;
pub mod error;
pub mod properties;

pub const SERVICE_NAME: &str = "Property Analyzer API";

/// Collaborators built once at startup and handed to every route.
///
/// `store` is `None` when no document store could be set up; routes that
/// need it answer 503 instead of failing later.
#[derive(Clone)]
pub struct AppState {
    pub store: Option<Arc<dyn PropertyStore>>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn PropertyStore>>, environment: Environment) -> Self {
        AppState { store, environment }
    }

    pub fn require_store(&self) -> Result<&Arc<dyn PropertyStore>, ApiError> {
        self.store.as_ref().ok_or_else(ApiError::store_unavailable)
    }
}

pub async fn health(state: AppState) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment.to_string(),
        "store_configured": state.store.is_some(),
    })))
}
