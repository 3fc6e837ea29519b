// src/handlers/properties.rs
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{with_status, Json};
use warp::Rejection;

use crate::models::PropertyInput;
use super::error::ApiError;
use super::AppState;

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

pub async fn create_property(state: AppState, input: PropertyInput) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to create a property");

    let mut property = input.validate().map_err(ApiError::from)?;
    // Creation always makes a new document; ids come from the store.
    property.property_id = None;

    match &state.store {
        Some(store) => {
            let property_id = store.save_property(&property).await.map_err(ApiError::from)?;
            info!("Saved property {}", property_id);
            property.property_id = Some(property_id);
        }
        None => debug!("No document store configured, property not persisted"),
    }

    Ok(with_status(
        warp::reply::json(&json!({
            "success": true,
            "property": property,
        })),
        StatusCode::CREATED,
    ))
}

pub async fn get_property(property_id: String, state: AppState) -> Result<Json, Rejection> {
    info!("Handling request to get property {}", property_id);
    let store = state.require_store()?;

    let property = store.get_property(&property_id).await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    Ok(warp::reply::json(&json!({
        "success": true,
        "property": property,
    })))
}

pub async fn list_properties(query: ListQuery, state: AppState) -> Result<Json, Rejection> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    info!("Handling request to list up to {} properties", limit);
    let store = state.require_store()?;

    let properties = store.list_properties(limit).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&json!({
        "success": true,
        "count": properties.len(),
        "properties": properties,
    })))
}

pub async fn delete_property(property_id: String, state: AppState) -> Result<Json, Rejection> {
    info!("Handling request to delete property {}", property_id);
    let store = state.require_store()?;

    if !store.delete_property(&property_id).await.map_err(ApiError::from)? {
        return Err(ApiError::not_found("Property not found").into());
    }

    Ok(warp::reply::json(&json!({ "success": true })))
}
