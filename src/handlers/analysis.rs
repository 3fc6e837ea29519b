// src/handlers/analysis.rs
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::models::{FinancialAssumptions, PropertyInput};
use crate::services::analyzer::calculate_property_analysis;
use crate::services::report::generate_analysis_report;
use super::error::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub property: PropertyInput,
    #[serde(default)]
    pub assumptions: FinancialAssumptions,
}

pub async fn analyze_property(state: AppState, request: AnalyzeRequest) -> Result<Json, Rejection> {
    info!("Handling request to analyze a property");

    let property = request.property.validate().map_err(ApiError::from)?;
    request.assumptions.validate().map_err(ApiError::from)?;

    let mut analysis = calculate_property_analysis(&property, &request.assumptions);
    if !analysis.is_finite() {
        warn!("Analysis overflowed for purchase price {}", property.purchase_price);
        return Err(ApiError::bad_request("Inputs are out of range: analysis overflowed").into());
    }

    // Only analyses of known properties are kept.
    if let (Some(store), Some(property_id)) = (&state.store, &property.property_id) {
        let analysis_id = store.save_analysis(&analysis).await.map_err(ApiError::from)?;
        debug!("Saved analysis {} for property {}", analysis_id, property_id);
        analysis.analysis_id = Some(analysis_id);
    }

    let report = generate_analysis_report(&analysis);

    Ok(warp::reply::json(&json!({
        "success": true,
        "analysis": analysis,
        "report": report,
    })))
}

pub async fn get_property_analyses(property_id: String, state: AppState) -> Result<Json, Rejection> {
    info!("Handling request to get analyses for property {}", property_id);
    let store = state.require_store()?;

    let analyses = store.get_analyses_for_property(&property_id).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&json!({
        "success": true,
        "count": analyses.len(),
        "analyses": analyses,
    })))
}
