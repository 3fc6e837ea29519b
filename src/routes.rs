// src/routes.rs
use std::convert::Infallible;
use log::{error, info, warn};
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::analysis::{analyze_property, get_property_analyses, AnalyzeRequest};
use crate::handlers::error::ApiError;
use crate::handlers::properties::{create_property, delete_property, get_property, list_properties, ListQuery};
use crate::handlers::{health, AppState};
use crate::models::PropertyInput;

const MAX_BODY_BYTES: u64 = 64 * 1024;

fn error_reply(message: &str, code: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "success": false,
            "error": message,
        })),
        code,
    )
}

// Turns rejections, ours and warp's, into JSON error responses
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.message.clone();
    } else if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Endpoint not found".to_string();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        warn!("Rejected request body: {}", e);
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", e);
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Request body too large".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Expected a JSON request body".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error".to_string();
    }

    Ok(error_reply(&message, code))
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn routes(state: AppState) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let health_route = warp::path::end()
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(health);

    let create_property_route = warp::path!("api" / "properties")
        .and(warp::post())
        .and(state_filter.clone())
        .and(json_body::<PropertyInput>())
        .and_then(create_property);

    let list_properties_route = warp::path!("api" / "properties")
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(state_filter.clone())
        .and_then(list_properties);

    let get_property_route = warp::path!("api" / "properties" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_property);

    let delete_property_route = warp::path!("api" / "properties" / String)
        .and(warp::delete())
        .and(state_filter.clone())
        .and_then(delete_property);

    let property_analyses_route = warp::path!("api" / "properties" / String / "analyses")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_property_analyses);

    let analyze_route = warp::path!("api" / "analyze")
        .and(warp::post())
        .and(state_filter.clone())
        .and(json_body::<AnalyzeRequest>())
        .and_then(analyze_property);

    info!("All routes configured successfully.");

    health_route
        .or(create_property_route)
        .or(list_properties_route)
        .or(get_property_route)
        .or(delete_property_route)
        .or(property_analyses_route)
        .or(analyze_route)
        .recover(handle_rejection)
}
