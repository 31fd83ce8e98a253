//! Driver validation route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::error::Result;
use crate::responses::{ok, ApiResponse};
use crate::AppState;

use super::requests::ValidateDriverRequest;
use super::responses::DriverValidationResponse;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new().route("/drivers/validate", post(validate))
}

async fn validate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ValidateDriverRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DriverValidationResponse>>> {
    let Json(request) = payload?;
    let today = Utc::now()
        .with_timezone(&state.config.local_utc_offset)
        .date_naive();

    let response = services::validate_driver(&state.db, request, today).await?;

    Ok(ok(response))
}
