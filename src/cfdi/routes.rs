//! CFDI route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::responses::{ok, ApiResponse};
use crate::AppState;

use super::requests::GenerateCfdiRequest;
use super::responses::GenerateCfdiResponse;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new().route("/cfdi/invoices", post(generate))
}

async fn generate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateCfdiRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GenerateCfdiResponse>>> {
    let Json(request) = payload?;
    let invoice = services::generate_cfdi(&state.db, &state.pacs, request).await?;
    Ok(ok(invoice))
}
