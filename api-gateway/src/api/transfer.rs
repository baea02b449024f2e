//! Transfer API handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use common::model::TransferRequest;

use crate::error::ApiError;
use crate::AppState;

/// Transfer funds between two accounts
#[utoipa::path(
    post,
    path = "/bank/accounts/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer committed"),
        (status = 400, description = "Invalid transfer request"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Accounts equal, unsupported or mismatched currency, or insufficient funds"),
        (status = 503, description = "Exchange rate unavailable"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transfer"
)]
pub async fn transfer_funds(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    state.banking_service.transfer_funds(&request).await?;
    Ok(StatusCode::OK)
}
