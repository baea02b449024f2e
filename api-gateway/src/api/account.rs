//! Account API handlers
//!
//! Handles endpoints related to account lookups:
//! - List the accounts of a client
//! - Get the transaction history of an account

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use common::error::Error;
use common::model::{AccountRecord, TransactionRecord};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::AppState;

/// List the accounts of a client
#[utoipa::path(
    get,
    path = "/bank/clients/{personal_code}/accounts",
    params(
        ("personal_code" = String, Path, description = "Client personal code")
    ),
    responses(
        (status = 200, description = "Client accounts", body = [AccountRecord]),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_accounts_by_client(
    State(state): State<Arc<AppState>>,
    Path(personal_code): Path<String>,
) -> Result<Json<Vec<AccountRecord>>, ApiError> {
    if !state.banking_service.client_exists(&personal_code).await? {
        return Err(Error::ClientNotFound(personal_code).into());
    }

    let accounts = state.banking_service.get_accounts_by_client(&personal_code).await?;
    Ok(Json(accounts))
}

/// History paging parameters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Zero-based page index
    pub offset: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

/// Get the transaction history of an account, newest first
#[utoipa::path(
    get,
    path = "/bank/accounts/{account_number}/transactions",
    params(
        ("account_number" = String, Path, description = "Account number"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Transaction history", body = [TransactionRecord]),
        (status = 400, description = "Invalid paging parameters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_transaction_history(
    State(state): State<Arc<AppState>>,
    Path(account_number): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionRecord>>, ApiError> {
    let Query(query) = query?;
    let history = state
        .banking_service
        .get_transaction_history(&account_number, query.offset, query.limit)
        .await?;

    Ok(Json(history))
}
