//! HTTP surface of the banking ledger

pub mod api;
pub mod config;
pub mod demo;
pub mod error;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use banking_service::BankingService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    account::{get_accounts_by_client, get_transaction_history},
    transfer::transfer_funds,
};

/// App state shared across handlers
pub struct AppState {
    /// Banking service
    pub banking_service: Arc<BankingService>,
}

impl AppState {
    pub fn new(banking_service: Arc<BankingService>) -> Self {
        Self { banking_service }
    }
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::account::get_accounts_by_client,
        api::account::get_transaction_history,
        api::transfer::transfer_funds,
    ),
    components(
        schemas(
            api::account::HistoryQuery,
            common::model::AccountRecord,
            common::model::TransactionRecord,
            common::model::TransactionFlow,
            common::model::TransferRequest,
            common::model::Currency,
            error::ErrorResponse,
            error::ErrorInfo,
        )
    ),
    tags(
        (name = "account", description = "Client accounts and transaction history"),
        (name = "transfer", description = "Fund transfers between accounts")
    ),
    info(
        title = "Banking Ledger API",
        version = "1.0.0",
        description = "Client account listing, transaction history and cross-currency fund transfers"
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn app_router(state: Arc<AppState>) -> Router {
    app_router_with_log_level(state, Level::INFO)
}

/// Build the application router, tracing requests at `log_level`
pub fn app_router_with_log_level(state: Arc<AppState>, log_level: Level) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bank_routes = Router::new()
        .route("/clients/:personal_code/accounts", get(get_accounts_by_client))
        .route("/accounts/:account_number/transactions", get(get_transaction_history))
        .route("/accounts/transfer", post(transfer_funds));

    let swagger_ui = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .nest("/bank", bank_routes)
        .merge(swagger_ui)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(log_level))
                .on_request(DefaultOnRequest::new().level(log_level))
                .on_response(DefaultOnResponse::new().level(log_level)),
        )
        .with_state(state)
}
