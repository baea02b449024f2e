use std::sync::Arc;

use api_gateway::{app_router, demo, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use banking_service::{BankingService, CurrencyConverter, InMemoryLedgerStore, LiveRateSource};
use common::decimal::{dec, Amount};
use common::error::{Error, Result};
use common::model::{Account, Client, Currency};
use serde_json::{json, Value};
use tower::ServiceExt;

const ALICE: &str = "010190-12345";
const ALICE_EUR: &str = "LV01BANK0000000001";
const ALICE_USD: &str = "LV01BANK0000000002";
const BOB_GBP: &str = "LV01BANK0000000003";
const BOB_EUR: &str = "LV01BANK0000000004";

struct OfflineRateSource;

#[async_trait]
impl LiveRateSource for OfflineRateSource {
    async fn fetch_conversion(&self, _from: Currency, _to: Currency, _amount: Amount) -> Result<Amount> {
        Err(Error::ExchangeService("offline".to_string()))
    }
}

async fn demo_app() -> Router {
    let store = Arc::new(InMemoryLedgerStore::new());
    demo::seed(&store).await;
    app_for(store)
}

fn app_for(store: Arc<InMemoryLedgerStore>) -> Router {
    let converter = Arc::new(CurrencyConverter::new(Arc::new(OfflineRateSource), store.clone()));
    let service = BankingService::new(store, converter);
    app_router(Arc::new(AppState::new(Arc::new(service))))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn transfer(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bank/accounts/transfer")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_list_client_accounts() {
    let app = demo_app().await;

    let (status, body) = get(&app, &format!("/bank/clients/{}/accounts", ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "accountNumber": ALICE_EUR, "balance": "1500.00", "currency": "EUR" },
            { "accountNumber": ALICE_USD, "balance": "320.50", "currency": "USD" },
        ])
    );
}

#[tokio::test]
async fn test_unknown_client_is_not_found() {
    let app = demo_app().await;

    let (status, body) = get(&app, "/bank/clients/999999-00000/accounts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "client_not_found");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_transfer_then_history() {
    let app = demo_app().await;

    let (status, body) = transfer(
        &app,
        json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "100.00", "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = get(&app, &format!("/bank/accounts/{}/transactions", BOB_EUR)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["accountNumber"], BOB_EUR);
    assert_eq!(entries[0]["amount"], "100.00");
    assert_eq!(entries[0]["balance"], "100.00");
    assert_eq!(entries[0]["transactionFlow"], "INCOMING");

    let (_, body) = get(&app, &format!("/bank/accounts/{}/transactions?offset=0&limit=1", ALICE_EUR)).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["transactionFlow"], "OUTGOING");
    assert_eq!(entries[0]["balance"], "1400.00");
}

#[tokio::test]
async fn test_cross_currency_transfer_uses_fallback_rate() {
    let app = demo_app().await;

    // 10.00 USD at USDGBP 0.789
    let (status, _) = transfer(
        &app,
        json!({ "senderAccount": ALICE_USD, "receiverAccount": BOB_GBP, "amount": 10, "currency": "GBP" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/bank/accounts/{}/transactions", BOB_GBP)).await;
    assert_eq!(body[0]["amount"], "7.89");
    assert_eq!(body[0]["currency"], "GBP");
}

#[tokio::test]
async fn test_rule_violations_are_conflicts() {
    let app = demo_app().await;

    let cases = [
        (json!({ "senderAccount": ALICE_EUR, "receiverAccount": ALICE_EUR.to_lowercase(), "amount": "1.00", "currency": "EUR" }), "accounts_equal"),
        (json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "1.00", "currency": "JPY" }), "unsupported_currency"),
        (json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_GBP, "amount": "1.00", "currency": "EUR" }), "currency_mismatch"),
        (json!({ "senderAccount": BOB_EUR, "receiverAccount": ALICE_EUR, "amount": "0.01", "currency": "EUR" }), "insufficient_funds"),
    ];

    for (body, code) in cases {
        let (status, body) = transfer(&app, body).await;
        assert_eq!(status, StatusCode::CONFLICT, "expected {}", code);
        assert_eq!(error_code(&body), code);
    }

    // Nothing was written
    let (_, body) = get(&app, &format!("/bank/accounts/{}/transactions", ALICE_EUR)).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let app = demo_app().await;

    let (status, body) = transfer(
        &app,
        json!({ "senderAccount": "NOPE", "receiverAccount": BOB_EUR, "amount": "1.00", "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "account_not_found");
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let app = demo_app().await;

    let (status, body) = transfer(
        &app,
        json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "-5.00", "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");

    let (status, body) = get(&app, &format!("/bank/accounts/{}/transactions?offset=0&limit=0", ALICE_EUR)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn test_missing_rate_is_unavailable() {
    // No fallback rates at all
    let store = Arc::new(InMemoryLedgerStore::new());
    let client = Client::new("Carol", None, "030303-33333");
    store
        .insert_account(Account::new(client.id, "EUR-1", dec!(10.00), Currency::EUR))
        .await;
    store
        .insert_account(Account::new(client.id, "USD-1", dec!(0.00), Currency::USD))
        .await;
    store.insert_client(client);
    let app = app_for(store);

    let (status, body) = transfer(
        &app,
        json!({ "senderAccount": "EUR-1", "receiverAccount": "USD-1", "amount": "1.00", "currency": "USD" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "rate_unavailable");
}

#[tokio::test]
async fn test_unknown_account_history_is_empty() {
    let app = demo_app().await;

    let (status, body) = get(&app, "/bank/accounts/NOPE/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_malformed_transfer_body_is_bad_request() {
    let app = demo_app().await;

    let bodies = [
        json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "1.00" }),
        json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "lots", "currency": "EUR" }),
        json!({ "senderAccount": ALICE_EUR, "amount": "1.00", "currency": "EUR" }),
    ];

    for body in bodies {
        let (status, body) = transfer(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "bad_request");
        assert!(body["request_id"].is_string());
    }

    // Sub-cent amounts are well-formed JSON but not a valid transfer
    let (status, body) = transfer(
        &app,
        json!({ "senderAccount": ALICE_EUR, "receiverAccount": BOB_EUR, "amount": "0.001", "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn test_malformed_paging_is_bad_request() {
    let app = demo_app().await;

    for query in ["offset=-1&limit=2", "offset=0&limit=many"] {
        let (status, body) = get(&app, &format!("/bank/accounts/{}/transactions?{}", ALICE_EUR, query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "bad_request");
    }
}
