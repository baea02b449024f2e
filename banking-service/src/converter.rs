//! Currency conversion
//!
//! A live pricing endpoint is asked first. When it cannot be reached, times out
//! or returns something unusable, the amount is converted with the stored
//! fallback rate for the pair. Either way the result is rounded half-up to cents.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::decimal::{precision, Amount};
use common::error::{Error, IntoError, Result};
use common::model::{Currency, ExchangeRate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::BankingServiceConfig;
use crate::repository::LedgerStore;

/// Converts amounts between currencies
#[async_trait]
pub trait RateOracle: Send + Sync {
    /// Convert `amount` from one currency into another
    async fn convert(&self, from: Currency, to: Currency, amount: Amount) -> Result<Amount>;
}

/// Remote source of converted amounts
#[async_trait]
pub trait LiveRateSource: Send + Sync {
    /// Ask the remote service to convert `amount`
    async fn fetch_conversion(&self, from: Currency, to: Currency, amount: Amount) -> Result<Amount>;
}

/// Conversion response of the pricing API
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    success: Option<bool>,
    #[allow(dead_code)]
    query: Option<ExchangeQuery>,
    result: Option<Amount>,
}

/// Echo of the request parameters
#[derive(Debug, Deserialize)]
struct ExchangeQuery {
    #[allow(dead_code)]
    from: Option<String>,
    #[allow(dead_code)]
    to: Option<String>,
    #[allow(dead_code)]
    amount: Option<Amount>,
}

/// Pricing API client over HTTP
pub struct HttpRateSource {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpRateSource {
    /// Create a client whose every call is bounded by `timeout`
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.into_error("Failed to build exchange HTTP client"))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from the service configuration
    pub fn from_config(config: &BankingServiceConfig) -> Result<Self> {
        Self::new(
            config.exchange_api_url.clone(),
            config.exchange_api_key.clone(),
            config.exchange_timeout,
        )
    }
}

#[async_trait]
impl LiveRateSource for HttpRateSource {
    async fn fetch_conversion(&self, from: Currency, to: Currency, amount: Amount) -> Result<Amount> {
        debug!("Requesting live conversion of {} {} to {}", amount, from, to);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("to", to.code().to_string()),
                ("from", from.code().to_string()),
                ("amount", amount.to_string()),
            ])
            .header("apikey", &self.api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::ExchangeService(e.to_string()))?;

        let body: ExchangeResponse = response
            .json()
            .await
            .map_err(|e| Error::ExchangeService(format!("Invalid response body: {}", e)))?;

        if body.success != Some(true) {
            return Err(Error::ExchangeService(format!(
                "Conversion {} -> {} was not successful",
                from, to
            )));
        }

        body.result.ok_or_else(|| {
            Error::ExchangeService(format!("Conversion {} -> {} returned no result", from, to))
        })
    }
}

/// Rate oracle with live lookup and stored fallback
pub struct CurrencyConverter {
    live: Arc<dyn LiveRateSource>,
    store: Arc<dyn LedgerStore>,
}

impl CurrencyConverter {
    pub fn new(live: Arc<dyn LiveRateSource>, store: Arc<dyn LedgerStore>) -> Self {
        Self { live, store }
    }

    /// Convert with the stored rate for the pair
    async fn convert_with_fallback(&self, from: Currency, to: Currency, amount: Amount) -> Result<Amount> {
        let key = ExchangeRate::pair_key(from, to);
        let rate = self
            .store
            .get_exchange_rate(&key)
            .await?
            .ok_or_else(|| Error::RateUnavailable(format!("No fallback rate for {}", key)))?;

        precision::apply_rate(amount, rate.rate)
    }
}

#[async_trait]
impl RateOracle for CurrencyConverter {
    async fn convert(&self, from: Currency, to: Currency, amount: Amount) -> Result<Amount> {
        if from == to {
            return Ok(amount);
        }

        match self.live.fetch_conversion(from, to, amount).await {
            Ok(converted) => Ok(precision::round_amount(converted)),
            Err(e) => {
                warn!("Live conversion {} -> {} failed, using fallback rate: {}", from, to, e);
                self.convert_with_fallback(from, to, amount).await
            }
        }
    }
}
