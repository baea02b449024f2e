//! Banking service implementation

use std::sync::Arc;

use chrono::Utc;
use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::{
    Account, AccountRecord, NewTransaction, PageRequest, TransactionRecord, TransferOutcome,
    TransferRequest,
};
use common::LedgerTransaction;
use tracing::{debug, error, info, warn};

use crate::config::BankingServiceConfig;
use crate::converter::{CurrencyConverter, HttpRateSource, RateOracle};
use crate::repository::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use crate::validation;

/// Banking service for account lookups, history and transfers
pub struct BankingService {
    /// Repository for ledger data
    repo: Arc<dyn LedgerStore>,
    /// Currency conversion
    converter: Arc<dyn RateOracle>,
}

/// Repository Type
pub enum RepositoryType {
    /// In-memory repository
    InMemory,
    /// PostgreSQL repository
    Postgres(Option<String>),
}

impl BankingService {
    /// Create a banking service from explicit collaborators
    pub fn new(repo: Arc<dyn LedgerStore>, converter: Arc<dyn RateOracle>) -> Self {
        Self { repo, converter }
    }

    /// Create a new banking service with a specific repository type
    pub async fn with_repository(repo_type: RepositoryType, config: &BankingServiceConfig) -> Result<Self> {
        let repo: Arc<dyn LedgerStore> = match repo_type {
            RepositoryType::InMemory => Arc::new(InMemoryLedgerStore::new()),
            RepositoryType::Postgres(database_url) => {
                Arc::new(PostgresLedgerStore::connect(database_url).await?)
            }
        };

        Self::with_store(repo, config)
    }

    /// Create a new banking service backed by PostgreSQL with a configuration
    pub async fn with_config(config: &BankingServiceConfig) -> Result<Self> {
        let repo: Arc<dyn LedgerStore> = Arc::new(PostgresLedgerStore::with_config(config).await?);
        Self::with_store(repo, config)
    }

    /// Create a banking service on an existing store, converting through the
    /// configured pricing API
    pub fn with_store(repo: Arc<dyn LedgerStore>, config: &BankingServiceConfig) -> Result<Self> {
        let live = Arc::new(HttpRateSource::from_config(config)?);
        let converter = Arc::new(CurrencyConverter::new(live, repo.clone()));
        Ok(Self::new(repo, converter))
    }

    /// Ledger store in use
    pub fn repository(&self) -> &Arc<dyn LedgerStore> {
        &self.repo
    }

    /// Whether a client with this personal code exists
    pub async fn client_exists(&self, personal_code: &str) -> Result<bool> {
        self.repo.exists_by_personal_code(personal_code).await
    }

    /// Accounts of a client. Unknown codes yield an empty list; callers check
    /// existence first.
    pub async fn get_accounts_by_client(&self, personal_code: &str) -> Result<Vec<AccountRecord>> {
        self.repo.find_accounts_by_personal_code(personal_code).await
    }

    /// Ledger history of an account, newest first.
    ///
    /// With both `offset` and `limit` present a single page is returned, where
    /// `offset` is the page index and `limit` the page size. Otherwise the whole
    /// history is returned. The page size has no upper bound.
    pub async fn get_transaction_history(
        &self,
        account_number: &str,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<TransactionRecord>> {
        let page = match (offset, limit) {
            (Some(_), Some(0)) => {
                return Err(Error::ValidationError("Page size must not be less than one".to_string()));
            }
            (Some(page), Some(size)) => Some(PageRequest::new(page, size)),
            _ => None,
        };

        let history = self
            .repo
            .find_transactions_by_account(account_number, page)
            .await
            .with_context(|| format!("Failed to load history for account {}", account_number))?;

        Ok(history.into_iter().map(TransactionRecord::from).collect())
    }

    /// Move funds between two accounts.
    ///
    /// The sender is debited `request.amount` in its own currency and the
    /// receiver credited the converted amount. Both balance updates and both
    /// ledger entries are committed together or not at all.
    pub async fn transfer_funds(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        info!(
            "Transferring {} {} from {} to {}",
            request.amount, request.currency, request.sender_account, request.receiver_account
        );

        validation::validate_accounts(&request.sender_account, &request.receiver_account)?;
        let currency = validation::validate_currency(&request.currency)?;
        validation::validate_amount(request.amount)?;

        let sender = self.load_account(&request.sender_account).await?;
        let receiver = self.load_account(&request.receiver_account).await?;

        validation::validate_receiver_currency_match(currency, receiver.currency)?;

        let converted_amount = if currency == sender.currency {
            request.amount
        } else {
            self.converter
                .convert(sender.currency, currency, request.amount)
                .await
                .with_context(|| format!("Failed to convert {} to {}", sender.currency, currency))?
        };
        if converted_amount <= Amount::ZERO {
            return Err(Error::ValidationError(format!(
                "Transfer of {} {} is worth less than one cent in {}",
                request.amount, sender.currency, currency
            )));
        }
        debug!("Receiver {} will be credited {} {}", receiver.account_number, converted_amount, currency);

        let mut transaction = self.repo.begin_transaction().await
            .with_context(|| "Failed to start transfer transaction")?;

        let transaction_result = Self::apply_transfer(transaction.as_mut(), request, converted_amount).await;

        match transaction_result {
            Ok(outcome) => {
                transaction.commit().await
                    .with_context(|| format!(
                        "Failed to commit transfer from {} to {}",
                        request.sender_account, request.receiver_account
                    ))?;

                info!(
                    "Transfer committed: {} -> {} ({} debited, {} credited)",
                    request.sender_account, request.receiver_account, request.amount, converted_amount
                );
                Ok(outcome)
            }
            Err(e) => {
                if e.is_rule_violation() {
                    warn!(
                        "Transfer from {} to {} rejected: {}",
                        request.sender_account, request.receiver_account, e
                    );
                } else {
                    error!(
                        "Transfer from {} to {} failed: {}",
                        request.sender_account, request.receiver_account, e
                    );
                }

                if let Err(rollback_err) = transaction.rollback().await {
                    // Log rollback failure but return the original error
                    error!("Failed to roll back transaction: {}", rollback_err);
                }

                Err(e)
            }
        }
    }

    async fn load_account(&self, account_number: &str) -> Result<Account> {
        self.repo
            .get_account_by_number(account_number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))
    }

    /// Balance mutation and ledger writes inside an open unit of work
    async fn apply_transfer(
        transaction: &mut dyn LedgerTransaction,
        request: &TransferRequest,
        converted_amount: Amount,
    ) -> Result<TransferOutcome> {
        // Rows are locked in ascending account-number order so two opposite
        // transfers cannot deadlock
        let sender_first = request.sender_account <= request.receiver_account;
        let (first, second) = if sender_first {
            (&request.sender_account, &request.receiver_account)
        } else {
            (&request.receiver_account, &request.sender_account)
        };

        let first = Self::lock_account(transaction, first).await?;
        let second = Self::lock_account(transaction, second).await?;
        let (mut sender, mut receiver) = if sender_first { (first, second) } else { (second, first) };

        validation::validate_sufficient_funds(request.amount, sender.balance)?;

        sender.debit(request.amount)?;
        receiver.credit(converted_amount)?;

        transaction.save_account(&sender).await
            .with_context(|| format!("Failed to update sender account {}", sender.account_number))?;
        transaction.save_account(&receiver).await
            .with_context(|| format!("Failed to update receiver account {}", receiver.account_number))?;

        let outgoing = transaction
            .save_transaction(&NewTransaction::outgoing(&sender, request.amount, Utc::now()))
            .await
            .with_context(|| "Failed to record outgoing entry")?;
        let incoming = transaction
            .save_transaction(&NewTransaction::incoming(&receiver, converted_amount, Utc::now()))
            .await
            .with_context(|| "Failed to record incoming entry")?;

        Ok(TransferOutcome {
            converted_amount,
            outgoing,
            incoming,
        })
    }

    async fn lock_account(transaction: &mut dyn LedgerTransaction, account_number: &str) -> Result<Account> {
        transaction
            .lock_account(account_number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))
    }
}
