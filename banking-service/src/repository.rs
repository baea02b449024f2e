//! Repository for ledger data

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::db::{self, queries, PgTransactionManager};
use common::error::{Error, Result};
use common::model::{
    Account, AccountRecord, Client, ExchangeRate, NewTransaction, PageRequest, Transaction,
};
use common::{DBTransaction, LedgerTransaction, TransactionManager};
use dashmap::DashMap;
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::config::BankingServiceConfig;

/// Ledger store trait defining the interface for accounts, clients, ledger
/// entries and fallback rates
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get the transaction manager
    fn transaction_manager(&self) -> &dyn TransactionManager;

    /// Get an account by its account number
    async fn get_account_by_number(&self, account_number: &str) -> Result<Option<Account>>;

    /// Check whether an account number is in use
    async fn account_exists(&self, account_number: &str) -> Result<bool>;

    /// Check whether a client with this personal code exists
    async fn exists_by_personal_code(&self, personal_code: &str) -> Result<bool>;

    /// List the accounts owned by a client, empty for an unknown code
    async fn find_accounts_by_personal_code(&self, personal_code: &str) -> Result<Vec<AccountRecord>>;

    /// Ledger entries of an account, newest first; the whole history when `page` is `None`
    async fn find_transactions_by_account(
        &self,
        account_number: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<Transaction>>;

    /// Fallback rate keyed by concatenated currency codes
    async fn get_exchange_rate(&self, source: &str) -> Result<Option<ExchangeRate>>;

    /// Begin a database transaction
    async fn begin_transaction(&self) -> Result<DBTransaction> {
        self.transaction_manager().begin_transaction().await
    }
}

/// Mutable ledger state guarded as a whole
#[derive(Debug, Default)]
struct LedgerState {
    /// Accounts by account number
    accounts: HashMap<String, Account>,
    /// Append-only ledger
    transactions: Vec<Transaction>,
    /// Last assigned ledger entry ID
    last_transaction_id: i64,
}

/// In-memory repository for ledger data
pub struct InMemoryLedgerStore {
    /// Clients by personal code
    clients: DashMap<String, Client>,
    /// Fallback rates by pair key
    rates: DashMap<String, ExchangeRate>,
    /// Accounts and ledger entries
    state: Arc<Mutex<LedgerState>>,
    /// Transaction manager
    transaction_manager: InMemoryTransactionManager,
}

impl InMemoryLedgerStore {
    /// Create a new in-memory ledger store
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(LedgerState::default()));
        Self {
            clients: DashMap::new(),
            rates: DashMap::new(),
            transaction_manager: InMemoryTransactionManager::new(state.clone()),
            state,
        }
    }

    /// Register a client
    pub fn insert_client(&self, client: Client) {
        self.clients.insert(client.personal_code.clone(), client);
    }

    /// Register an account, replacing any account with the same number
    pub async fn insert_account(&self, account: Account) {
        let mut state = self.state.lock().await;
        state.accounts.insert(account.account_number.clone(), account);
    }

    /// Register a fallback rate
    pub fn insert_exchange_rate(&self, rate: ExchangeRate) {
        self.rates.insert(rate.source.clone(), rate);
    }

    /// Every ledger entry in insertion order
    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    fn transaction_manager(&self) -> &dyn TransactionManager {
        &self.transaction_manager
    }

    async fn get_account_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(account_number).cloned())
    }

    async fn account_exists(&self, account_number: &str) -> Result<bool> {
        Ok(self.state.lock().await.accounts.contains_key(account_number))
    }

    async fn exists_by_personal_code(&self, personal_code: &str) -> Result<bool> {
        Ok(self.clients.contains_key(personal_code))
    }

    async fn find_accounts_by_personal_code(&self, personal_code: &str) -> Result<Vec<AccountRecord>> {
        let client_id = match self.clients.get(personal_code) {
            Some(client) => client.id,
            None => return Ok(Vec::new()),
        };

        let state = self.state.lock().await;
        let mut records: Vec<AccountRecord> = state
            .accounts
            .values()
            .filter(|account| account.client_id == client_id)
            .map(Account::to_record)
            .collect();
        records.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        Ok(records)
    }

    async fn find_transactions_by_account(
        &self,
        account_number: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut history: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.account_number == account_number)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let history = match page {
            Some(page) => {
                let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
                history
                    .into_iter()
                    .skip(skip)
                    .take(page.size as usize)
                    .collect()
            }
            None => history,
        };

        Ok(history)
    }

    async fn get_exchange_rate(&self, source: &str) -> Result<Option<ExchangeRate>> {
        Ok(self.rates.get(source).map(|r| r.clone()))
    }
}

/// In-memory unit of work. Holds the ledger lock for its whole lifetime, so
/// units of work are serialized; writes are staged and applied on commit.
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    staged_accounts: HashMap<String, Account>,
    staged_transactions: Vec<Transaction>,
}

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn lock_account(&mut self, account_number: &str) -> Result<Option<Account>> {
        if let Some(account) = self.staged_accounts.get(account_number) {
            return Ok(Some(account.clone()));
        }
        Ok(self.guard.accounts.get(account_number).cloned())
    }

    async fn save_account(&mut self, account: &Account) -> Result<()> {
        if !self.guard.accounts.contains_key(&account.account_number) {
            return Err(Error::AccountNotFound(account.account_number.clone()));
        }
        self.staged_accounts
            .insert(account.account_number.clone(), account.clone());
        Ok(())
    }

    async fn save_transaction(&mut self, entry: &NewTransaction) -> Result<Transaction> {
        let id = self.guard.last_transaction_id + self.staged_transactions.len() as i64 + 1;
        let transaction = entry.clone().into_transaction(id);
        self.staged_transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            mut guard,
            staged_accounts,
            staged_transactions,
        } = *self;

        guard.accounts.extend(staged_accounts);
        if let Some(last) = staged_transactions.last() {
            guard.last_transaction_id = last.id;
        }
        guard.transactions.extend(staged_transactions);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the staged writes releases the lock untouched
        Ok(())
    }
}

/// In-memory transaction manager
pub struct InMemoryTransactionManager {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryTransactionManager {
    fn new(state: Arc<Mutex<LedgerState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin_transaction(&self) -> Result<DBTransaction> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            guard,
            staged_accounts: HashMap::new(),
            staged_transactions: Vec::new(),
        }))
    }
}

/// PostgreSQL repository for ledger data
pub struct PostgresLedgerStore {
    /// Database connection pool
    pool: PgPool,
    /// Transaction manager
    transaction_manager: PgTransactionManager,
}

impl PostgresLedgerStore {
    /// Create a new PostgreSQL ledger store on an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            transaction_manager: PgTransactionManager::new(pool.clone()),
            pool,
        }
    }

    /// Connect with an explicit URL, or `DATABASE_URL` when none is given
    pub async fn connect(database_url: Option<String>) -> Result<Self> {
        let database_url = match database_url {
            Some(url) => url,
            None => std::env::var("DATABASE_URL")
                .map_err(|_| Error::ConfigurationError("DATABASE_URL must be set".to_string()))?,
        };

        let pool = db::init_db_pool(&database_url, 5).await?;
        Ok(Self::new(pool))
    }

    /// Create a new PostgreSQL ledger store with configuration
    pub async fn with_config(config: &BankingServiceConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

        let pool = db::init_db_pool(&config.database_url, config.db_pool_size).await?;
        if config.run_migrations {
            db::run_migrations(&pool).await?;
        }

        Ok(Self::new(pool))
    }

    /// Register a client
    pub async fn insert_client(&self, client: &Client) -> Result<()> {
        queries::insert_client(&self.pool, client).await
    }

    /// Register an account
    pub async fn insert_account(&self, account: &Account) -> Result<()> {
        queries::insert_account(&self.pool, account).await
    }

    /// Register or replace a fallback rate
    pub async fn insert_exchange_rate(&self, rate: &ExchangeRate) -> Result<()> {
        queries::upsert_exchange_rate(&self.pool, rate).await
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    fn transaction_manager(&self) -> &dyn TransactionManager {
        &self.transaction_manager
    }

    async fn get_account_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        debug!("Getting account from database: {}", account_number);
        queries::get_account_by_number(&self.pool, account_number).await
    }

    async fn account_exists(&self, account_number: &str) -> Result<bool> {
        queries::account_exists(&self.pool, account_number).await
    }

    async fn exists_by_personal_code(&self, personal_code: &str) -> Result<bool> {
        queries::client_exists(&self.pool, personal_code).await
    }

    async fn find_accounts_by_personal_code(&self, personal_code: &str) -> Result<Vec<AccountRecord>> {
        debug!("Getting accounts for client: {}", personal_code);
        queries::find_accounts_by_personal_code(&self.pool, personal_code).await
    }

    async fn find_transactions_by_account(
        &self,
        account_number: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<Transaction>> {
        debug!("Getting transactions for account: {} page: {:?}", account_number, page);
        match page {
            Some(page) => queries::find_transactions_page(&self.pool, account_number, page).await,
            None => queries::find_transactions_by_account(&self.pool, account_number).await,
        }
    }

    async fn get_exchange_rate(&self, source: &str) -> Result<Option<ExchangeRate>> {
        debug!("Getting fallback exchange rate: {}", source);
        queries::get_exchange_rate(&self.pool, source).await
    }
}
