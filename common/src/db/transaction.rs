//! Unit of work over the ledger
//!
//! A transfer touches two account rows and appends two ledger entries. All four
//! writes go through a `LedgerTransaction` and become visible together on
//! `commit`, or not at all.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};

use crate::db::queries;
use crate::error::{Error, Result};
use crate::model::{Account, NewTransaction, Transaction};

/// Operations available inside a unit of work
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Load an account and hold it exclusively until commit or rollback
    async fn lock_account(&mut self, account_number: &str) -> Result<Option<Account>>;

    /// Persist an updated account balance
    async fn save_account(&mut self, account: &Account) -> Result<()>;

    /// Append a ledger entry
    async fn save_transaction(&mut self, entry: &NewTransaction) -> Result<Transaction>;

    /// Make every write visible
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Open unit of work
pub type DBTransaction = Box<dyn LedgerTransaction>;

/// Transaction manager trait for creating and managing transactions
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<DBTransaction>;
}

/// A PostgreSQL transaction implementation
pub struct PgTransaction {
    tx: SqlxTransaction<'static, Postgres>,
}

impl PgTransaction {
    /// Create a new PgTransaction
    pub fn new(tx: SqlxTransaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LedgerTransaction for PgTransaction {
    async fn lock_account(&mut self, account_number: &str) -> Result<Option<Account>> {
        queries::lock_account_by_number(&mut *self.tx, account_number).await
    }

    async fn save_account(&mut self, account: &Account) -> Result<()> {
        queries::update_account_balance(&mut *self.tx, account).await
    }

    async fn save_transaction(&mut self, entry: &NewTransaction) -> Result<Transaction> {
        queries::insert_transaction(&mut *self.tx, entry).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(Error::Database)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(Error::Database)
    }
}

/// A PostgreSQL transaction manager implementation
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    /// Create a new PgTransactionManager
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin_transaction(&self) -> Result<DBTransaction> {
        let tx = self.pool.begin().await.map_err(Error::Database)?;
        Ok(Box::new(PgTransaction::new(tx)))
    }
}
