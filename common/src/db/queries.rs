//! SQL for the ledger tables
//!
//! Every function takes an executor so the same query runs against the pool or
//! inside an open transaction.

use sqlx::PgExecutor;
use tracing::debug;

use crate::db::models::{DbAccount, DbAccountRecord, DbExchangeRate, DbTransaction};
use crate::error::{Error, Result};
use crate::model::{
    Account, AccountRecord, Client, ExchangeRate, NewTransaction, PageRequest, Transaction,
};

const ACCOUNT_COLUMNS: &str = "id, client_id, account_number, balance, currency";
const TRANSACTION_COLUMNS: &str =
    "id, account_number, balance, amount, currency, timestamp, transaction_flow";

// Client Queries

pub async fn insert_client<'e, E: PgExecutor<'e>>(executor: E, client: &Client) -> Result<()> {
    sqlx::query("INSERT INTO clients (id, name, surname, personal_code) VALUES ($1, $2, $3, $4)")
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.personal_code)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn client_exists<'e, E: PgExecutor<'e>>(executor: E, personal_code: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE personal_code = $1)")
            .bind(personal_code)
            .fetch_one(executor)
            .await?;
    Ok(exists)
}

pub async fn find_accounts_by_personal_code<'e, E: PgExecutor<'e>>(
    executor: E,
    personal_code: &str,
) -> Result<Vec<AccountRecord>> {
    let rows = sqlx::query_as::<_, DbAccountRecord>(
        "SELECT a.account_number, a.balance, a.currency
         FROM clients c
         INNER JOIN accounts a ON c.id = a.client_id
         WHERE c.personal_code = $1
         ORDER BY a.account_number",
    )
    .bind(personal_code)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(AccountRecord::try_from).collect()
}

// Account Queries

pub async fn insert_account<'e, E: PgExecutor<'e>>(executor: E, account: &Account) -> Result<()> {
    sqlx::query(
        "INSERT INTO accounts (id, client_id, account_number, balance, currency)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(account.id)
    .bind(account.client_id)
    .bind(&account.account_number)
    .bind(account.balance)
    .bind(account.currency.code())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_account_by_number<'e, E: PgExecutor<'e>>(
    executor: E,
    account_number: &str,
) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE account_number = $1", ACCOUNT_COLUMNS);
    let row = sqlx::query_as::<_, DbAccount>(&sql)
        .bind(account_number)
        .fetch_optional(executor)
        .await?;

    row.map(Account::try_from).transpose()
}

/// Same as `get_account_by_number` but takes a row lock until the transaction ends
pub async fn lock_account_by_number<'e, E: PgExecutor<'e>>(
    executor: E,
    account_number: &str,
) -> Result<Option<Account>> {
    debug!("Locking account row: {}", account_number);

    let sql = format!(
        "SELECT {} FROM accounts WHERE account_number = $1 FOR UPDATE",
        ACCOUNT_COLUMNS
    );
    let row = sqlx::query_as::<_, DbAccount>(&sql)
        .bind(account_number)
        .fetch_optional(executor)
        .await?;

    row.map(Account::try_from).transpose()
}

pub async fn account_exists<'e, E: PgExecutor<'e>>(executor: E, account_number: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE account_number = $1)")
            .bind(account_number)
            .fetch_one(executor)
            .await?;
    Ok(exists)
}

pub async fn update_account_balance<'e, E: PgExecutor<'e>>(executor: E, account: &Account) -> Result<()> {
    let result = sqlx::query("UPDATE accounts SET balance = $2 WHERE id = $1")
        .bind(account.id)
        .bind(account.balance)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::AccountNotFound(account.account_number.clone()));
    }
    Ok(())
}

// Transaction Queries

pub async fn insert_transaction<'e, E: PgExecutor<'e>>(
    executor: E,
    entry: &NewTransaction,
) -> Result<Transaction> {
    let sql = format!(
        "INSERT INTO transactions (account_number, balance, amount, currency, timestamp, transaction_flow)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        TRANSACTION_COLUMNS
    );
    let row = sqlx::query_as::<_, DbTransaction>(&sql)
        .bind(&entry.account_number)
        .bind(entry.balance)
        .bind(entry.amount)
        .bind(entry.currency.code())
        .bind(entry.timestamp)
        .bind(entry.transaction_flow.as_str())
        .fetch_one(executor)
        .await?;

    Transaction::try_from(row)
}

pub async fn find_transactions_by_account<'e, E: PgExecutor<'e>>(
    executor: E,
    account_number: &str,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions
         WHERE account_number = $1
         ORDER BY timestamp DESC, id DESC",
        TRANSACTION_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbTransaction>(&sql)
        .bind(account_number)
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(Transaction::try_from).collect()
}

pub async fn find_transactions_page<'e, E: PgExecutor<'e>>(
    executor: E,
    account_number: &str,
    page: PageRequest,
) -> Result<Vec<Transaction>> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| Error::ValidationError(format!("Page offset out of range: {:?}", page)))?;

    let sql = format!(
        "SELECT {} FROM transactions
         WHERE account_number = $1
         ORDER BY timestamp DESC, id DESC
         LIMIT $2 OFFSET $3",
        TRANSACTION_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbTransaction>(&sql)
        .bind(account_number)
        .bind(i64::from(page.size))
        .bind(offset)
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(Transaction::try_from).collect()
}

// Exchange Rate Queries

pub async fn upsert_exchange_rate<'e, E: PgExecutor<'e>>(executor: E, rate: &ExchangeRate) -> Result<()> {
    sqlx::query(
        "INSERT INTO exchange_rates (source, rate) VALUES ($1, $2)
         ON CONFLICT (source) DO UPDATE SET rate = EXCLUDED.rate",
    )
    .bind(&rate.source)
    .bind(rate.rate)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_exchange_rate<'e, E: PgExecutor<'e>>(
    executor: E,
    source: &str,
) -> Result<Option<ExchangeRate>> {
    let row = sqlx::query_as::<_, DbExchangeRate>(
        "SELECT source, rate FROM exchange_rates WHERE source = $1",
    )
    .bind(source)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(ExchangeRate::from))
}
