//! # Account Repository
//!
//! Branch-scoped cash and bank accounts.
//!
//! `current_balance` only moves inside a lifecycle transaction, right next
//! to the ledger append that justifies it, so the balance always equals the
//! account's net flow in the ledger.

use branchbook_core::validation::{validate_branch_id, validate_name, validate_non_negative};
use branchbook_core::{Account, AccountType, EntityRef, Money, NewLedgerEntry, TransactionType};
use chrono::Local;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult};
use crate::repository::branch::lock_branch;
use crate::repository::ledger;

const SELECT_ACCOUNT: &str =
    "SELECT id, branch_id, name, account_type, current_balance FROM accounts";

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Locks the account row and returns it.
///
/// SQLite has no `SELECT ... FOR UPDATE`; the no-op UPDATE takes the
/// database write lock for the rest of the transaction. An account of
/// another branch counts as missing.
pub(crate) async fn lock_account(
    conn: &mut SqliteConnection,
    branch_id: i64,
    account_id: i64,
) -> DbResult<Account> {
    let result = sqlx::query("UPDATE accounts SET id = id WHERE id = ? AND branch_id = ?")
        .bind(account_id)
        .bind(branch_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Account", account_id));
    }

    let account = sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE id = ?"))
        .bind(account_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(account)
}

/// Locks the account receiving `amount`. Nothing received means no
/// account is involved, and the id is not looked at.
pub(crate) async fn lock_receiving_account(
    conn: &mut SqliteConnection,
    branch_id: i64,
    account_id: i64,
    amount: Money,
) -> DbResult<Option<Account>> {
    if !amount.is_positive() {
        return Ok(None);
    }
    lock_account(conn, branch_id, account_id).await.map(Some)
}

/// TopSheet column a received amount lands in. Without an account the
/// amount is zero and either column is unchanged.
pub(crate) fn receiving_type(account: Option<&Account>) -> AccountType {
    account.map_or(AccountType::Cash, |a| a.account_type)
}

/// `current_balance += delta`.
pub(crate) async fn adjust_balance(
    conn: &mut SqliteConnection,
    account_id: i64,
    delta: Money,
) -> DbResult<()> {
    if delta.is_zero() {
        return Ok(());
    }

    debug!(account_id, %delta, "Adjusting account balance");

    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET current_balance = current_balance + ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(delta)
    .bind(account_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Account", account_id));
    }
    Ok(())
}

/// Returns the branch's designated cash account (the first one created),
/// locked for the rest of the transaction.
pub(crate) async fn lock_branch_cash_account(
    conn: &mut SqliteConnection,
    branch_id: i64,
) -> DbResult<Account> {
    let id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM accounts WHERE branch_id = ? AND account_type = ? ORDER BY id LIMIT 1",
    )
    .bind(branch_id)
    .bind(AccountType::Cash)
    .fetch_optional(&mut *conn)
    .await?;

    let id = id.ok_or_else(|| DbError::not_found("Cash account for branch", branch_id))?;
    lock_account(conn, branch_id, id).await
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Creates an account.
    ///
    /// A non-zero opening balance is booked as an Adjustment from the branch
    /// into the new account, in the same transaction, so the balance is
    /// backed by the ledger from the first day.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        branch_id: i64,
        name: &str,
        account_type: AccountType,
        opening_balance: Money,
    ) -> DbResult<Account> {
        validate_branch_id(branch_id)?;
        let name = validate_name("name", name)?;
        validate_non_negative("opening_balance", opening_balance)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let result = sqlx::query(
            "INSERT INTO accounts (branch_id, name, account_type, current_balance) VALUES (?, ?, ?, 0)",
        )
        .bind(branch_id)
        .bind(&name)
        .bind(account_type)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        if opening_balance.is_positive() {
            ledger::append(
                &mut tx,
                &NewLedgerEntry {
                    transaction_date: Local::now().date_naive(),
                    memo_no: Some(format!("OPENING-{id}")),
                    branch_id,
                    from: EntityRef::Branch(branch_id),
                    to: EntityRef::Account(id),
                    amount: opening_balance,
                    transaction_type: TransactionType::Adjustment,
                    notes: Some("Opening balance".to_string()),
                },
            )
            .await?;
            adjust_balance(&mut tx, id, opening_balance).await?;
        }

        tx.commit().await?;

        info!(account_id = id, name = %name, account_type = account_type.as_str(), "Account created");
        Ok(Account {
            id,
            branch_id,
            name,
            account_type,
            current_balance: opening_balance,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// All accounts of a branch, cash first.
    pub async fn list(&self, branch_id: i64) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "{SELECT_ACCOUNT} WHERE branch_id = ? ORDER BY account_type = 'bank', id"
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{assert_balances_match_ledger, day, fixture, snapshot};

    #[tokio::test]
    async fn test_lock_rejects_foreign_branch_account() {
        let fx = fixture().await;
        let other = fx.db.branches().create("Uttara").await.unwrap();

        let mut conn = fx.db.pool().acquire().await.unwrap();
        let err = lock_account(&mut conn, other, fx.cash_account_id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let account = lock_account(&mut conn, fx.branch_id, fx.cash_account_id).await.unwrap();
        assert_eq!(account.account_type, AccountType::Cash);
    }

    #[tokio::test]
    async fn test_cash_account_lookup_and_list_order() {
        let fx = fixture().await;

        let mut conn = fx.db.pool().acquire().await.unwrap();
        let cash = lock_branch_cash_account(&mut conn, fx.branch_id).await.unwrap();
        assert_eq!(cash.id, fx.cash_account_id);
        adjust_balance(&mut conn, cash.id, Money::from_cents(-250)).await.unwrap();
        drop(conn);

        let accounts = fx.db.accounts().list(fx.branch_id).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_type, AccountType::Cash);
        assert_eq!(accounts[0].current_balance.cents(), -250);
        assert_eq!(accounts[1].account_type, AccountType::Bank);
    }

    #[tokio::test]
    async fn test_opening_balance_is_backed_by_ledger() {
        let fx = fixture().await;

        let till = fx
            .db
            .accounts()
            .create(fx.branch_id, "Till 2", AccountType::Cash, Money::from_cents(100_000))
            .await
            .unwrap();
        assert_eq!(till.current_balance.cents(), 100_000);

        let stored = fx.db.accounts().get(till.id).await.unwrap().unwrap();
        assert_eq!(stored.current_balance.cents(), 100_000);
        let net = fx.db.ledger().net_flow(EntityRef::Account(till.id)).await.unwrap();
        assert_eq!(net.cents(), 100_000);
        assert_balances_match_ledger(&fx).await;
    }

    #[tokio::test]
    async fn test_zero_opening_balance_writes_no_ledger_row() {
        let fx = fixture().await;
        let before = snapshot(&fx, day(14)).await.ledger_entries;

        fx.db
            .accounts()
            .create(fx.branch_id, "Petty", AccountType::Cash, Money::zero())
            .await
            .unwrap();

        assert_eq!(snapshot(&fx, day(14)).await.ledger_entries, before);
    }

    #[tokio::test]
    async fn test_negative_opening_balance_rejected() {
        let fx = fixture().await;
        let err = fx
            .db
            .accounts()
            .create(fx.branch_id, "Overdrawn", AccountType::Bank, Money::from_cents(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }
}
