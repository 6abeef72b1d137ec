//! # Ledger Repository
//!
//! The flat, append-mostly journal of money movements between typed parties.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transactions                                                           │
//! │  ┌──────┬───────────────┬──────────────────┬──────────────────┬───────┐ │
//! │  │ id   │ memo_no       │ from (id, type)  │ to (id, type)    │amount │ │
//! │  ├──────┼───────────────┼──────────────────┼──────────────────┼───────┤ │
//! │  │ 1    │ ORDER-0314K2Q9│ (4, customers)   │ (1, accounts)    │ 40.00 │ │
//! │  │ 2    │ PURCHASE-P1   │ (1, accounts)    │ (2, suppliers)   │ 25.00 │ │
//! │  └──────┴───────────────┴──────────────────┴──────────────────┴───────┘ │
//! │                                                                         │
//! │  In memory each side is an EntityRef; an (id, type) pair that names    │
//! │  an unknown kind of party cannot be constructed.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Appends and deletes run on the caller's connection; a lifecycle update
//! deletes the stale entry for a memo and appends its replacement inside
//! one transaction.

use branchbook_core::{
    memo, DateRange, EntityRef, EntityType, LedgerEntry, Money, NewLedgerEntry, Page,
    PageRequest, TransactionType,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct LedgerRow {
    transaction_id: i64,
    transaction_date: NaiveDate,
    memo_no: String,
    branch_id: i64,
    from_entity_id: i64,
    from_entity_type: EntityType,
    to_entity_id: i64,
    to_entity_type: EntityType,
    amount: Money,
    transaction_type: TransactionType,
    notes: Option<String>,
}

impl From<LedgerRow> for LedgerEntry {
    fn from(row: LedgerRow) -> Self {
        LedgerEntry {
            id: row.transaction_id,
            transaction_date: row.transaction_date,
            memo_no: row.memo_no,
            branch_id: row.branch_id,
            from: EntityRef::from_parts(row.from_entity_type, row.from_entity_id),
            to: EntityRef::from_parts(row.to_entity_type, row.to_entity_id),
            amount: row.amount,
            transaction_type: row.transaction_type,
            notes: row.notes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerLineRow {
    #[sqlx(flatten)]
    row: LedgerRow,
    from_name: Option<String>,
    to_name: Option<String>,
}

const SELECT_COLUMNS: &str = r#"
    t.transaction_id, t.transaction_date, t.memo_no, t.branch_id,
    t.from_entity_id, t.from_entity_type, t.to_entity_id, t.to_entity_type,
    t.amount, t.transaction_type, t.notes
"#;

// =============================================================================
// Write Primitives (caller's transaction)
// =============================================================================

/// Appends a ledger entry and returns its id.
///
/// A blank or missing memo is replaced by a generated one. No uniqueness is
/// enforced: several entries may share a memo.
pub(crate) async fn append(conn: &mut SqliteConnection, entry: &NewLedgerEntry) -> DbResult<i64> {
    let memo_no = match entry.memo_no.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => memo::generate(entry.transaction_date),
    };

    debug!(
        branch_id = entry.branch_id,
        memo_no = %memo_no,
        amount = %entry.amount,
        transaction_type = entry.transaction_type.as_str(),
        "Appending ledger entry"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO transactions (
            transaction_date, memo_no, branch_id,
            from_entity_id, from_entity_type, to_entity_id, to_entity_type,
            amount, transaction_type, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.transaction_date)
    .bind(&memo_no)
    .bind(entry.branch_id)
    .bind(entry.from.id())
    .bind(entry.from.entity_type())
    .bind(entry.to.id())
    .bind(entry.to.entity_type())
    .bind(entry.amount)
    .bind(entry.transaction_type)
    .bind(&entry.notes)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Removes every entry of `transaction_type` carrying `memo_no` in the
/// branch. Matching nothing is not an error.
pub(crate) async fn delete_by_memo(
    conn: &mut SqliteConnection,
    branch_id: i64,
    memo_no: &str,
    transaction_type: TransactionType,
) -> DbResult<u64> {
    let result = sqlx::query(
        "DELETE FROM transactions WHERE memo_no = ? AND branch_id = ? AND transaction_type = ?",
    )
    .bind(memo_no)
    .bind(branch_id)
    .bind(transaction_type)
    .execute(&mut *conn)
    .await?;

    debug!(
        branch_id,
        memo_no,
        removed = result.rows_affected(),
        "Deleted ledger entries"
    );
    Ok(result.rows_affected())
}

// =============================================================================
// Read Side
// =============================================================================

/// Filter for [`LedgerRepository::list`].
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub branch_id: i64,
    pub range: DateRange,
    pub transaction_type: Option<TransactionType>,
    pub page: PageRequest,
}

/// A ledger entry with display names for both parties.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerLine {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub from_name: Option<String>,
    pub to_name: Option<String>,
}

/// Count and amount of one transaction type over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LedgerTypeSummary {
    pub transaction_type: TransactionType,
    pub count: i64,
    pub amount: Money,
}

#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Lists entries newest first, with party names resolved per entity type.
    pub async fn list(&self, query: &TransactionQuery) -> DbResult<Page<LedgerLine>> {
        let sql = format!(
            r#"
            SELECT {SELECT_COLUMNS},
                {from_name} AS from_name,
                {to_name} AS to_name
            FROM transactions t
            WHERE t.branch_id = ?1
              AND t.transaction_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR t.transaction_type = ?4)
            ORDER BY t.transaction_date DESC, t.transaction_id DESC
            LIMIT ?5 OFFSET ?6
            "#,
            from_name = party_name_sql("from"),
            to_name = party_name_sql("to"),
        );

        let rows = sqlx::query_as::<_, LedgerLineRow>(&sql)
            .bind(query.branch_id)
            .bind(query.range.start)
            .bind(query.range.end)
            .bind(query.transaction_type)
            .bind(query.page.limit)
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE branch_id = ?1
              AND transaction_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR transaction_type = ?4)
            "#,
        )
        .bind(query.branch_id)
        .bind(query.range.start)
        .bind(query.range.end)
        .bind(query.transaction_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page {
            rows: rows
                .into_iter()
                .map(|r| LedgerLine {
                    entry: r.row.into(),
                    from_name: r.from_name,
                    to_name: r.to_name,
                })
                .collect(),
            total_count,
        })
    }

    /// Per transaction type count and amount over `range`.
    pub async fn summary(&self, branch_id: i64, range: DateRange) -> DbResult<Vec<LedgerTypeSummary>> {
        let rows = sqlx::query_as::<_, LedgerTypeSummary>(
            r#"
            SELECT transaction_type,
                   COUNT(*) AS count,
                   COALESCE(SUM(amount), 0) AS amount
            FROM transactions
            WHERE branch_id = ? AND transaction_date BETWEEN ? AND ?
            GROUP BY transaction_type
            ORDER BY transaction_type
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every entry of the branch tagged with `memo_no`.
    pub async fn by_memo(&self, branch_id: i64, memo_no: &str) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM transactions t \
             WHERE t.branch_id = ? AND t.memo_no = ? ORDER BY t.transaction_id"
        );
        let rows = sqlx::query_as::<_, LedgerRow>(&sql)
            .bind(branch_id)
            .bind(memo_no)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    /// Money that flowed into `party` minus money that flowed out of it,
    /// over the whole log. For an account this is what its balance must be.
    pub async fn net_flow(&self, party: EntityRef) -> DbResult<Money> {
        let net: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN to_entity_id = ?1 AND to_entity_type = ?2
                                  THEN amount ELSE 0 END), 0)
              - COALESCE(SUM(CASE WHEN from_entity_id = ?1 AND from_entity_type = ?2
                                  THEN amount ELSE 0 END), 0)
            FROM transactions
            "#,
        )
        .bind(party.id())
        .bind(party.entity_type())
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(net))
    }
}

/// SQL expression resolving the display name of the `side` party.
fn party_name_sql(side: &str) -> String {
    format!(
        r#"CASE t.{side}_entity_type
            WHEN 'accounts'  THEN (SELECT name FROM accounts  WHERE id = t.{side}_entity_id)
            WHEN 'branches'  THEN (SELECT name FROM branches  WHERE id = t.{side}_entity_id)
            WHEN 'customers' THEN (SELECT name FROM customers WHERE id = t.{side}_entity_id)
            WHEN 'employees' THEN (SELECT name FROM employees WHERE id = t.{side}_entity_id)
            WHEN 'suppliers' THEN (SELECT name FROM suppliers WHERE id = t.{side}_entity_id)
        END"#
    )
}
