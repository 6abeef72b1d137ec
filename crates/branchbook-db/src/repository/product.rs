//! # Product Repository
//!
//! Products, their current stock and the restock registry.
//!
//! ## Stock Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  restock()          quantity += n   + one product_stock_registry row   │
//! │  sale created       quantity -= n   (per sale item)                    │
//! │  sale updated       quantity += old (per old item)                     │
//! │                     quantity -= new (per new item)                     │
//! │  order / delivery   no stock movement                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is not clamped at zero; a sale can outrun the recorded stock.

use branchbook_core::validation::validate_restock;
use branchbook_core::{memo, DateRange, PageRequest, Product, Report, RestockRequest};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult};
use crate::repository::branch::lock_branch;

/// `quantity += delta` for a product of the branch.
pub(crate) async fn adjust_stock(
    conn: &mut SqliteConnection,
    branch_id: i64,
    product_id: i64,
    delta: i64,
) -> DbResult<()> {
    debug!(branch_id, product_id, delta, "Adjusting stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND branch_id = ?
        "#,
    )
    .bind(delta)
    .bind(product_id)
    .bind(branch_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }
    Ok(())
}

/// One restock registry line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockEntry {
    pub id: i64,
    pub memo_no: String,
    pub stock_date: NaiveDate,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StockTotals {
    pub total_quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    pub async fn create(&self, branch_id: i64, product_name: &str, quantity: i64) -> DbResult<Product> {
        let result =
            sqlx::query("INSERT INTO products (branch_id, product_name, quantity) VALUES (?, ?, ?)")
                .bind(branch_id)
                .bind(product_name)
                .bind(quantity)
                .execute(&self.pool)
                .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            branch_id,
            product_name: product_name.to_string(),
            quantity,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, branch_id, product_name, quantity FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn list(&self, branch_id: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, branch_id, product_name, quantity FROM products \
             WHERE branch_id = ? ORDER BY product_name",
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Adds stock for every item and records one registry row per item, in
    /// one transaction. Returns the memo number used.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn restock(&self, branch_id: i64, request: &RestockRequest) -> DbResult<String> {
        validate_restock(request)?;
        let memo_no = memo::resolve(request.memo_no.as_deref(), request.stock_date)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        for item in &request.items {
            adjust_stock(&mut tx, branch_id, item.product_id, item.quantity).await?;

            sqlx::query(
                r#"
                INSERT INTO product_stock_registry (memo_no, stock_date, branch_id, product_id, quantity)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&memo_no)
            .bind(request.stock_date)
            .bind(branch_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(branch_id, memo_no = %memo_no, "Restock recorded");
        Ok(memo_no)
    }

    /// Registry lines in `range`, newest first, with the quantity total over
    /// the full range.
    pub async fn stock_report(
        &self,
        branch_id: i64,
        range: DateRange,
        page: PageRequest,
    ) -> DbResult<Report<StockEntry, StockTotals>> {
        let rows = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT r.id, r.memo_no, r.stock_date, r.product_id, p.product_name, r.quantity
            FROM product_stock_registry r
            JOIN products p ON p.id = r.product_id
            WHERE r.branch_id = ? AND r.stock_date BETWEEN ? AND ?
            ORDER BY r.stock_date DESC, r.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total_count, total_quantity): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(quantity), 0)
            FROM product_stock_registry
            WHERE branch_id = ? AND stock_date BETWEEN ? AND ?
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Report {
            rows,
            total_count,
            totals: StockTotals { total_quantity },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{day, fixture};
    use branchbook_core::RestockItem;

    #[tokio::test]
    async fn test_restock_adds_stock_and_registry_rows() {
        let fx = fixture().await;
        let products = fx.db.products();

        let memo_no = products
            .restock(
                fx.branch_id,
                &RestockRequest {
                    memo_no: None,
                    stock_date: day(14),
                    items: vec![
                        RestockItem { product_id: fx.product_id, quantity: 5 },
                        RestockItem { product_id: fx.other_product_id, quantity: 2 },
                    ],
                },
            )
            .await
            .unwrap();
        assert!(memo_no.starts_with("0314"));

        let product = products.get(fx.product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 15);

        let report = products
            .stock_report(fx.branch_id, DateRange::single(day(14)), PageRequest::new(None, Some(1)))
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_count, 2);
        assert_eq!(report.totals.total_quantity, 7);
    }

    #[tokio::test]
    async fn test_restock_unknown_product_rolls_back() {
        let fx = fixture().await;
        let products = fx.db.products();

        let err = products
            .restock(
                fx.branch_id,
                &RestockRequest {
                    memo_no: Some("R-1".into()),
                    stock_date: day(14),
                    items: vec![
                        RestockItem { product_id: fx.product_id, quantity: 5 },
                        RestockItem { product_id: 9_999, quantity: 1 },
                    ],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert_eq!(products.get(fx.product_id).await.unwrap().unwrap().quantity, 10);
    }
}
