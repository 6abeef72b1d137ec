//! # Customer Repository
//!
//! Customers and their running `due_amount`.

use branchbook_core::validation::{validate_branch_id, validate_name};
use branchbook_core::{Customer, Money, Page, PageRequest, PartyDetails};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult};

const SELECT_CUSTOMER: &str = "SELECT id, branch_id, name, mobile, due_amount FROM customers";

/// Locks the customer row for the rest of the transaction.
pub(crate) async fn lock_customer(
    conn: &mut SqliteConnection,
    branch_id: i64,
    customer_id: i64,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE customers SET id = id WHERE id = ? AND branch_id = ?")
        .bind(customer_id)
        .bind(branch_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", customer_id));
    }
    Ok(())
}

/// `due_amount += delta`.
pub(crate) async fn adjust_due(
    conn: &mut SqliteConnection,
    customer_id: i64,
    delta: Money,
) -> DbResult<()> {
    if delta.is_zero() {
        return Ok(());
    }

    debug!(customer_id, %delta, "Adjusting customer due");

    let result = sqlx::query(
        r#"
        UPDATE customers
        SET due_amount = due_amount + ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(delta)
    .bind(customer_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", customer_id));
    }
    Ok(())
}

/// Most rows a name filter returns.
const FILTER_LIMIT: i64 = 20;

#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Name or mobile substring.
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, branch_id: i64, name: &str, mobile: &str) -> DbResult<Customer> {
        validate_branch_id(branch_id)?;
        let name = validate_name("name", name)?;
        let mobile = mobile.trim();

        let result = sqlx::query("INSERT INTO customers (branch_id, name, mobile) VALUES (?, ?, ?)")
            .bind(branch_id)
            .bind(&name)
            .bind(mobile)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();

        info!(customer_id = id, "Customer created");
        Ok(Customer {
            id,
            branch_id,
            name,
            mobile: mobile.to_string(),
            due_amount: Money::zero(),
        })
    }

    /// Renames a customer or changes the mobile. `due_amount` is left
    /// alone; only trade events move it.
    #[instrument(skip(self, details))]
    pub async fn update(&self, branch_id: i64, id: i64, details: &PartyDetails) -> DbResult<Customer> {
        validate_branch_id(branch_id)?;
        let name = validate_name("name", &details.name)?;

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, mobile = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ? AND branch_id = ?
            "#,
        )
        .bind(&name)
        .bind(details.mobile.trim())
        .bind(id)
        .bind(branch_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(customer_id = id, "Customer updated");
        self.get_in_branch(branch_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_in_branch(&self, branch_id: i64, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE id = ? AND branch_id = ?"
        ))
        .bind(id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Customers of a branch by name, optionally filtered by a name or
    /// mobile substring.
    pub async fn list(&self, branch_id: i64, query: &CustomerQuery) -> DbResult<Page<Customer>> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE branch_id = ?1 \
             AND (?2 IS NULL OR name LIKE ?2 OR mobile LIKE ?2) \
             ORDER BY name, id LIMIT ?3 OFFSET ?4"
        ))
        .bind(branch_id)
        .bind(&pattern)
        .bind(query.page.limit)
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE branch_id = ?1 \
             AND (?2 IS NULL OR name LIKE ?2 OR mobile LIKE ?2)",
        )
        .bind(branch_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total_count })
    }

    /// Name matches for a picker, at most [`FILTER_LIMIT`] rows.
    pub async fn filter_by_name(&self, branch_id: i64, name: &str) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", name.trim());

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE branch_id = ? AND name LIKE ? ORDER BY name, id LIMIT ?"
        ))
        .bind(branch_id)
        .bind(pattern)
        .bind(FILTER_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Customers who still owe money, largest due first.
    pub async fn with_due(&self, branch_id: i64, page: PageRequest) -> DbResult<Page<Customer>> {
        let rows = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE branch_id = ? AND due_amount > 0 \
             ORDER BY due_amount DESC, id LIMIT ? OFFSET ?"
        ))
        .bind(branch_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE branch_id = ? AND due_amount > 0",
        )
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::fixture;

    #[tokio::test]
    async fn test_search_by_name_or_mobile() {
        let fx = fixture().await;
        let customers = fx.db.customers();
        customers.create(fx.branch_id, "Karim", "01800000000").await.unwrap();

        let search = |s: Option<&str>| CustomerQuery {
            search: s.map(str::to_string),
            page: PageRequest::default(),
        };
        assert_eq!(customers.list(fx.branch_id, &search(None)).await.unwrap().total_count, 2);
        assert_eq!(customers.list(fx.branch_id, &search(Some("kar"))).await.unwrap().total_count, 1);
        assert_eq!(customers.list(fx.branch_id, &search(Some("0170"))).await.unwrap().total_count, 1);

        let page = customers
            .list(
                fx.branch_id,
                &CustomerQuery {
                    search: None,
                    page: PageRequest::new(Some(1), Some(1)),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].name, "Rahim");
    }

    #[tokio::test]
    async fn test_update_keeps_due() {
        let fx = fixture().await;
        let customers = fx.db.customers();
        let mut conn = fx.db.pool().acquire().await.unwrap();
        adjust_due(&mut conn, fx.customer_id, Money::from_cents(2_500)).await.unwrap();
        drop(conn);

        let updated = customers
            .update(
                fx.branch_id,
                fx.customer_id,
                &PartyDetails {
                    name: " Rahim Uddin ".into(),
                    mobile: "01900000000".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Rahim Uddin");
        assert_eq!(updated.mobile, "01900000000");
        assert_eq!(updated.due_amount.cents(), 2_500);

        let other = fx.db.branches().create("Uttara").await.unwrap();
        let err = customers
            .update(
                other,
                fx.customer_id,
                &PartyDetails {
                    name: "Nobody".into(),
                    mobile: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_with_due_and_name_filter() {
        let fx = fixture().await;
        let customers = fx.db.customers();
        let karim = customers.create(fx.branch_id, "Karim", "01800000000").await.unwrap();
        customers.create(fx.branch_id, "Kamal", "").await.unwrap();

        let mut conn = fx.db.pool().acquire().await.unwrap();
        adjust_due(&mut conn, fx.customer_id, Money::from_cents(1_000)).await.unwrap();
        adjust_due(&mut conn, karim.id, Money::from_cents(4_000)).await.unwrap();
        drop(conn);

        let owing = customers.with_due(fx.branch_id, PageRequest::default()).await.unwrap();
        assert_eq!(owing.total_count, 2);
        assert_eq!(owing.rows[0].name, "Karim");
        assert_eq!(owing.rows[1].name, "Rahim");

        let named = customers.filter_by_name(fx.branch_id, "ka").await.unwrap();
        let names: Vec<_> = named.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Kamal", "Karim"]);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let fx = fixture().await;
        let err = fx.db.customers().create(fx.branch_id, "  ", "").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }

    #[tokio::test]
    async fn test_lock_missing_customer() {
        let fx = fixture().await;
        let mut conn = fx.db.pool().acquire().await.unwrap();
        assert!(matches!(
            lock_customer(&mut conn, fx.branch_id, 9_999).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
