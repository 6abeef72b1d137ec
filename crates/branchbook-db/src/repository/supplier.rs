//! # Supplier Repository
//!
//! Suppliers are referenced by purchases and the ledger; one that is still
//! referenced cannot be deleted.

use branchbook_core::validation::{validate_branch_id, validate_name};
use branchbook_core::{CoreError, Page, PageRequest, PartyDetails, Supplier};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::{DbError, DbResult};

const SELECT_SUPPLIER: &str = "SELECT id, branch_id, name, mobile FROM suppliers";

#[derive(Debug, Clone, Default)]
pub struct SupplierQuery {
    /// Name or mobile substring.
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, branch_id: i64, name: &str, mobile: &str) -> DbResult<Supplier> {
        validate_branch_id(branch_id)?;
        let name = validate_name("name", name)?;
        let mobile = mobile.trim();

        let result = sqlx::query("INSERT INTO suppliers (branch_id, name, mobile) VALUES (?, ?, ?)")
            .bind(branch_id)
            .bind(&name)
            .bind(mobile)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();

        info!(supplier_id = id, "Supplier created");
        Ok(Supplier {
            id,
            branch_id,
            name,
            mobile: mobile.to_string(),
        })
    }

    #[instrument(skip(self, details))]
    pub async fn update(&self, branch_id: i64, id: i64, details: &PartyDetails) -> DbResult<Supplier> {
        validate_branch_id(branch_id)?;
        let name = validate_name("name", &details.name)?;
        let mobile = details.mobile.trim();

        let result = sqlx::query("UPDATE suppliers SET name = ?, mobile = ? WHERE id = ? AND branch_id = ?")
            .bind(&name)
            .bind(mobile)
            .bind(id)
            .bind(branch_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        info!(supplier_id = id, "Supplier updated");
        Ok(Supplier {
            id,
            branch_id,
            name,
            mobile: mobile.to_string(),
        })
    }

    /// Deletes a supplier no purchase refers to.
    #[instrument(skip(self))]
    pub async fn delete(&self, branch_id: i64, id: i64) -> DbResult<()> {
        validate_branch_id(branch_id)?;

        let mut tx = self.pool.begin().await?;

        let purchases: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase WHERE supplier_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let ledger_rows: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE (from_entity_type = 'suppliers' AND from_entity_id = ?1)
               OR (to_entity_type = 'suppliers' AND to_entity_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if purchases + ledger_rows > 0 {
            return Err(CoreError::InUse {
                entity: "Supplier".to_string(),
                id,
            }
            .into());
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ? AND branch_id = ?")
            .bind(id)
            .bind(branch_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::from(e).referenced("Supplier", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        tx.commit().await?;

        info!(supplier_id = id, "Supplier deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!("{SELECT_SUPPLIER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn get_in_branch(&self, branch_id: i64, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "{SELECT_SUPPLIER} WHERE id = ? AND branch_id = ?"
        ))
        .bind(id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn list(&self, branch_id: i64, query: &SupplierQuery) -> DbResult<Page<Supplier>> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query_as::<_, Supplier>(&format!(
            "{SELECT_SUPPLIER} WHERE branch_id = ?1 \
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
            "SELECT COUNT(*) FROM suppliers WHERE branch_id = ?1 \
             AND (?2 IS NULL OR name LIKE ?2 OR mobile LIKE ?2)",
        )
        .bind(branch_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total_count })
    }
}
