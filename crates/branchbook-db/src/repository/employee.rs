//! # Employee Repository
//!
//! Employees plus the two payroll events: salary payments and worker
//! progress entries.
//!
//! ## Payroll Effects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     salary                    worker progress           │
//! │  payroll_entries    kind = salary             kind = work               │
//! │  Progress           salary += amount          units, hours,             │
//! │                                               advance += ...            │
//! │  cash out > 0:                                                          │
//! │    TopSheet         expense += amount         expense += advance        │
//! │    Ledger           cash ──► employee         cash ──► employee         │
//! │                     Salary, SALARY-memo       Advance, ADVANCE-memo     │
//! │    Cash account     balance -= amount         balance -= advance        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored [`PayrollEntry`] is what an update reverts, so both events
//! share one apply/reverse pair keyed on the entry.

use branchbook_core::memo::{self, LedgerTag};
use branchbook_core::validation::{
    validate_branch_id, validate_new_employee, validate_salary_payment, validate_worker_progress,
};
use branchbook_core::{
    Employee, EmployeeRole, EntityRef, Money, NewEmployee, NewLedgerEntry, Page, PageRequest,
    PayrollEntry, PayrollKind, ProgressDelta, SalaryPayment, TopSheetDelta, TransactionType,
    WorkerProgress,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::error::{DbError, DbResult};
use crate::repository::account::{adjust_balance, lock_branch_cash_account};
use crate::repository::branch::lock_branch;
use crate::repository::ledger;
use crate::repository::progress::apply_progress_delta;
use crate::repository::top_sheet::apply_top_sheet_delta;
use crate::repository::Created;

const SELECT_EMPLOYEE: &str =
    "SELECT id, branch_id, name, role, mobile, base_salary FROM employees";

const SELECT_PAYROLL: &str = r#"
    SELECT id, memo_no, branch_id, employee_id, sheet_date, kind, amount,
           production_units, overtime_hours, advance_payment, notes
    FROM payroll_entries
"#;

// =============================================================================
// Side Effects
// =============================================================================

fn ledger_shape(kind: PayrollKind) -> (LedgerTag, TransactionType, &'static str) {
    match kind {
        PayrollKind::Salary => (LedgerTag::Salary, TransactionType::Salary, "Salary payment"),
        PayrollKind::Work => (
            LedgerTag::Advance,
            TransactionType::AdvancePayment,
            "Advance payment to worker",
        ),
    }
}

fn progress_delta(entry: &PayrollEntry) -> ProgressDelta {
    match entry.kind {
        PayrollKind::Salary => ProgressDelta::salary(entry.amount),
        PayrollKind::Work => ProgressDelta::work_logged(
            entry.production_units,
            entry.overtime_hours,
            entry.advance_payment,
        ),
    }
}

async fn ensure_employee(conn: &mut SqliteConnection, branch_id: i64, employee_id: i64) -> DbResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM employees WHERE id = ? AND branch_id = ?")
            .bind(employee_id)
            .bind(branch_id)
            .fetch_optional(&mut *conn)
            .await?;

    found
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Employee", employee_id))
}

async fn apply_payroll(conn: &mut SqliteConnection, entry: &PayrollEntry) -> DbResult<()> {
    apply_progress_delta(
        conn,
        entry.branch_id,
        entry.employee_id,
        entry.sheet_date,
        &progress_delta(entry),
    )
    .await?;

    let cash_out = entry.cash_out();
    if cash_out.is_positive() {
        let cash = lock_branch_cash_account(conn, entry.branch_id).await?;
        let (tag, transaction_type, notes) = ledger_shape(entry.kind);

        apply_top_sheet_delta(
            conn,
            entry.branch_id,
            entry.sheet_date,
            &TopSheetDelta::expense(cash_out),
        )
        .await?;

        ledger::append(
            conn,
            &NewLedgerEntry {
                transaction_date: entry.sheet_date,
                memo_no: Some(tag.memo(&entry.memo_no)),
                branch_id: entry.branch_id,
                from: EntityRef::Account(cash.id),
                to: EntityRef::Employee(entry.employee_id),
                amount: cash_out,
                transaction_type,
                notes: Some(entry.notes.clone().unwrap_or_else(|| notes.to_string())),
            },
        )
        .await?;
        adjust_balance(conn, cash.id, -cash_out).await?;
    }

    debug!(memo_no = %entry.memo_no, kind = ?entry.kind, "Payroll effects applied");
    Ok(())
}

async fn reverse_payroll(conn: &mut SqliteConnection, entry: &PayrollEntry) -> DbResult<()> {
    apply_progress_delta(
        conn,
        entry.branch_id,
        entry.employee_id,
        entry.sheet_date,
        &-progress_delta(entry),
    )
    .await?;

    let cash_out = entry.cash_out();
    if cash_out.is_positive() {
        let cash = lock_branch_cash_account(conn, entry.branch_id).await?;
        let (tag, transaction_type, _) = ledger_shape(entry.kind);

        apply_top_sheet_delta(
            conn,
            entry.branch_id,
            entry.sheet_date,
            &-TopSheetDelta::expense(cash_out),
        )
        .await?;

        ledger::delete_by_memo(conn, entry.branch_id, &tag.memo(&entry.memo_no), transaction_type)
            .await?;
        adjust_balance(conn, cash.id, cash_out).await?;
    }

    debug!(memo_no = %entry.memo_no, kind = ?entry.kind, "Payroll effects reversed");
    Ok(())
}

// =============================================================================
// Entry Construction
// =============================================================================

fn salary_entry(branch_id: i64, memo_no: String, payment: &SalaryPayment) -> PayrollEntry {
    PayrollEntry {
        id: 0,
        memo_no,
        branch_id,
        employee_id: payment.employee_id,
        sheet_date: payment.sheet_date,
        kind: PayrollKind::Salary,
        amount: payment.amount,
        production_units: 0,
        overtime_hours: 0.0,
        advance_payment: Money::zero(),
        notes: payment.notes.clone(),
    }
}

fn work_entry(branch_id: i64, memo_no: String, progress: &WorkerProgress) -> PayrollEntry {
    PayrollEntry {
        id: 0,
        memo_no,
        branch_id,
        employee_id: progress.employee_id,
        sheet_date: progress.sheet_date,
        kind: PayrollKind::Work,
        amount: Money::zero(),
        production_units: progress.production_units,
        overtime_hours: progress.overtime_hours,
        advance_payment: progress.advance_payment,
        notes: None,
    }
}

async fn insert_entry(conn: &mut SqliteConnection, entry: &PayrollEntry) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO payroll_entries (
            memo_no, branch_id, employee_id, sheet_date, kind, amount,
            production_units, overtime_hours, advance_payment, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.memo_no)
    .bind(entry.branch_id)
    .bind(entry.employee_id)
    .bind(entry.sheet_date)
    .bind(entry.kind)
    .bind(entry.amount)
    .bind(entry.production_units)
    .bind(entry.overtime_hours)
    .bind(entry.advance_payment)
    .bind(&entry.notes)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn overwrite_entry(conn: &mut SqliteConnection, id: i64, entry: &PayrollEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE payroll_entries SET
            employee_id = ?, sheet_date = ?, amount = ?, production_units = ?,
            overtime_hours = ?, advance_payment = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(entry.employee_id)
    .bind(entry.sheet_date)
    .bind(entry.amount)
    .bind(entry.production_units)
    .bind(entry.overtime_hours)
    .bind(entry.advance_payment)
    .bind(&entry.notes)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn fetch_entry(
    conn: &mut SqliteConnection,
    branch_id: i64,
    memo_no: &str,
    kind: PayrollKind,
) -> DbResult<PayrollEntry> {
    sqlx::query_as::<_, PayrollEntry>(&format!(
        "{SELECT_PAYROLL} WHERE memo_no = ? AND branch_id = ? AND kind = ?"
    ))
    .bind(memo_no)
    .bind(branch_id)
    .bind(kind)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Payroll entry", memo_no))
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
    pub role: Option<EmployeeRole>,
    /// Name or mobile substring.
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    #[instrument(skip(self, employee))]
    pub async fn create(&self, branch_id: i64, employee: &NewEmployee) -> DbResult<Employee> {
        validate_branch_id(branch_id)?;
        let name = validate_new_employee(employee)?;
        let mobile = employee.mobile.trim();

        let result = sqlx::query(
            "INSERT INTO employees (branch_id, name, role, mobile, base_salary) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(branch_id)
        .bind(&name)
        .bind(employee.role)
        .bind(mobile)
        .bind(employee.base_salary)
        .execute(&self.pool)
        .await?;

        debug!(branch_id, role = employee.role.as_str(), "Employee created");

        Ok(Employee {
            id: result.last_insert_rowid(),
            branch_id,
            name,
            role: employee.role,
            mobile: mobile.to_string(),
            base_salary: employee.base_salary,
        })
    }

    /// Replaces name, role, mobile and base salary. Payroll already
    /// recorded keeps the amounts it was booked with.
    #[instrument(skip(self, employee))]
    pub async fn update(&self, branch_id: i64, id: i64, employee: &NewEmployee) -> DbResult<Employee> {
        validate_branch_id(branch_id)?;
        let name = validate_new_employee(employee)?;
        let mobile = employee.mobile.trim();

        let result = sqlx::query(
            r#"
            UPDATE employees SET name = ?, role = ?, mobile = ?, base_salary = ?
            WHERE id = ? AND branch_id = ?
            "#,
        )
        .bind(&name)
        .bind(employee.role)
        .bind(mobile)
        .bind(employee.base_salary)
        .bind(id)
        .bind(branch_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        info!(employee_id = id, role = employee.role.as_str(), "Employee updated");
        Ok(Employee {
            id,
            branch_id,
            name,
            role: employee.role,
            mobile: mobile.to_string(),
            base_salary: employee.base_salary,
        })
    }

    /// Deletes an employee with no orders, sales or payroll behind them.
    #[instrument(skip(self))]
    pub async fn delete(&self, branch_id: i64, id: i64) -> DbResult<()> {
        validate_branch_id(branch_id)?;

        let result = sqlx::query("DELETE FROM employees WHERE id = ? AND branch_id = ?")
            .bind(id)
            .bind(branch_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).referenced("Employee", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT_EMPLOYEE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    pub async fn get_in_branch(&self, branch_id: i64, id: i64) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "{SELECT_EMPLOYEE} WHERE id = ? AND branch_id = ?"
        ))
        .bind(id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Employees of a branch by name. The chairman is never listed.
    pub async fn list(&self, branch_id: i64, query: &EmployeeQuery) -> DbResult<Page<Employee>> {
        let pattern = query.search.as_ref().map(|s| format!("%{}%", s.trim()));
        let filter = "branch_id = ?1 AND role <> 'chairman' \
                      AND (?2 IS NULL OR role = ?2) \
                      AND (?3 IS NULL OR name LIKE ?3 OR mobile LIKE ?3)";

        let rows = sqlx::query_as::<_, Employee>(&format!(
            "{SELECT_EMPLOYEE} WHERE {filter} ORDER BY name, id LIMIT ?4 OFFSET ?5"
        ))
        .bind(branch_id)
        .bind(query.role)
        .bind(&pattern)
        .bind(query.page.limit)
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM employees WHERE {filter}"))
                .bind(branch_id)
                .bind(query.role)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page { rows, total_count })
    }

    pub async fn payroll_entry(&self, branch_id: i64, memo_no: &str) -> DbResult<Option<PayrollEntry>> {
        let entry = sqlx::query_as::<_, PayrollEntry>(&format!(
            "{SELECT_PAYROLL} WHERE memo_no = ? AND branch_id = ?"
        ))
        .bind(memo_no)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Pays a salary out of the branch cash account.
    #[instrument(skip(self, payment), fields(employee_id = payment.employee_id))]
    pub async fn record_salary(&self, branch_id: i64, payment: &SalaryPayment) -> DbResult<Created> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_salary_payment(payment) {
            warn!(error = %e, "Rejected salary payment");
            return Err(e.into());
        }
        let memo_no = memo::resolve(payment.memo_no.as_deref(), payment.sheet_date)?;
        let mut entry = salary_entry(branch_id, memo_no, payment);

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;
        ensure_employee(&mut tx, branch_id, entry.employee_id).await?;
        entry.id = insert_entry(&mut tx, &entry).await?;
        apply_payroll(&mut tx, &entry).await?;
        tx.commit().await?;

        info!(memo_no = %entry.memo_no, amount = %entry.amount, "Salary recorded");
        Ok(Created {
            id: entry.id,
            memo_no: entry.memo_no,
        })
    }

    /// Replaces the salary payment stored under `memo_no`.
    #[instrument(skip(self, payment))]
    pub async fn update_salary(
        &self,
        branch_id: i64,
        memo_no: &str,
        payment: &SalaryPayment,
    ) -> DbResult<()> {
        validate_branch_id(branch_id)?;
        validate_salary_payment(payment)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = fetch_entry(&mut tx, branch_id, memo_no, PayrollKind::Salary).await?;
        reverse_payroll(&mut tx, &old).await?;

        let mut new = salary_entry(branch_id, old.memo_no.clone(), payment);
        new.id = old.id;
        ensure_employee(&mut tx, branch_id, new.employee_id).await?;
        overwrite_entry(&mut tx, old.id, &new).await?;
        apply_payroll(&mut tx, &new).await?;

        tx.commit().await?;

        info!(memo_no, amount = %new.amount, "Salary updated");
        Ok(())
    }

    /// Logs a worker's daily production and any advance paid out.
    #[instrument(skip(self, progress), fields(employee_id = progress.employee_id))]
    pub async fn record_worker_progress(
        &self,
        branch_id: i64,
        progress: &WorkerProgress,
    ) -> DbResult<Created> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_worker_progress(progress) {
            warn!(error = %e, "Rejected worker progress");
            return Err(e.into());
        }
        let memo_no = memo::resolve(progress.memo_no.as_deref(), progress.sheet_date)?;
        let mut entry = work_entry(branch_id, memo_no, progress);

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;
        ensure_employee(&mut tx, branch_id, entry.employee_id).await?;
        entry.id = insert_entry(&mut tx, &entry).await?;
        apply_payroll(&mut tx, &entry).await?;
        tx.commit().await?;

        info!(memo_no = %entry.memo_no, units = entry.production_units, "Worker progress recorded");
        Ok(Created {
            id: entry.id,
            memo_no: entry.memo_no,
        })
    }

    #[instrument(skip(self, progress))]
    pub async fn update_worker_progress(
        &self,
        branch_id: i64,
        memo_no: &str,
        progress: &WorkerProgress,
    ) -> DbResult<()> {
        validate_branch_id(branch_id)?;
        validate_worker_progress(progress)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = fetch_entry(&mut tx, branch_id, memo_no, PayrollKind::Work).await?;
        reverse_payroll(&mut tx, &old).await?;

        let mut new = work_entry(branch_id, old.memo_no.clone(), progress);
        new.id = old.id;
        ensure_employee(&mut tx, branch_id, new.employee_id).await?;
        overwrite_entry(&mut tx, old.id, &new).await?;
        apply_payroll(&mut tx, &new).await?;

        tx.commit().await?;

        info!(memo_no, "Worker progress updated");
        Ok(())
    }
}
