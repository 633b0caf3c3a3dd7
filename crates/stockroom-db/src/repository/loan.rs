//! # Loan Repository
//!
//! Amounts a customer owes, optionally tied to the POS invoice that created
//! them. Loan accounting (balances, settlement) is left to the frontend;
//! this repository only stores and lists rows.

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{LoanRecord, LoanRow, NewLoan};

use crate::error::DbResult;

const LOAN_SELECT: &str = "SELECT loans.id, loans.amount, loans.invoiceNum AS invoice_num, \
     strftime('%Y-%m-%d, %H:%M:%S', posinvoices.newDate) AS pos_now_date, \
     strftime('%Y-%m-%d, %H:%M:%S', loans.nowDate) AS loan_now_date, \
     loans.note, loans.customer_id \
     FROM loans \
     LEFT JOIN posinvoices ON loans.invoiceNum = posinvoices.id";

/// Repository for customer loans.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Lists every loan with its invoice date.
    pub async fn list(&self) -> DbResult<Vec<LoanRow>> {
        let sql = format!("{LOAN_SELECT} ORDER BY loans.id");
        let rows = sqlx::query_as::<_, LoanRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed loans");
        Ok(rows)
    }

    /// Lists one customer's loans.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<LoanRow>> {
        let sql = format!("{LOAN_SELECT} WHERE loans.customer_id = ? ORDER BY loans.id");
        let rows = sqlx::query_as::<_, LoanRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(customer_id = customer_id, count = rows.len(), "Listed customer loans");
        Ok(rows)
    }

    /// Lists the loans recorded against one invoice.
    pub async fn list_for_invoice(&self, invoice_num: i64) -> DbResult<Vec<LoanRecord>> {
        let rows = sqlx::query_as::<_, LoanRecord>(
            r#"
            SELECT id, amount, invoiceNum AS invoice_num,
                   strftime('%Y-%m-%d, %H:%M:%S', nowDate) AS now_date,
                   note, customer_id
            FROM loans
            WHERE invoiceNum = ?
            ORDER BY id
            "#,
        )
        .bind(invoice_num)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a loan and returns its id.
    pub async fn insert(&self, loan: &NewLoan) -> DbResult<i64> {
        debug!(customer_id = loan.customer_id, amount = loan.amount, "Inserting loan");

        let result = sqlx::query(
            "INSERT INTO loans (amount, invoiceNum, note, customer_id) VALUES (?, ?, ?, ?)",
        )
        .bind(loan.amount)
        .bind(loan.invoice_num)
        .bind(&loan.note)
        .bind(loan.customer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Deletes every loan of a customer; returns the number removed.
    ///
    /// Zero is not an error: a customer with no loans is already settled.
    pub async fn delete_for_customer(&self, customer_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM loans WHERE customer_id = ?")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        debug!(
            customer_id = customer_id,
            removed = result.rows_affected(),
            "Deleted customer loans"
        );
        Ok(result.rows_affected())
    }
}
