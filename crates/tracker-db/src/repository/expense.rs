//! # Expense Repository
//!
//! Database operations for expenses.
//!
//! Expenses are append-only: there is no update or delete apart from the
//! admin reset.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::gateway::with_reconnect;
use crate::repository::like_pattern;
use tracker_core::validation::{validate_new_expense, validate_search_query};
use tracker_core::{DateRange, Expense, ExpenseFilter, Money, NewExpense};

const EXPENSE_COLUMNS: &str =
    "id, date, category, description, amount_cents, receipt_no, created_at";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Validates and records an expense.
    ///
    /// ## Returns
    /// The stored row with its generated ID.
    pub async fn add_expense(&self, expense: NewExpense) -> DbResult<Expense> {
        let expense = validate_new_expense(expense)?;
        let expense = &expense;
        let pool = &self.pool;

        let stored = with_reconnect("add_expense", move || async move {
            let row: Expense = sqlx::query_as(&format!(
                "INSERT INTO expenses (date, category, description, amount_cents, receipt_no, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 RETURNING {}",
                EXPENSE_COLUMNS
            ))
            .bind(expense.date)
            .bind(&expense.category)
            .bind(&expense.description)
            .bind(expense.amount.cents())
            .bind(&expense.receipt_no)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;
            Ok(row)
        })
        .await?;

        info!(
            id = stored.id,
            category = %stored.category,
            amount = %stored.amount(),
            "Expense recorded"
        );
        Ok(stored)
    }

    /// Lists expenses matching the filter, newest first.
    ///
    /// ## Filter
    /// - `range`: inclusive date range
    /// - `categories`: any of (empty = all)
    /// - `search`: case-insensitive substring of the description
    pub async fn list(&self, filter: &ExpenseFilter) -> DbResult<Vec<Expense>> {
        let search = validate_search_query(filter.search.as_deref())?;
        let search = search.as_deref();

        debug!(?filter, "Listing expenses");

        with_reconnect("list_expenses", move || self.fetch_filtered(filter, search)).await
    }

    async fn fetch_filtered(
        &self,
        filter: &ExpenseFilter,
        search: Option<&str>,
    ) -> DbResult<Vec<Expense>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM expenses WHERE 1 = 1", EXPENSE_COLUMNS));

        if let Some(range) = filter.range {
            qb.push(" AND date BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
        }

        if !filter.categories.is_empty() {
            qb.push(" AND category IN (");
            let mut categories = qb.separated(", ");
            for category in &filter.categories {
                categories.push_bind(category.clone());
            }
            categories.push_unseparated(")");
        }

        if let Some(search) = search {
            qb.push(" AND description LIKE ")
                .push_bind(like_pattern(search))
                .push(" ESCAPE '\\'");
        }

        qb.push(" ORDER BY date DESC, id DESC");

        let rows = qb.build_query_as::<Expense>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Most recent expenses, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Expense>> {
        let pool = &self.pool;
        with_reconnect("recent_expenses", move || async move {
            let rows = sqlx::query_as(&format!(
                "SELECT {} FROM expenses ORDER BY date DESC, id DESC LIMIT ?1",
                EXPENSE_COLUMNS
            ))
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Sum of expense amounts within the range.
    pub async fn total_between(&self, range: DateRange) -> DbResult<Money> {
        let pool = &self.pool;
        let cents: i64 = with_reconnect("total_expenses", move || async move {
            let cents = sqlx::query_scalar(
                "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE date BETWEEN ?1 AND ?2",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await?;
            Ok(cents)
        })
        .await?;

        Ok(Money::from_cents(cents))
    }
}
