//! # Report Repository
//!
//! Aggregate queries behind the summaries and the dashboard.
//!
//! ```text
//! ┌───────────────────────┬──────────────────────────────────────────────┐
//! │ expense_summary       │ Σ amount per category, highest first        │
//! │ sales_summary         │ Σ units and revenue per item                 │
//! │ sales_summary_by_size │ Σ units and revenue per (item, size)         │
//! │ inventory_valuation   │ quantity × unit cost per in-stock row        │
//! │ monthly_trends        │ expenses vs sales per YYYY-MM                │
//! │ dashboard             │ month-to-date totals + recent activity       │
//! └───────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! SQL does the grouping; the shaping into report types lives in
//! `tracker_core::report` so it can be tested without a database.

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::gateway::with_reconnect;
use crate::repository::expense::ExpenseRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock::StockRepository;
use tracker_core::report::{
    merge_monthly_trends, CategoryTotal, Dashboard, InventoryValuation, ItemSalesTotal,
    ItemSizeSalesTotal, MonthlyAmount, MonthlyTrend, DASHBOARD_RECENT_LIMIT,
};
use tracker_core::DateRange;

/// Repository for aggregate reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Expense totals per category within the range, highest first.
    pub async fn expense_summary(&self, range: DateRange) -> DbResult<Vec<CategoryTotal>> {
        let pool = &self.pool;
        debug!(start = %range.start, end = %range.end, "Expense summary");

        with_reconnect("expense_summary", move || async move {
            let rows = sqlx::query_as(
                "SELECT category, \
                        SUM(amount_cents) AS total_cents, \
                        COUNT(*) AS entries \
                 FROM expenses \
                 WHERE date BETWEEN ?1 AND ?2 \
                 GROUP BY category \
                 ORDER BY total_cents DESC, category",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Units sold and revenue per item within the range, highest revenue first.
    pub async fn sales_summary(&self, range: DateRange) -> DbResult<Vec<ItemSalesTotal>> {
        let pool = &self.pool;
        debug!(start = %range.start, end = %range.end, "Sales summary");

        with_reconnect("sales_summary", move || async move {
            let rows = sqlx::query_as(
                "SELECT item, \
                        SUM(quantity) AS quantity, \
                        SUM(selling_price_cents * quantity) AS total_cents \
                 FROM uniform_sales \
                 WHERE date BETWEEN ?1 AND ?2 \
                 GROUP BY item \
                 ORDER BY total_cents DESC, item",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Units sold and revenue per `(item, size)` within the range.
    pub async fn sales_summary_by_size(&self, range: DateRange) -> DbResult<Vec<ItemSizeSalesTotal>> {
        let pool = &self.pool;

        with_reconnect("sales_summary_by_size", move || async move {
            let rows = sqlx::query_as(
                "SELECT item, size, \
                        SUM(quantity) AS quantity, \
                        SUM(selling_price_cents * quantity) AS total_cents \
                 FROM uniform_sales \
                 WHERE date BETWEEN ?1 AND ?2 \
                 GROUP BY item, size \
                 ORDER BY item, size",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Current value of the stock on hand.
    pub async fn inventory_valuation(&self) -> DbResult<InventoryValuation> {
        let stock = StockRepository::new(self.pool.clone()).list_in_stock().await?;
        Ok(InventoryValuation::from_stock(&stock))
    }

    /// Expenses and sales per month from `since` onwards, oldest month first.
    pub async fn monthly_trends(&self, since: NaiveDate) -> DbResult<Vec<MonthlyTrend>> {
        let pool = &self.pool;
        debug!(%since, "Monthly trends");

        let (expenses, sales) = with_reconnect("monthly_trends", move || async move {
            let expenses: Vec<MonthlyAmount> = sqlx::query_as(
                "SELECT strftime('%Y-%m', date) AS month, \
                        SUM(amount_cents) AS total_cents \
                 FROM expenses \
                 WHERE date >= ?1 \
                 GROUP BY month",
            )
            .bind(since)
            .fetch_all(pool)
            .await?;

            let sales: Vec<MonthlyAmount> = sqlx::query_as(
                "SELECT strftime('%Y-%m', date) AS month, \
                        SUM(selling_price_cents * quantity) AS total_cents \
                 FROM uniform_sales \
                 WHERE date >= ?1 \
                 GROUP BY month",
            )
            .bind(since)
            .fetch_all(pool)
            .await?;

            Ok((expenses, sales))
        })
        .await?;

        Ok(merge_monthly_trends(&expenses, &sales))
    }

    /// Month-to-date figures as of `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<Dashboard> {
        let period_start = today.with_day(1).unwrap_or(today);
        let period = DateRange::new(period_start, today)?;

        let expense_repo = ExpenseRepository::new(self.pool.clone());
        let sale_repo = SaleRepository::new(self.pool.clone());

        let revenue = sale_repo.total_between(period).await?;
        let expenses = expense_repo.total_between(period).await?;
        let inventory = self.inventory_valuation().await?;

        Ok(Dashboard {
            period_start,
            period_end: today,
            revenue,
            expenses,
            net_income: revenue - expenses,
            inventory_value: inventory.total_value,
            recent_expenses: expense_repo.recent(DASHBOARD_RECENT_LIMIT).await?,
            recent_sales: sale_repo.recent(DASHBOARD_RECENT_LIMIT).await?,
        })
    }
}
