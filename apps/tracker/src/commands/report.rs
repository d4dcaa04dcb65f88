//! # Report Commands
//!
//! Every report is recomputed from the store on each call.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::report::{
    CategoryTotal, Dashboard, InventoryValuation, ItemSalesTotal, ItemSizeSalesTotal, MonthlyTrend,
};
use tracker_core::{DateRange, Money};

/// Expense totals per category.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub range: DateRange,
    pub categories: Vec<CategoryTotal>,
    pub total: Money,
}

/// Sales per item and per `(item, size)` variant.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub range: DateRange,
    pub by_item: Vec<ItemSalesTotal>,
    pub by_variant: Vec<ItemSizeSalesTotal>,
    pub total: Money,
}

pub async fn expense_summary(
    state: &AppState,
    auth: &AuthContext,
    range: DateRange,
) -> Result<ExpenseSummary, ApiError> {
    debug!(by = %auth.username, start = %range.start, end = %range.end, "expense_summary command");

    let categories = state.db().reports().expense_summary(range).await?;
    let total = categories.iter().map(CategoryTotal::total).sum();
    Ok(ExpenseSummary {
        range,
        categories,
        total,
    })
}

pub async fn sales_summary(
    state: &AppState,
    auth: &AuthContext,
    range: DateRange,
) -> Result<SalesSummary, ApiError> {
    debug!(by = %auth.username, start = %range.start, end = %range.end, "sales_summary command");

    let reports = state.db().reports();
    let by_item = reports.sales_summary(range).await?;
    let by_variant = reports.sales_summary_by_size(range).await?;
    let total = by_item.iter().map(ItemSalesTotal::total).sum();
    Ok(SalesSummary {
        range,
        by_item,
        by_variant,
        total,
    })
}

pub async fn inventory_valuation(
    state: &AppState,
    auth: &AuthContext,
) -> Result<InventoryValuation, ApiError> {
    debug!(by = %auth.username, "inventory_valuation command");
    Ok(state.db().reports().inventory_valuation().await?)
}

/// Monthly expenses against sales from `since` onwards.
pub async fn monthly_trends(
    state: &AppState,
    auth: &AuthContext,
    since: NaiveDate,
) -> Result<Vec<MonthlyTrend>, ApiError> {
    debug!(by = %auth.username, %since, "monthly_trends command");
    Ok(state.db().reports().monthly_trends(since).await?)
}

/// Month-to-date overview as of `today`.
pub async fn dashboard(
    state: &AppState,
    auth: &AuthContext,
    today: NaiveDate,
) -> Result<Dashboard, ApiError> {
    debug!(by = %auth.username, %today, "dashboard command");
    Ok(state.db().reports().dashboard(today).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::expense::add_expense;
    use crate::commands::sale::record_sale;
    use crate::commands::stock::add_stock;
    use crate::state::test_support::{staff, state};
    use tracker_core::{NewExpense, NewSale, NewStock, PaymentMode};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    async fn seeded() -> AppState {
        let state = state().await;
        let auth = staff();

        for (category, cents) in [("Food", 30_000), ("Food", 20_000), ("Fuel", 80_000)] {
            add_expense(
                &state,
                &auth,
                NewExpense {
                    date: date(4, 3),
                    category: category.to_string(),
                    description: "Weekly run".to_string(),
                    amount: Money::from_cents(cents),
                    receipt_no: None,
                },
            )
            .await
            .unwrap();
        }

        for (size, qty) in [("M", 10), ("L", 4)] {
            add_stock(
                &state,
                &auth,
                NewStock {
                    item: "Shirt".to_string(),
                    size: size.to_string(),
                    quantity: qty,
                    unit_cost: Money::from_cents(50_000),
                    supplier: None,
                    invoice_no: None,
                },
            )
            .await
            .unwrap();
        }

        record_sale(
            &state,
            &auth,
            NewSale {
                date: date(4, 10),
                student_name: None,
                student_class: None,
                item: "Shirt".to_string(),
                size: "M".to_string(),
                quantity: 3,
                selling_price: Money::from_cents(70_000),
                payment_mode: PaymentMode::Cash,
                reference: None,
            },
            true,
        )
        .await
        .unwrap();

        state
    }

    #[tokio::test]
    async fn test_expense_summary_total_matches_rows() {
        let state = seeded().await;
        let range = DateRange::new(date(4, 1), date(4, 30)).unwrap();

        let summary = expense_summary(&state, &staff(), range).await.unwrap();
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, "Fuel");
        assert_eq!(summary.total.cents(), 130_000);
    }

    #[tokio::test]
    async fn test_sales_summary() {
        let state = seeded().await;
        let range = DateRange::new(date(4, 1), date(4, 30)).unwrap();

        let summary = sales_summary(&state, &staff(), range).await.unwrap();
        assert_eq!(summary.by_item.len(), 1);
        assert_eq!(summary.by_variant.len(), 1);
        assert_eq!(summary.total.cents(), 210_000);
    }

    #[tokio::test]
    async fn test_valuation_trends_and_dashboard() {
        let state = seeded().await;

        let valuation = inventory_valuation(&state, &staff()).await.unwrap();
        assert_eq!(valuation.total_items, 11);
        assert_eq!(valuation.low_stock.len(), 1);

        let trends = monthly_trends(&state, &staff(), date(1, 1)).await.unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].net.cents(), 210_000 - 130_000);

        let dash = dashboard(&state, &staff(), date(4, 20)).await.unwrap();
        assert_eq!(dash.net_income.cents(), 80_000);
        assert_eq!(dash.inventory_value.cents(), 11 * 50_000);
    }
}
