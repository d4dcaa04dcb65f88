//! # Report Module
//!
//! Row types returned by the report queries and the pure shaping that
//! happens after the SQL aggregation.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tracker-db (SQL)                    tracker-core (THIS MODULE)         │
//! │  ───────────────────                 ─────────────────────────          │
//! │  SUM by category        ──────────►  CategoryTotal rows                 │
//! │  SUM by item [, size]   ──────────►  ItemSalesTotal rows                │
//! │  SUM by month (expense) ──┐                                             │
//! │  SUM by month (sales)   ──┴───────►  merge_monthly_trends → net         │
//! │  stock rows (qty > 0)   ──────────►  InventoryValuation::from_stock     │
//! │  filtered rows          ──────────►  Listing { rows, total }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is cached: each report is recomputed from the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::{Expense, Sale, StockItem};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Aggregated Rows
// =============================================================================

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryTotal {
    pub category: String,
    pub total_cents: i64,
    /// Number of expense rows in the category.
    pub entries: i64,
}

impl CategoryTotal {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Units and revenue for one uniform item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemSalesTotal {
    pub item: String,
    pub quantity: i64,
    pub total_cents: i64,
}

impl ItemSalesTotal {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Units and revenue for one `(item, size)` variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemSizeSalesTotal {
    pub item: String,
    pub size: String,
    pub quantity: i64,
    pub total_cents: i64,
}

impl ItemSizeSalesTotal {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Sum for one calendar month, `month` formatted as `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MonthlyAmount {
    pub month: String,
    pub total_cents: i64,
}

// =============================================================================
// Monthly Trends
// =============================================================================

/// Expenses, sales and net income for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub expenses: Money,
    pub sales: Money,
    /// `sales - expenses`; negative in a loss-making month.
    pub net: Money,
}

/// Outer-joins monthly expense and sales sums.
///
/// A month present on only one side gets zero on the other. The result is
/// sorted by month ascending.
///
/// ## Example
/// ```rust
/// use tracker_core::report::{merge_monthly_trends, MonthlyAmount};
///
/// let expenses = vec![MonthlyAmount { month: "2024-01".into(), total_cents: 500 }];
/// let sales = vec![MonthlyAmount { month: "2024-02".into(), total_cents: 800 }];
///
/// let trends = merge_monthly_trends(&expenses, &sales);
/// assert_eq!(trends.len(), 2);
/// assert_eq!(trends[0].net.cents(), -500);
/// assert_eq!(trends[1].net.cents(), 800);
/// ```
pub fn merge_monthly_trends(expenses: &[MonthlyAmount], sales: &[MonthlyAmount]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<&str, (Money, Money)> = BTreeMap::new();

    for row in expenses {
        months.entry(row.month.as_str()).or_default().0 += Money::from_cents(row.total_cents);
    }
    for row in sales {
        months.entry(row.month.as_str()).or_default().1 += Money::from_cents(row.total_cents);
    }

    months
        .into_iter()
        .map(|(month, (expenses, sales))| MonthlyTrend {
            month: month.to_string(),
            expenses,
            sales,
            net: sales - expenses,
        })
        .collect()
}

// =============================================================================
// Inventory Valuation
// =============================================================================

/// One stock row with its value at purchase cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockValue {
    pub item: String,
    pub size: String,
    pub quantity: i64,
    pub unit_cost: Money,
    /// `quantity × unit_cost`.
    pub value: Money,
}

/// Value of the uniform stock on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryValuation {
    /// Rows with `quantity > 0`, highest value first.
    pub rows: Vec<StockValue>,
    pub total_value: Money,
    /// Total units on hand.
    pub total_items: i64,
    /// `total_value / total_items`, zero when empty.
    pub average_item_value: Money,
    /// Rows at or below the low-stock threshold.
    pub low_stock: Vec<StockValue>,
}

impl InventoryValuation {
    /// Values the given stock rows. Rows with no units are skipped.
    pub fn from_stock(stock: &[StockItem]) -> InventoryValuation {
        let mut rows: Vec<StockValue> = stock
            .iter()
            .filter(|s| s.quantity > 0)
            .map(|s| StockValue {
                item: s.item.clone(),
                size: s.size.clone(),
                quantity: s.quantity,
                unit_cost: s.unit_cost(),
                value: s.value(),
            })
            .collect();

        // Highest value first; ties broken by name so output is stable.
        rows.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then_with(|| a.item.cmp(&b.item))
                .then_with(|| a.size.cmp(&b.size))
        });

        let total_value: Money = rows.iter().map(|r| r.value).sum();
        let total_items: i64 = rows.iter().map(|r| r.quantity).sum();
        let low_stock = rows
            .iter()
            .filter(|r| r.quantity <= LOW_STOCK_THRESHOLD)
            .cloned()
            .collect();

        InventoryValuation {
            rows,
            total_value,
            total_items,
            average_item_value: total_value.per_unit(total_items),
            low_stock,
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Number of recent expenses and sales shown on the dashboard.
pub const DASHBOARD_RECENT_LIMIT: i64 = 5;

/// Month-to-date overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    /// First day of the current month.
    pub period_start: NaiveDate,
    /// Last day included (today).
    pub period_end: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    /// `revenue - expenses`.
    pub net_income: Money,
    pub inventory_value: Money,
    pub recent_expenses: Vec<Expense>,
    pub recent_sales: Vec<Sale>,
}

// =============================================================================
// Listings
// =============================================================================

/// A filtered listing together with its money total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub total: Money,
}

impl<T> Listing<T> {
    /// Wraps `rows`, summing `amount` over them.
    pub fn new(rows: Vec<T>, amount: impl Fn(&T) -> Money) -> Listing<T> {
        let total = rows.iter().map(amount).sum();
        Listing { rows, total }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
