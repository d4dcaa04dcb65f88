//! # Expense Commands

use tracing::debug;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::report::Listing;
use tracker_core::{Expense, ExpenseFilter, NewExpense};

/// Records an expense.
pub async fn add_expense(
    state: &AppState,
    auth: &AuthContext,
    expense: NewExpense,
) -> Result<Expense, ApiError> {
    debug!(by = %auth.username, category = %expense.category, "add_expense command");
    Ok(state.db().expenses().add_expense(expense).await?)
}

/// Lists expenses with their total.
pub async fn list_expenses(
    state: &AppState,
    auth: &AuthContext,
    filter: &ExpenseFilter,
) -> Result<Listing<Expense>, ApiError> {
    debug!(by = %auth.username, ?filter, "list_expenses command");
    let rows = state.db().expenses().list(filter).await?;
    Ok(Listing::new(rows, Expense::amount))
}
