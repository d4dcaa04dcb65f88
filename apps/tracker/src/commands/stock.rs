//! # Stock Commands
//!
//! Deliveries and stock lookups. Stock only goes down through sales.

use tracing::debug;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::report::Listing;
use tracker_core::{NewStock, StockItem};

/// Records a delivery for one `(item, size)`.
///
/// ## Returns
/// The stock row after the delivery.
pub async fn add_stock(
    state: &AppState,
    auth: &AuthContext,
    stock: NewStock,
) -> Result<StockItem, ApiError> {
    debug!(by = %auth.username, item = %stock.item, size = %stock.size, "add_stock command");
    Ok(state.db().stock().add_stock(stock).await?)
}

/// Lists every stock row; the total is the value on hand.
pub async fn list_stock(state: &AppState, auth: &AuthContext) -> Result<Listing<StockItem>, ApiError> {
    debug!(by = %auth.username, "list_stock command");
    let rows = state.db().stock().list().await?;
    Ok(Listing::new(rows, StockItem::value))
}

/// Whether `quantity` units of `(item, size)` are on hand right now.
pub async fn check_availability(
    state: &AppState,
    auth: &AuthContext,
    item: &str,
    size: &str,
    quantity: i64,
) -> Result<bool, ApiError> {
    debug!(by = %auth.username, item, size, quantity, "check_availability command");
    Ok(state.db().ledger().check_availability(item, size, quantity).await?)
}
