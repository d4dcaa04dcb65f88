//! # Sale Commands
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(&state, &auth, sale, with_receipt = true)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockLedger::record_sale(sale, Some(auth.username))                   │
//! │       │  one transaction: decrement, sale row, receipt row             │
//! │       ▼                                                                 │
//! │  SaleOutcome { sale, receipt }  ──►  reprint_receipt(receipt_id)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::report::Listing;
use tracker_core::{NewSale, Sale, SaleFilter, SaleOutcome};

/// Records a sale. With `with_receipt`, a receipt issued by the caller is
/// stored alongside it.
///
/// ## Errors
/// * `INSUFFICIENT_STOCK` - nothing was recorded
/// * `VALIDATION_ERROR` - nothing was recorded
pub async fn record_sale(
    state: &AppState,
    auth: &AuthContext,
    sale: NewSale,
    with_receipt: bool,
) -> Result<SaleOutcome, ApiError> {
    debug!(
        by = %auth.username,
        item = %sale.item,
        size = %sale.size,
        quantity = sale.quantity,
        with_receipt,
        "record_sale command"
    );

    let issued_by = with_receipt.then_some(auth.username.as_str());
    Ok(state.db().ledger().record_sale(sale, issued_by).await?)
}

/// Lists sales with their revenue total.
pub async fn list_sales(
    state: &AppState,
    auth: &AuthContext,
    filter: &SaleFilter,
) -> Result<Listing<Sale>, ApiError> {
    debug!(by = %auth.username, ?filter, "list_sales command");
    let rows = state.db().sales().list(filter).await?;
    Ok(Listing::new(rows, Sale::total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::test_support::{staff, state};
    use chrono::NaiveDate;
    use tracker_core::{Money, NewStock, PaymentMode};

    async fn stocked() -> AppState {
        let state = state().await;
        state
            .db()
            .stock()
            .add_stock(NewStock {
                item: "Shirt".to_string(),
                size: "M".to_string(),
                quantity: 10,
                unit_cost: Money::from_cents(50_000),
                supplier: None,
                invoice_no: None,
            })
            .await
            .unwrap();
        state
    }

    fn shirt_sale(quantity: i64) -> NewSale {
        NewSale {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            student_name: Some("Jane Doe".to_string()),
            student_class: Some("Grade 4".to_string()),
            item: "Shirt".to_string(),
            size: "m".to_string(),
            quantity,
            selling_price: Money::from_cents(70_000),
            payment_mode: PaymentMode::Mpesa,
            reference: Some("QAB12CD34".to_string()),
        }
    }

    #[tokio::test]
    async fn test_receipt_is_issued_by_caller() {
        let state = stocked().await;
        let outcome = record_sale(&state, &staff(), shirt_sale(3), true).await.unwrap();

        let receipt = outcome.receipt.unwrap();
        assert_eq!(receipt.issued_by, "clerk");
        assert_eq!(receipt.total_amount.to_string(), "KES 2,100.00");
        assert_eq!(outcome.sale.total(), Money::from_cents(210_000));
    }

    #[tokio::test]
    async fn test_without_receipt() {
        let state = stocked().await;
        let outcome = record_sale(&state, &staff(), shirt_sale(1), false).await.unwrap();
        assert!(outcome.receipt.is_none());

        let listing = list_sales(&state, &staff(), &SaleFilter::default()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.total.cents(), 70_000);
    }

    #[tokio::test]
    async fn test_oversell_maps_to_insufficient_stock() {
        let state = stocked().await;
        let err = record_sale(&state, &staff(), shirt_sale(11), true).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 10"));
        let listing = list_sales(&state, &staff(), &SaleFilter::default()).await.unwrap();
        assert!(listing.is_empty());
    }
}
