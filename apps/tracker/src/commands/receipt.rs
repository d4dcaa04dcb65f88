//! # Receipt Commands
//!
//! Lookup and reprint of stored receipts.

use chrono::Local;
use tracing::{debug, info};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::receipt::render_receipt_html;
use tracker_core::report::Listing;
use tracker_core::{Receipt, ReceiptFilter};

/// Gets a stored receipt.
///
/// ## Errors
/// * `NOT_FOUND` - no receipt with that ID
pub async fn get_receipt(
    state: &AppState,
    auth: &AuthContext,
    receipt_id: &str,
) -> Result<Receipt, ApiError> {
    debug!(by = %auth.username, receipt_id, "get_receipt command");
    Ok(state.db().receipts().require(receipt_id).await?)
}

/// Lists receipts with the sum of their totals.
pub async fn list_receipts(
    state: &AppState,
    auth: &AuthContext,
    filter: &ReceiptFilter,
) -> Result<Listing<Receipt>, ApiError> {
    debug!(by = %auth.username, ?filter, "list_receipts command");
    let rows = state.db().receipts().list(filter).await?;
    Ok(Listing::new(rows, |r: &Receipt| r.total_amount))
}

/// Renders a stored receipt as a standalone HTML document, stamped now.
pub async fn reprint_receipt(
    state: &AppState,
    auth: &AuthContext,
    receipt_id: &str,
) -> Result<String, ApiError> {
    let receipt = get_receipt(state, auth, receipt_id).await?;
    let html = render_receipt_html(&receipt, &state.receipt_header(), Local::now().naive_local());

    info!(by = %auth.username, receipt_id = %receipt.receipt_id, "Receipt reprinted");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::record_sale;
    use crate::error::ErrorCode;
    use crate::state::test_support::{admin, staff, state};
    use chrono::NaiveDate;
    use tracker_core::{Money, NewSale, NewStock, PaymentMode};

    async fn sold(state: &AppState, student: Option<&str>) -> String {
        state
            .db()
            .stock()
            .add_stock(NewStock {
                item: "Tie".to_string(),
                size: "ONE".to_string(),
                quantity: 5,
                unit_cost: Money::from_cents(10_000),
                supplier: None,
                invoice_no: None,
            })
            .await
            .unwrap();

        let sale = NewSale {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            student_name: student.map(str::to_string),
            student_class: None,
            item: "Tie".to_string(),
            size: "ONE".to_string(),
            quantity: 2,
            selling_price: Money::from_cents(20_000),
            payment_mode: PaymentMode::Cash,
            reference: None,
        };
        record_sale(state, &staff(), sale, true)
            .await
            .unwrap()
            .sale
            .receipt_id
    }

    #[tokio::test]
    async fn test_reprint_renders_stored_receipt() {
        let state = state().await;
        let receipt_id = sold(&state, Some("O'Brien <Grade 2>")).await;

        let html = reprint_receipt(&state, &admin(), &receipt_id.to_lowercase())
            .await
            .unwrap();

        assert!(html.contains("Hillside Academy"));
        assert!(html.contains(&receipt_id));
        assert!(html.contains("O&#39;Brien &lt;Grade 2&gt;"));
        assert!(html.contains("400.00"));
        assert!(html.contains("N/A"));
    }

    #[tokio::test]
    async fn test_missing_receipt_is_not_found() {
        let state = state().await;
        let err = get_receipt(&state, &staff(), "REC-DEADBEEF").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_receipts_total() {
        let state = state().await;
        sold(&state, None).await;

        let listing = list_receipts(&state, &staff(), &ReceiptFilter::default()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.rows[0].customer_name, "Walk-in Customer");
        assert_eq!(listing.total.cents(), 40_000);
    }
}
