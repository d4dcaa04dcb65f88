//! # Receipt Module
//!
//! Receipt identifiers, receipt synthesis from a sale, and the printable
//! HTML document.
//!
//! ## Receipt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  generate_receipt_id()          "REC-" + 8 upper-case hex chars         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Sale row (receipt_id) ──► Receipt::from_sale(sale, issued_by)          │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                        receipts row (items_json)                        │
//! │                                   │                                     │
//! │               reprint by ID       ▼                                     │
//! │                        render_receipt_html(receipt, header, at)         │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                     self-contained HTML document                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering is pure: the timestamp is passed in, so the same receipt and
//! the same `rendered_at` always produce byte-identical output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Receipt, ReceiptLine, Sale};
use crate::WALK_IN_CUSTOMER;

/// Prefix of every receipt identifier.
pub const RECEIPT_ID_PREFIX: &str = "REC-";

/// Number of hex characters after the prefix.
const RECEIPT_ID_HEX_LEN: usize = 8;

// =============================================================================
// Receipt IDs
// =============================================================================

/// Generates a new receipt identifier such as `REC-1A2B3C4D`.
///
/// The random part is the first eight hex digits of a UUID v4. Uniqueness
/// is not guaranteed here; the stock ledger re-draws on collision.
pub fn generate_receipt_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        RECEIPT_ID_PREFIX,
        hex[..RECEIPT_ID_HEX_LEN].to_uppercase()
    )
}

/// Checks the `REC-XXXXXXXX` shape.
pub fn is_receipt_id(value: &str) -> bool {
    match value.strip_prefix(RECEIPT_ID_PREFIX) {
        Some(hex) => {
            hex.len() == RECEIPT_ID_HEX_LEN
                && hex
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        }
        None => false,
    }
}

// =============================================================================
// Receipt Synthesis
// =============================================================================

impl Receipt {
    /// Builds the receipt for a single-line sale.
    ///
    /// The customer is the student, or "Walk-in Customer" when no name was
    /// recorded. The total is `selling_price × quantity`.
    pub fn from_sale(sale: &Sale, issued_by: &str) -> Receipt {
        let line = ReceiptLine {
            name: sale.item.clone(),
            size: sale.size.clone(),
            price: sale.selling_price(),
            quantity: sale.quantity,
        };

        Receipt {
            receipt_id: sale.receipt_id.clone(),
            date: sale.date,
            customer_name: sale
                .student_name
                .clone()
                .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
            total_amount: line.amount(),
            items: vec![line],
            payment_mode: sale.payment_mode,
            reference: sale.reference.clone(),
            issued_by: issued_by.to_string(),
            created_at: sale.created_at,
        }
    }
}

// =============================================================================
// HTML Rendering
// =============================================================================

/// School details printed at the top of every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptHeader {
    pub school_name: String,
    /// Postal address and phone, printed under the name.
    pub address_line: String,
}

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const CELL: &str = "border: 1px solid #ddd; padding: 8px;";
const CELL_RIGHT: &str = "border: 1px solid #ddd; padding: 8px; text-align: right;";

/// Renders a receipt as a standalone HTML document.
///
/// ## Layout
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │              SCHOOL NAME                     │
/// │        address line | Tel: ...               │
/// │  ─────────────── RECEIPT ───────────────     │
/// │  Receipt #  REC-..      Student   Jane Doe   │
/// │  Date       2024-01-15  Payment   M-Pesa     │
/// │                         Reference N/A        │
/// │  ┌──────┬──────┬───────┬─────┬──────────┐    │
/// │  │ Item │ Size │ Price │ Qty │ Amount   │    │
/// │  ├──────┼──────┼───────┼─────┼──────────┤    │
/// │  │ ...  │      │       │     │          │    │
/// │  ├──────┴──────┴───────┴─────┼──────────┤    │
/// │  │                     Total │ Σ amount │    │
/// │  └───────────────────────────┴──────────┘    │
/// │                     Issued By: bursar        │
/// │                     2024-01-15 10:30:00      │
/// │        Thank you for your business!          │
/// └──────────────────────────────────────────────┘
/// ```
///
/// The footer total is the sum of the rendered line amounts.
pub fn render_receipt_html(
    receipt: &Receipt,
    header: &ReceiptHeader,
    rendered_at: NaiveDateTime,
) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Receipt {}</title>\n</head>\n<body>\n",
        escape_html(&receipt.receipt_id)
    ));
    html.push_str(
        "<div style=\"font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; \
         padding: 20px; border: 1px solid #ddd; border-radius: 5px;\">\n",
    );

    // Header block
    html.push_str(&format!(
        "<div style=\"text-align: center; margin-bottom: 20px;\">\n\
         <h2>{}</h2>\n\
         <p>{}</p>\n\
         <h3 style=\"border-top: 1px solid #ddd; border-bottom: 1px solid #ddd; padding: 10px 0;\">RECEIPT</h3>\n\
         </div>\n",
        escape_html(&header.school_name),
        escape_html(&header.address_line),
    ));

    // Metadata
    let customer = if receipt.customer_name.trim().is_empty() {
        WALK_IN_CUSTOMER
    } else {
        receipt.customer_name.as_str()
    };
    let reference = receipt
        .reference
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or("N/A");

    html.push_str(&format!(
        "<div style=\"display: flex; justify-content: space-between; margin-bottom: 20px;\">\n\
         <div>\n\
         <p><strong>Receipt #:</strong> {}</p>\n\
         <p><strong>Date:</strong> {}</p>\n\
         </div>\n\
         <div>\n\
         <p><strong>Student:</strong> {}</p>\n\
         <p><strong>Payment Method:</strong> {}</p>\n\
         <p><strong>Reference:</strong> {}</p>\n\
         </div>\n\
         </div>\n",
        escape_html(&receipt.receipt_id),
        receipt.date.format("%Y-%m-%d"),
        escape_html(customer),
        escape_html(receipt.payment_mode.label()),
        escape_html(reference),
    ));

    // Line table
    html.push_str(&format!(
        "<table style=\"width: 100%; border-collapse: collapse; margin-bottom: 20px;\">\n\
         <thead>\n<tr style=\"background-color: #f5f5f5;\">\n\
         <th style=\"{c} text-align: left;\">Item</th>\n\
         <th style=\"{c} text-align: left;\">Size</th>\n\
         <th style=\"{r}\">Price</th>\n\
         <th style=\"{r}\">Qty</th>\n\
         <th style=\"{r}\">Amount</th>\n\
         </tr>\n</thead>\n<tbody>\n",
        c = CELL,
        r = CELL_RIGHT,
    ));

    for line in &receipt.items {
        html.push_str(&format!(
            "<tr>\n\
             <td style=\"{c}\">{}</td>\n\
             <td style=\"{c}\">{}</td>\n\
             <td style=\"{r}\">{}</td>\n\
             <td style=\"{r}\">{}</td>\n\
             <td style=\"{r}\">{}</td>\n\
             </tr>\n",
            escape_html(&line.name),
            escape_html(&line.size),
            line.price,
            line.quantity,
            line.amount(),
            c = CELL,
            r = CELL_RIGHT,
        ));
    }

    html.push_str(&format!(
        "</tbody>\n<tfoot>\n<tr>\n\
         <td colspan=\"4\" style=\"{r}\"><strong>Total:</strong></td>\n\
         <td style=\"{r}\"><strong>{}</strong></td>\n\
         </tr>\n</tfoot>\n</table>\n",
        receipt.line_total(),
        r = CELL_RIGHT,
    ));

    // Footer
    html.push_str(&format!(
        "<div style=\"margin-top: 30px; text-align: right;\">\n\
         <p><strong>Issued By:</strong> {}</p>\n\
         <p style=\"font-size: 0.9em; color: #666;\">{}</p>\n\
         </div>\n\
         <div style=\"text-align: center; margin-top: 40px; font-size: 0.8em; color: #777;\">\n\
         <p>Thank you for your business!</p>\n\
         <p>This is a computer-generated receipt</p>\n\
         </div>\n",
        escape_html(&receipt.issued_by),
        rendered_at.format("%Y-%m-%d %H:%M:%S"),
    ));

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

// =============================================================================
// Unit Tests
// =============================================================================
