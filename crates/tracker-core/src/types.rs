//! # Domain Types
//!
//! Core domain types used throughout the School Tracker.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Expense      │   │   StockItem     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  date           │   │  (item, size)   │   │  item, size     │       │
//! │  │  category       │   │  quantity ≥ 0   │   │  quantity       │       │
//! │  │  amount_cents   │   │  unit_cost      │   │  selling_price  │       │
//! │  │  append-only    │   │  mutable        │   │  receipt_id ────┼──┐    │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘  │    │
//! │                                                                    │    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │    │
//! │  │  PaymentMode    │   │     Role        │   │    Receipt      │◄─┘    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Cash, M-Pesa   │   │  Admin          │   │  customer_name  │       │
//! │  │  Bank, Cheque   │   │  Staff          │   │  items (JSON)   │       │
//! │  └─────────────────┘   └─────────────────┘   │  total_amount   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row Types vs Input Types
//! Rows read back from the database (`Expense`, `StockItem`, `Sale`) store
//! money as `*_cents` columns with `Money` accessors. Input types
//! (`NewExpense`, `NewStock`, `NewSale`) carry `Money` directly and are
//! validated before they reach a repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Payment Mode
// =============================================================================

/// How a uniform sale was paid for.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Mpesa,
    BankTransfer,
    Cheque,
    SaccoPaybill,
    Other,
}

impl PaymentMode {
    /// Every payment mode, in the order pickers show them.
    pub const ALL: [PaymentMode; 6] = [
        PaymentMode::Cash,
        PaymentMode::Mpesa,
        PaymentMode::BankTransfer,
        PaymentMode::Cheque,
        PaymentMode::SaccoPaybill,
        PaymentMode::Other,
    ];

    /// Storage code (`mpesa`, `bank_transfer`, ...).
    pub const fn code(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Mpesa => "mpesa",
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cheque => "cheque",
            PaymentMode::SaccoPaybill => "sacco_paybill",
            PaymentMode::Other => "other",
        }
    }

    /// Label printed on receipts.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Mpesa => "M-Pesa",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::SaccoPaybill => "Sacco Paybill",
            PaymentMode::Other => "Other",
        }
    }
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::Cash
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the storage code or the printed label, ignoring case.
///
/// `"Bank"` is accepted as a short form of `Bank Transfer`.
impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("bank") {
            return Ok(PaymentMode::BankTransfer);
        }
        PaymentMode::ALL
            .into_iter()
            .find(|mode| {
                wanted.eq_ignore_ascii_case(mode.code()) || wanted.eq_ignore_ascii_case(mode.label())
            })
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_mode".to_string(),
                allowed: PaymentMode::ALL.iter().map(|m| m.label().to_string()).collect(),
            })
    }
}

// =============================================================================
// Role
// =============================================================================

/// What a signed-in user may do.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May reset the store and manage users.
    Admin,
    /// Day-to-day data entry and reports.
    Staff,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "staff".to_string()],
            }),
        }
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A recorded school expense. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount_cents: i64,
    /// Supplier's receipt or voucher number, if any.
    pub receipt_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Input for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub receipt_no: Option<String>,
}

// =============================================================================
// Stock Item
// =============================================================================

/// Uniform stock for one `(item, size)` pair.
///
/// The only mutable entity: additions raise `quantity` and overwrite the
/// purchase details, sales lower `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockItem {
    pub id: i64,
    pub item: String,
    pub size: String,
    pub quantity: i64,
    /// Purchase cost per unit from the latest delivery.
    pub unit_cost_cents: i64,
    pub supplier: Option<String>,
    pub invoice_no: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl StockItem {
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Value of the units on hand at purchase cost.
    #[inline]
    pub fn value(&self) -> Money {
        self.unit_cost().multiply_quantity(self.quantity)
    }

    /// Checks whether `quantity` units can be sold from this row.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Input for a stock delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStock {
    pub item: String,
    pub size: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub supplier: Option<String>,
    pub invoice_no: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded uniform sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub date: NaiveDate,
    pub student_name: Option<String>,
    pub student_class: Option<String>,
    pub item: String,
    pub size: String,
    pub quantity: i64,
    pub selling_price_cents: i64,
    pub payment_mode: PaymentMode,
    /// Payment reference (M-Pesa code, cheque number, ...).
    pub reference: Option<String>,
    pub receipt_id: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// `selling_price × quantity`.
    #[inline]
    pub fn total(&self) -> Money {
        self.selling_price().multiply_quantity(self.quantity)
    }
}

/// Input for recording a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub date: NaiveDate,
    pub student_name: Option<String>,
    pub student_class: Option<String>,
    pub item: String,
    pub size: String,
    pub quantity: i64,
    pub selling_price: Money,
    pub payment_mode: PaymentMode,
    pub reference: Option<String>,
}

/// What a successful sale produced.
#[derive(Debug, Clone, Serialize)]
pub struct SaleOutcome {
    pub sale: Sale,
    /// Present when a receipt was requested.
    pub receipt: Option<Receipt>,
}

// =============================================================================
// Receipt
// =============================================================================

/// One line on a receipt.
///
/// Serialized into `items_json` with `price` in major units:
/// `{"name":"Shirt","size":"M","price":700.0,"quantity":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub size: String,
    #[serde(with = "crate::money::major_units")]
    pub price: Money,
    pub quantity: i64,
}

impl ReceiptLine {
    /// `price × quantity`.
    #[inline]
    pub fn amount(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A reprintable proof-of-sale document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub items: Vec<ReceiptLine>,
    pub total_amount: Money,
    pub payment_mode: PaymentMode,
    pub reference: Option<String>,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Sum of the line amounts.
    pub fn line_total(&self) -> Money {
        self.items.iter().map(ReceiptLine::amount).sum()
    }

    /// Serializes the line items for the `items_json` column.
    pub fn items_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(&self.items).map_err(|e| CoreError::InvalidReceiptData {
            receipt_id: self.receipt_id.clone(),
            reason: e.to_string(),
        })
    }
}

/// A receipt as stored, with line items still as JSON text.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReceiptRecord {
    pub receipt_id: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub items_json: String,
    pub total_amount_cents: i64,
    pub payment_mode: String,
    pub reference: Option<String>,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReceiptRecord> for Receipt {
    type Error = CoreError;

    fn try_from(record: ReceiptRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| CoreError::InvalidReceiptData {
            receipt_id: record.receipt_id.clone(),
            reason,
        };

        let items: Vec<ReceiptLine> =
            serde_json::from_str(&record.items_json).map_err(|e| invalid(e.to_string()))?;
        let payment_mode: PaymentMode = record
            .payment_mode
            .parse()
            .map_err(|e: ValidationError| invalid(e.to_string()))?;

        Ok(Receipt {
            receipt_id: record.receipt_id,
            date: record.date,
            customer_name: record.customer_name,
            items,
            total_amount: Money::from_cents(record.total_amount_cents),
            payment_mode,
            reference: record.reference,
            issued_by: record.issued_by,
            created_at: record.created_at,
        })
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff account in the credential store.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Filters
// =============================================================================

/// Inclusive date range for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "date_range".to_string(),
                reason: format!("start {} is after end {}", start, end),
            });
        }
        Ok(DateRange { start, end })
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Filter for the expense listing. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub range: Option<DateRange>,
    pub categories: Vec<String>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

/// Filter for the sales listing. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilter {
    pub range: Option<DateRange>,
    pub items: Vec<String>,
    /// Case-insensitive substring of the student name or payment reference.
    pub search: Option<String>,
}

/// Filter for the receipt listing. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptFilter {
    pub range: Option<DateRange>,
    /// Case-insensitive substring of the receipt ID or customer name.
    pub search: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(items_json: &str, payment_mode: &str) -> ReceiptRecord {
        ReceiptRecord {
            receipt_id: "REC-1A2B3C4D".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            customer_name: "Jane Doe".to_string(),
            items_json: items_json.to_string(),
            total_amount_cents: 210_000,
            payment_mode: payment_mode.to_string(),
            reference: None,
            issued_by: "bursar".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_mode_parse() {
        assert_eq!("cash".parse::<PaymentMode>().unwrap(), PaymentMode::Cash);
        assert_eq!("M-Pesa".parse::<PaymentMode>().unwrap(), PaymentMode::Mpesa);
        assert_eq!("mpesa".parse::<PaymentMode>().unwrap(), PaymentMode::Mpesa);
        assert_eq!(
            "Bank Transfer".parse::<PaymentMode>().unwrap(),
            PaymentMode::BankTransfer
        );
        assert_eq!("bank".parse::<PaymentMode>().unwrap(), PaymentMode::BankTransfer);
        assert!("barter".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_payment_mode_serde_uses_code() {
        let json = serde_json::to_string(&PaymentMode::SaccoPaybill).unwrap();
        assert_eq!(json, r#""sacco_paybill""#);
        for mode in PaymentMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.code()));
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("staff".parse::<Role>().unwrap(), Role::Staff);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_sale_total() {
        let sale = Sale {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            student_name: None,
            student_class: None,
            item: "Shirt".to_string(),
            size: "M".to_string(),
            quantity: 3,
            selling_price_cents: 70_000,
            payment_mode: PaymentMode::Cash,
            reference: None,
            receipt_id: "REC-1A2B3C4D".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(sale.total().cents(), 210_000);
    }

    #[test]
    fn test_receipt_record_round_trip() {
        let receipt = Receipt::try_from(record(
            r#"[{"name":"Shirt","size":"M","price":700.0,"quantity":3}]"#,
            "mpesa",
        ))
        .unwrap();

        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].price.cents(), 70_000);
        assert_eq!(receipt.line_total(), receipt.total_amount);
        assert_eq!(receipt.payment_mode, PaymentMode::Mpesa);
        assert_eq!(
            receipt.items_json().unwrap(),
            r#"[{"name":"Shirt","size":"M","price":700.0,"quantity":3}]"#
        );
    }

    #[test]
    fn test_receipt_record_rejects_bad_json() {
        let err = Receipt::try_from(record("not json", "cash")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReceiptData { .. }));

        let err = Receipt::try_from(record("[]", "barter")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReceiptData { .. }));
    }

    #[test]
    fn test_date_range() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let range = DateRange::new(jan, feb).unwrap();
        assert!(range.contains(jan));
        assert!(range.contains(feb));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()));

        assert!(DateRange::new(feb, jan).is_err());
    }
}
