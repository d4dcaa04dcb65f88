//! # Validation Module
//!
//! Input validation for everything that is written to the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command / CLI                                                │
//! │  ├── Parsing (dates, amounts, payment modes)                           │
//! │  └── Immediate feedback to the clerk                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, positive amounts                        │
//! │  └── Normalization (trimmed text, upper-case sizes)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0)                                  │
//! │  └── UNIQUE (item, size), UNIQUE receipt_id                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `validate_new_*` functions take their input by value and hand back
//! the normalized copy that should be stored.
//!
//! ## Usage
//! ```rust
//! use tracker_core::validation::{normalize_size, validate_quantity};
//!
//! assert_eq!(normalize_size(" m ").unwrap(), "M");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewExpense, NewSale, NewStock};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_SIZE_LEN: usize = 20;
const MAX_REFERENCE_LEN: usize = 100;
const MAX_SEARCH_LEN: usize = 100;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and checks its length.
fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field; blank becomes `None`.
fn optional_text(field: &str, value: Option<String>, max: usize) -> ValidationResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => required_text(field, &v, max).map(Some),
    }
}

/// Normalizes a uniform size: trimmed and upper-cased.
///
/// ## Example
/// ```rust
/// use tracker_core::validation::normalize_size;
///
/// assert_eq!(normalize_size("xl").unwrap(), "XL");
/// assert_eq!(normalize_size(" 32 ").unwrap(), "32");
/// assert!(normalize_size("  ").is_err());
/// ```
pub fn normalize_size(size: &str) -> ValidationResult<String> {
    required_text("size", size, MAX_SIZE_LEN).map(|s| s.to_uppercase())
}

/// Validates a uniform item name and returns it trimmed.
pub fn validate_item_name(item: &str) -> ValidationResult<String> {
    required_text("item", item, MAX_NAME_LEN)
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query, or `None` when it is blank.
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let query = match query.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(q) => q,
    };

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(Some(query.to_string()))
}

/// Normalizes a receipt ID typed by a user (`rec-1a2b3c4d` → `REC-1A2B3C4D`).
pub fn normalize_receipt_id(receipt_id: &str) -> ValidationResult<String> {
    required_text("receipt_id", receipt_id, MAX_REFERENCE_LEN).map(|id| id.to_uppercase())
}

/// Validates a username for the credential store.
///
/// ## Rules
/// - 3 to 50 characters
/// - Letters, digits, `.`, `_` and `-` only
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = required_text("username", username, 50)?;

    if username.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(username)
}

/// Validates a new password. Not trimmed: spaces are significant.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (expenses, prices).
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_AMOUNT_CENTS
pub fn validate_positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates an amount that may be zero (unit cost of donated stock).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates and normalizes an expense before insert.
///
/// ## Rules
/// - `category` and `description` required
/// - `amount` > 0
pub fn validate_new_expense(expense: NewExpense) -> ValidationResult<NewExpense> {
    validate_positive_cents("amount", expense.amount.cents())?;

    Ok(NewExpense {
        date: expense.date,
        category: required_text("category", &expense.category, MAX_NAME_LEN)?,
        description: required_text("description", &expense.description, MAX_DESCRIPTION_LEN)?,
        amount: expense.amount,
        receipt_no: optional_text("receipt_no", expense.receipt_no, MAX_REFERENCE_LEN)?,
    })
}

/// Validates and normalizes a stock delivery before upsert.
///
/// ## Rules
/// - `item` and `size` required, size upper-cased
/// - `quantity` positive
/// - `unit_cost` ≥ 0
pub fn validate_new_stock(stock: NewStock) -> ValidationResult<NewStock> {
    validate_quantity(stock.quantity)?;
    validate_non_negative_cents("unit_cost", stock.unit_cost.cents())?;

    Ok(NewStock {
        item: validate_item_name(&stock.item)?,
        size: normalize_size(&stock.size)?,
        quantity: stock.quantity,
        unit_cost: stock.unit_cost,
        supplier: optional_text("supplier", stock.supplier, MAX_NAME_LEN)?,
        invoice_no: optional_text("invoice_no", stock.invoice_no, MAX_REFERENCE_LEN)?,
    })
}

/// Validates and normalizes a sale before the ledger runs.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Clerk records: Shirt / "m" / qty 3 / KES 700                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_new_sale ← THIS FUNCTION                                     │
/// │       │                                                                 │
/// │       ├── size blank?       → Error: "size is required"                │
/// │       ├── qty <= 0?         → Error: "quantity must be positive"       │
/// │       ├── price <= 0?       → Error: "selling_price must be positive"  │
/// │       │                                                                 │
/// │       └── OK → Shirt / "M" / 3 / 70000 cents → stock ledger            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_new_sale(sale: NewSale) -> ValidationResult<NewSale> {
    validate_quantity(sale.quantity)?;
    validate_positive_cents("selling_price", sale.selling_price.cents())?;

    Ok(NewSale {
        date: sale.date,
        student_name: optional_text("student_name", sale.student_name, MAX_NAME_LEN)?,
        student_class: optional_text("student_class", sale.student_class, MAX_NAME_LEN)?,
        item: validate_item_name(&sale.item)?,
        size: normalize_size(&sale.size)?,
        quantity: sale.quantity,
        selling_price: sale.selling_price,
        payment_mode: sale.payment_mode,
        reference: optional_text("reference", sale.reference, MAX_REFERENCE_LEN)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
