//! # tracker-core: Pure Business Logic for the School Tracker
//!
//! This crate holds everything about expenses, uniform stock, sales and
//! receipts that can be decided without touching a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      School Tracker Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tracker CLI / command layer                     │   │
//! │  │   add_expense, add_stock, record_sale, reprint_receipt, ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tracker-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │  │  types  │ │  money  │ │ receipt  │ │ report  │ │ export  │  │   │
//! │  │  │ Expense │ │  Money  │ │  HTML    │ │ trends  │ │  CSV    │  │   │
//! │  │  │  Sale   │ │  KES    │ │ REC-ids  │ │ totals  │ │         │  │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tracker-db (Database Layer)                     │   │
//! │  │        SQLite pool, migrations, stock ledger, reports           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Expense, StockItem, Sale, Receipt, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules applied before every write
//! - [`receipt`] - Receipt IDs, receipt synthesis and HTML rendering
//! - [`report`] - Report row types and in-memory report shaping
//! - [`export`] - CSV serialization of report and listing rows
//!
//! ## Example Usage
//!
//! ```rust
//! use tracker_core::money::Money;
//!
//! // Shirt sold at KES 700.00, three of them
//! let price = Money::from_cents(70_000);
//! let total = price.multiply_quantity(3);
//!
//! assert_eq!(total.to_string(), "KES 2,100.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency code shown in front of every amount.
pub const CURRENCY_CODE: &str = "KES";

/// Stock rows at or below this quantity are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Customer name used on receipts when no student name was given.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Standard expense categories offered to staff.
///
/// Category is free text in storage; this list only drives pickers and
/// seed data.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Stationery",
    "Food",
    "Fuel",
    "Maintenance",
    "Salaries",
    "Utilities",
    "Transport",
    "Events",
    "Mechanic",
    "Development",
    "Other",
];

/// Uniform items the school stocks.
pub const UNIFORM_ITEMS: &[&str] = &[
    "Sweater",
    "Tracksuit",
    "Dress",
    "T-shirt",
    "Trousers",
    "Shirt",
    "Tie",
    "Socks",
    "Blazer",
    "PE Kit",
];

/// Maximum quantity in a single stock addition or sale line.
///
/// Catches typos such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest price, unit cost or expense amount accepted, in cents
/// (KES 10,000,000,000.00).
///
/// `MAX_AMOUNT_CENTS × MAX_ITEM_QUANTITY` must fit in an `i64` so a sale
/// line total can never overflow.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;

const _: () = assert!(MAX_AMOUNT_CENTS.checked_mul(MAX_ITEM_QUANTITY).is_some());
