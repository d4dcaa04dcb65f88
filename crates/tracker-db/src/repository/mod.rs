//! # Repository Module
//!
//! Database repository implementations for the School Tracker.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command layer                                                         │
//! │       │                                                                 │
//! │       │  db.ledger().record_sale(sale, Some("bursar"))                 │
//! │       ▼                                                                 │
//! │  StockLedger                                                           │
//! │  ├── check_availability(&self, item, size, qty)                        │
//! │  └── record_sale(&self, sale, issued_by)                               │
//! │       │                                                                 │
//! │       │  gateway::with_reconnect ──► SQL                               │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ExpenseRepository`] - Expense inserts and filtered listings
//! - [`StockRepository`] - Stock upserts and listings
//! - [`StockLedger`] - Availability checks and atomic sale recording
//! - [`SaleRepository`] - Sale listings
//! - [`ReceiptRepository`] - Receipt lookup for reprints
//! - [`ReportRepository`] - Aggregate reports
//! - [`UserRepository`] - Credential store
//!
//! [`ExpenseRepository`]: expense::ExpenseRepository
//! [`StockRepository`]: stock::StockRepository
//! [`StockLedger`]: ledger::StockLedger
//! [`SaleRepository`]: sale::SaleRepository
//! [`ReceiptRepository`]: receipt::ReceiptRepository
//! [`ReportRepository`]: report::ReportRepository
//! [`UserRepository`]: user::UserRepository

pub mod expense;
pub mod ledger;
pub mod receipt;
pub mod report;
pub mod sale;
pub mod stock;
pub mod user;

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern and wraps
/// the term in wildcards.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use tracker_core::{Money, NewExpense, NewSale, NewStock, PaymentMode};

    use crate::pool::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn expense(date: NaiveDate, category: &str, description: &str, cents: i64) -> NewExpense {
        NewExpense {
            date,
            category: category.to_string(),
            description: description.to_string(),
            amount: Money::from_cents(cents),
            receipt_no: None,
        }
    }

    pub fn stock(item: &str, size: &str, quantity: i64, unit_cost_cents: i64) -> NewStock {
        NewStock {
            item: item.to_string(),
            size: size.to_string(),
            quantity,
            unit_cost: Money::from_cents(unit_cost_cents),
            supplier: Some("Uniform Supplies Ltd".to_string()),
            invoice_no: None,
        }
    }

    pub fn sale(item: &str, size: &str, quantity: i64, price_cents: i64) -> NewSale {
        NewSale {
            date: date(2024, 1, 15),
            student_name: Some("Jane Doe".to_string()),
            student_class: Some("Grade 4".to_string()),
            item: item.to_string(),
            size: size.to_string(),
            quantity,
            selling_price: Money::from_cents(price_cents),
            payment_mode: PaymentMode::Cash,
            reference: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jane"), "%jane%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
