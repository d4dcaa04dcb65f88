//! # CSV Export
//!
//! Serializes report and listing rows as RFC 4180 CSV.
//!
//! Money columns are written as plain decimals (`2100.00`) so spreadsheets
//! read them as numbers. Lines end in CRLF.

use crate::report::{CategoryTotal, ItemSalesTotal, ItemSizeSalesTotal, MonthlyTrend, StockValue};
use crate::types::{Expense, Receipt, Sale, StockItem};

/// A row type that can be exported as CSV.
pub trait CsvRecord {
    /// Column names, in field order.
    fn headers() -> &'static [&'static str];

    /// Field values for this row.
    fn fields(&self) -> Vec<String>;
}

/// Quotes a field when it contains a comma, quote, CR or LF.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Renders rows as a CSV document with a header line.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> String {
    let mut out = String::new();
    push_line(&mut out, T::headers().iter().map(|h| h.to_string()));
    for row in rows {
        push_line(&mut out, row.fields());
    }
    out
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// =============================================================================
// Implementations
// =============================================================================

impl CsvRecord for Expense {
    fn headers() -> &'static [&'static str] {
        &["date", "category", "description", "amount", "receipt_no"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.category.clone(),
            self.description.clone(),
            self.amount().to_decimal_string(),
            opt(&self.receipt_no),
        ]
    }
}

impl CsvRecord for Sale {
    fn headers() -> &'static [&'static str] {
        &[
            "date",
            "receipt_id",
            "student_name",
            "student_class",
            "item",
            "size",
            "quantity",
            "selling_price",
            "total",
            "payment_mode",
            "reference",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.receipt_id.clone(),
            opt(&self.student_name),
            opt(&self.student_class),
            self.item.clone(),
            self.size.clone(),
            self.quantity.to_string(),
            self.selling_price().to_decimal_string(),
            self.total().to_decimal_string(),
            self.payment_mode.label().to_string(),
            opt(&self.reference),
        ]
    }
}

impl CsvRecord for StockItem {
    fn headers() -> &'static [&'static str] {
        &["item", "size", "quantity", "unit_cost", "supplier", "invoice_no", "last_updated"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.size.clone(),
            self.quantity.to_string(),
            self.unit_cost().to_decimal_string(),
            opt(&self.supplier),
            opt(&self.invoice_no),
            self.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}

impl CsvRecord for Receipt {
    fn headers() -> &'static [&'static str] {
        &[
            "receipt_id",
            "date",
            "customer_name",
            "total_amount",
            "payment_mode",
            "reference",
            "issued_by",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.receipt_id.clone(),
            self.date.to_string(),
            self.customer_name.clone(),
            self.total_amount.to_decimal_string(),
            self.payment_mode.label().to_string(),
            opt(&self.reference),
            self.issued_by.clone(),
        ]
    }
}

impl CsvRecord for CategoryTotal {
    fn headers() -> &'static [&'static str] {
        &["category", "entries", "total"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.entries.to_string(),
            self.total().to_decimal_string(),
        ]
    }
}

impl CsvRecord for ItemSalesTotal {
    fn headers() -> &'static [&'static str] {
        &["item", "quantity", "total"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.quantity.to_string(),
            self.total().to_decimal_string(),
        ]
    }
}

impl CsvRecord for ItemSizeSalesTotal {
    fn headers() -> &'static [&'static str] {
        &["item", "size", "quantity", "total"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.size.clone(),
            self.quantity.to_string(),
            self.total().to_decimal_string(),
        ]
    }
}

impl CsvRecord for MonthlyTrend {
    fn headers() -> &'static [&'static str] {
        &["month", "expenses", "sales", "net"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            self.expenses.to_decimal_string(),
            self.sales.to_decimal_string(),
            self.net.to_decimal_string(),
        ]
    }
}

impl CsvRecord for StockValue {
    fn headers() -> &'static [&'static str] {
        &["item", "size", "quantity", "unit_cost", "value"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.size.clone(),
            self.quantity.to_string(),
            self.unit_cost.to_decimal_string(),
            self.value.to_decimal_string(),
        ]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn test_expense_csv() {
        let rows = vec![Expense {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: "Food".to_string(),
            description: "Rice, beans".to_string(),
            amount_cents: 250_050,
            receipt_no: None,
            created_at: Utc::now(),
        }];

        let csv = to_csv(&rows);
        assert_eq!(
            csv,
            "date,category,description,amount,receipt_no\r\n\
             2024-01-15,Food,\"Rice, beans\",2500.50,\r\n"
        );
    }

    #[test]
    fn test_empty_csv_has_header_only() {
        let rows: Vec<CategoryTotal> = Vec::new();
        assert_eq!(to_csv(&rows), "category,entries,total\r\n");
    }
}
