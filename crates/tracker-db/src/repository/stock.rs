//! # Stock Repository
//!
//! Uniform stock deliveries and listings.
//!
//! ## Upsert Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_stock(Shirt, "m", qty 10, cost 500)                                │
//! │       │                                                                 │
//! │       ▼  size normalized → "M"                                          │
//! │  INSERT ... ON CONFLICT(item, size) DO UPDATE                          │
//! │       │                                                                 │
//! │       ├── no row yet   → row created with quantity 10                  │
//! │       │                                                                 │
//! │       └── row exists   → quantity += 10                                │
//! │                          unit_cost, supplier, invoice_no overwritten    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities only go down through the [`StockLedger`](super::ledger::StockLedger).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::gateway::with_reconnect;
use tracker_core::validation::{normalize_size, validate_item_name, validate_new_stock};
use tracker_core::{NewStock, StockItem};

pub(crate) const STOCK_COLUMNS: &str =
    "id, item, size, quantity, unit_cost_cents, supplier, invoice_no, last_updated";

/// Repository for uniform stock.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Records a delivery, creating or topping up the `(item, size)` row.
    ///
    /// ## Returns
    /// The row as it is after the delivery.
    pub async fn add_stock(&self, stock: NewStock) -> DbResult<StockItem> {
        let stock = validate_new_stock(stock)?;
        let stock = &stock;
        let pool = &self.pool;

        let row = with_reconnect("add_stock", move || async move {
            let row: StockItem = sqlx::query_as(&format!(
                "INSERT INTO uniform_stock \
                     (item, size, quantity, unit_cost_cents, supplier, invoice_no, last_updated) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                 ON CONFLICT(item, size) DO UPDATE SET \
                     quantity = uniform_stock.quantity + excluded.quantity, \
                     unit_cost_cents = excluded.unit_cost_cents, \
                     supplier = excluded.supplier, \
                     invoice_no = excluded.invoice_no, \
                     last_updated = excluded.last_updated \
                 RETURNING {}",
                STOCK_COLUMNS
            ))
            .bind(&stock.item)
            .bind(&stock.size)
            .bind(stock.quantity)
            .bind(stock.unit_cost.cents())
            .bind(&stock.supplier)
            .bind(&stock.invoice_no)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;
            Ok(row)
        })
        .await?;

        info!(
            item = %row.item,
            size = %row.size,
            added = stock.quantity,
            on_hand = row.quantity,
            "Stock added"
        );
        Ok(row)
    }

    /// Lists all stock rows ordered by item and size.
    pub async fn list(&self) -> DbResult<Vec<StockItem>> {
        let pool = &self.pool;
        with_reconnect("list_stock", move || async move {
            let rows = sqlx::query_as(&format!(
                "SELECT {} FROM uniform_stock ORDER BY item, size",
                STOCK_COLUMNS
            ))
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Lists rows that still have units on hand.
    pub async fn list_in_stock(&self) -> DbResult<Vec<StockItem>> {
        let pool = &self.pool;
        with_reconnect("list_in_stock", move || async move {
            let rows = sqlx::query_as(&format!(
                "SELECT {} FROM uniform_stock WHERE quantity > 0 ORDER BY item, size",
                STOCK_COLUMNS
            ))
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets the stock row for one `(item, size)`.
    ///
    /// ## Returns
    /// * `Ok(Some(StockItem))` - Row exists
    /// * `Ok(None)` - Never stocked
    pub async fn get(&self, item: &str, size: &str) -> DbResult<Option<StockItem>> {
        let item = validate_item_name(item)?;
        let size = normalize_size(size)?;
        let (item, size) = (item.as_str(), size.as_str());
        let pool = &self.pool;

        debug!(item, size, "Fetching stock row");

        with_reconnect("get_stock", move || async move {
            let row = sqlx::query_as(&format!(
                "SELECT {} FROM uniform_stock WHERE item = ?1 AND size = ?2",
                STOCK_COLUMNS
            ))
            .bind(item)
            .bind(size)
            .fetch_optional(pool)
            .await?;
            Ok(row)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{db, stock};

    #[tokio::test]
    async fn test_first_delivery_creates_row() {
        let db = db().await;
        let row = db.stock().add_stock(stock("Shirt", "m", 10, 50_000)).await.unwrap();

        assert_eq!(row.item, "Shirt");
        assert_eq!(row.size, "M");
        assert_eq!(row.quantity, 10);
        assert_eq!(row.unit_cost_cents, 50_000);
    }

    #[tokio::test]
    async fn test_later_deliveries_add_quantity_and_overwrite_cost() {
        let db = db().await;
        let repo = db.stock();
        repo.add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();
        repo.add_stock(stock("Shirt", " m ", 4, 55_000)).await.unwrap();
        let mut third = stock("Shirt", "M", 6, 52_500);
        third.supplier = Some("School Outfitters".to_string());
        third.invoice_no = Some("INV-7".to_string());
        let row = repo.add_stock(third).await.unwrap();

        assert_eq!(row.quantity, 20);
        assert_eq!(row.unit_cost_cents, 52_500);
        assert_eq!(row.supplier.as_deref(), Some("School Outfitters"));
        assert_eq!(row.invoice_no.as_deref(), Some("INV-7"));

        // Still a single row for the key
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_normalizes_size() {
        let db = db().await;
        let repo = db.stock();
        repo.add_stock(stock("Sweater", "XL", 3, 90_000)).await.unwrap();

        let row = repo.get("Sweater", "xl").await.unwrap().unwrap();
        assert_eq!(row.quantity, 3);
        assert!(repo.get("Sweater", "S").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_stock_rejects_non_positive_quantity() {
        let db = db().await;
        assert!(db.stock().add_stock(stock("Tie", "ONE", 0, 100)).await.is_err());
        assert!(db.stock().add_stock(stock("Tie", "ONE", 1, -1)).await.is_err());
        assert!(db.stock().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_in_stock_skips_empty_rows() {
        let db = db().await;
        let repo = db.stock();
        repo.add_stock(stock("Tie", "ONE", 1, 100)).await.unwrap();
        repo.add_stock(stock("Socks", "S", 2, 100)).await.unwrap();
        sqlx::query("UPDATE uniform_stock SET quantity = 0 WHERE item = 'Tie'")
            .execute(db.pool())
            .await
            .unwrap();

        let rows = repo.list_in_stock().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Socks");
    }
}
