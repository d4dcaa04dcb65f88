//! # Stock Ledger
//!
//! Availability checks and atomic sale recording.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(Shirt/M × 3 @ KES 700, issued_by = "bursar")               │
//! │                                                                         │
//! │  validate_new_sale ──► error? → Domain(Validation), nothing written    │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐   │
//! │  │ 1. UPDATE uniform_stock SET quantity = quantity - 3              │   │
//! │  │    WHERE item = 'Shirt' AND size = 'M' AND quantity >= 3         │   │
//! │  │       │                                                          │   │
//! │  │       ├── 0 rows → ROLLBACK → InsufficientStock {available, 3}   │   │
//! │  │       ▼                                                          │   │
//! │  │ 2. receipt ID: REC-XXXXXXXX, re-drawn while taken                │   │
//! │  │ 3. INSERT uniform_sales                                          │   │
//! │  │ 4. INSERT receipts (if issued_by given)                          │   │
//! │  COMMIT ◄───────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleOutcome { sale, receipt }                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE runs first so the transaction takes SQLite's
//! write lock before anything is read. Two concurrent sales of the last
//! units serialize on that lock and the second one sees the reduced
//! quantity, so stock never goes negative.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::gateway::with_reconnect;
use tracker_core::receipt::generate_receipt_id;
use tracker_core::validation::{normalize_size, validate_item_name, validate_new_sale, validate_quantity};
use tracker_core::{CoreError, NewSale, Receipt, Sale, SaleOutcome};

/// How many receipt IDs to draw before giving up.
///
/// With 16^8 possible IDs a second draw is already rare.
const MAX_RECEIPT_ID_ATTEMPTS: usize = 5;

/// Sale recording and stock decrement in one transaction.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Checks whether `quantity` units of `(item, size)` are on hand.
    ///
    /// ## Returns
    /// * `true` - a row exists with at least `quantity` units
    /// * `false` - not enough units, or the variant was never stocked
    ///
    /// Advisory only: [`record_sale`](Self::record_sale) re-checks inside
    /// its transaction.
    pub async fn check_availability(&self, item: &str, size: &str, quantity: i64) -> DbResult<bool> {
        validate_quantity(quantity)?;
        let item = validate_item_name(item)?;
        let size = normalize_size(size)?;
        let (item, size) = (item.as_str(), size.as_str());
        let pool = &self.pool;

        let available: Option<i64> = with_reconnect("check_availability", move || async move {
            let available = sqlx::query_scalar(
                "SELECT quantity FROM uniform_stock WHERE item = ?1 AND size = ?2",
            )
            .bind(item)
            .bind(size)
            .fetch_optional(pool)
            .await?;
            Ok(available)
        })
        .await?;

        debug!(item, size, requested = quantity, ?available, "Checked availability");
        Ok(available.is_some_and(|on_hand| on_hand >= quantity))
    }

    /// Records a sale and, when `issued_by` is given, its receipt.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - bad input, nothing written
    /// * `Domain(InsufficientStock)` - not enough units, nothing written
    /// * any database error - transaction rolled back, nothing written
    pub async fn record_sale(&self, sale: NewSale, issued_by: Option<&str>) -> DbResult<SaleOutcome> {
        let sale = validate_new_sale(sale)?;
        let sale = &sale;

        let outcome = with_reconnect("record_sale", move || {
            self.record_sale_tx(sale, issued_by, generate_receipt_id)
        })
        .await?;

        info!(
            receipt_id = %outcome.sale.receipt_id,
            item = %outcome.sale.item,
            size = %outcome.sale.size,
            quantity = outcome.sale.quantity,
            total = %outcome.sale.total(),
            "Sale recorded"
        );
        Ok(outcome)
    }

    /// The sale transaction. `next_id` supplies receipt ID candidates.
    async fn record_sale_tx(
        &self,
        sale: &NewSale,
        issued_by: Option<&str>,
        next_id: impl FnMut() -> String,
    ) -> DbResult<SaleOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // 1. Conditional decrement
        let updated = sqlx::query(
            "UPDATE uniform_stock \
             SET quantity = quantity - ?1, last_updated = ?2 \
             WHERE item = ?3 AND size = ?4 AND quantity >= ?1",
        )
        .bind(sale.quantity)
        .bind(now)
        .bind(&sale.item)
        .bind(&sale.size)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let available: Option<i64> = sqlx::query_scalar(
                "SELECT quantity FROM uniform_stock WHERE item = ?1 AND size = ?2",
            )
            .bind(&sale.item)
            .bind(&sale.size)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;

            debug!(
                item = %sale.item,
                size = %sale.size,
                requested = sale.quantity,
                ?available,
                "Sale rejected for insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                item: sale.item.clone(),
                size: sale.size.clone(),
                available: available.unwrap_or(0),
                requested: sale.quantity,
            }
            .into());
        }

        // 2. Receipt ID
        let receipt_id = allocate_receipt_id(&mut tx, next_id).await?;

        // 3. Sale row
        let id = sqlx::query(
            "INSERT INTO uniform_sales ( \
                 date, student_name, student_class, item, size, quantity, \
                 selling_price_cents, payment_mode, reference, receipt_id, created_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(sale.date)
        .bind(&sale.student_name)
        .bind(&sale.student_class)
        .bind(&sale.item)
        .bind(&sale.size)
        .bind(sale.quantity)
        .bind(sale.selling_price.cents())
        .bind(sale.payment_mode)
        .bind(&sale.reference)
        .bind(&receipt_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let stored = Sale {
            id,
            date: sale.date,
            student_name: sale.student_name.clone(),
            student_class: sale.student_class.clone(),
            item: sale.item.clone(),
            size: sale.size.clone(),
            quantity: sale.quantity,
            selling_price_cents: sale.selling_price.cents(),
            payment_mode: sale.payment_mode,
            reference: sale.reference.clone(),
            receipt_id,
            created_at: now,
        };

        // 4. Receipt row
        let receipt = match issued_by {
            Some(issued_by) => {
                let receipt = Receipt::from_sale(&stored, issued_by);
                insert_receipt(&mut tx, &receipt).await?;
                Some(receipt)
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(SaleOutcome {
            sale: stored,
            receipt,
        })
    }
}

/// Draws receipt IDs until one is unused by both sales and receipts.
async fn allocate_receipt_id(
    conn: &mut SqliteConnection,
    mut next_id: impl FnMut() -> String,
) -> DbResult<String> {
    for attempt in 1..=MAX_RECEIPT_ID_ATTEMPTS {
        let candidate = next_id();
        let taken: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM uniform_sales WHERE receipt_id = ?1) \
                 OR EXISTS(SELECT 1 FROM receipts WHERE receipt_id = ?1)",
        )
        .bind(&candidate)
        .fetch_one(&mut *conn)
        .await?;

        if taken == 0 {
            return Ok(candidate);
        }
        warn!(receipt_id = %candidate, attempt, "Receipt ID collision, drawing again");
    }

    Err(DbError::Internal(format!(
        "no unused receipt ID after {} attempts",
        MAX_RECEIPT_ID_ATTEMPTS
    )))
}

/// Inserts a receipt row inside the caller's transaction.
async fn insert_receipt(conn: &mut SqliteConnection, receipt: &Receipt) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO receipts ( \
             receipt_id, date, customer_name, items_json, total_amount_cents, \
             payment_mode, reference, issued_by, created_at \
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&receipt.receipt_id)
    .bind(receipt.date)
    .bind(&receipt.customer_name)
    .bind(receipt.items_json()?)
    .bind(receipt.total_amount.cents())
    .bind(receipt.payment_mode.code())
    .bind(&receipt.reference)
    .bind(&receipt.issued_by)
    .bind(receipt.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{db, sale, stock};
    use tracker_core::{Money, ReceiptFilter, SaleFilter, WALK_IN_CUSTOMER};

    async fn counts(db: &Database) -> (i64, i64) {
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uniform_sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let receipts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (sales, receipts)
    }

    #[tokio::test]
    async fn test_check_availability() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 5, 50_000)).await.unwrap();
        let ledger = db.ledger();

        assert!(ledger.check_availability("Shirt", "M", 5).await.unwrap());
        assert!(ledger.check_availability("Shirt", "m", 1).await.unwrap());
        assert!(!ledger.check_availability("Shirt", "M", 6).await.unwrap());
        assert!(!ledger.check_availability("Shirt", "XL", 1).await.unwrap());
        assert!(ledger.check_availability("Shirt", "M", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_shirt_example() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();

        let outcome = db
            .ledger()
            .record_sale(sale("Shirt", "M", 3, 70_000), Some("bursar"))
            .await
            .unwrap();

        assert_eq!(outcome.sale.total(), Money::from_cents(210_000));
        let receipt = outcome.receipt.expect("receipt requested");
        assert_eq!(receipt.total_amount.to_string(), "KES 2,100.00");
        assert_eq!(receipt.receipt_id, outcome.sale.receipt_id);

        let row = db.stock().get("Shirt", "M").await.unwrap().unwrap();
        assert_eq!(row.quantity, 7);
        assert_eq!(counts(&db).await, (1, 1));

        let stored = db.receipts().require(&receipt.receipt_id).await.unwrap();
        assert_eq!(stored, receipt);
    }

    #[tokio::test]
    async fn test_sale_without_receipt() {
        let db = db().await;
        db.stock().add_stock(stock("Tie", "ONE", 4, 10_000)).await.unwrap();

        let mut walk_in = sale("Tie", "one", 1, 20_000);
        walk_in.student_name = None;
        let outcome = db.ledger().record_sale(walk_in, None).await.unwrap();

        assert!(outcome.receipt.is_none());
        assert_eq!(outcome.sale.size, "ONE");
        assert_eq!(counts(&db).await, (1, 0));
    }

    #[tokio::test]
    async fn test_walk_in_receipt_customer() {
        let db = db().await;
        db.stock().add_stock(stock("Tie", "ONE", 4, 10_000)).await.unwrap();

        let mut walk_in = sale("Tie", "ONE", 1, 20_000);
        walk_in.student_name = None;
        let outcome = db.ledger().record_sale(walk_in, Some("clerk")).await.unwrap();

        assert_eq!(outcome.receipt.unwrap().customer_name, WALK_IN_CUSTOMER);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 2, 50_000)).await.unwrap();

        let err = db
            .ledger()
            .record_sale(sale("Shirt", "M", 3, 70_000), Some("bursar"))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(db.stock().get("Shirt", "M").await.unwrap().unwrap().quantity, 2);
        assert_eq!(counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_unknown_variant_is_insufficient_stock() {
        let db = db().await;
        let err = db
            .ledger()
            .record_sale(sale("Blazer", "L", 1, 300_000), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_sale_writes_nothing() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();

        let err = db
            .ledger()
            .record_sale(sale("Shirt", "M", 1, 0), Some("bursar"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(db.stock().get("Shirt", "M").await.unwrap().unwrap().quantity, 10);
        assert_eq!(counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_oversized_price_is_rejected_before_any_write() {
        let db = db().await;
        db.stock().add_stock(stock("Blazer", "L", 200, 250_000)).await.unwrap();

        let err = db
            .ledger()
            .record_sale(sale("Blazer", "L", 100, 100_000_000_000_000_000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(db.stock().get("Blazer", "L").await.unwrap().unwrap().quantity, 200);
        assert_eq!(counts(&db).await, (0, 0));

        let outcome = db
            .ledger()
            .record_sale(sale("Blazer", "L", 100, tracker_core::MAX_AMOUNT_CENTS), None)
            .await
            .unwrap();
        assert_eq!(
            outcome.sale.total().cents(),
            tracker_core::MAX_AMOUNT_CENTS * 100
        );
        assert_eq!(db.stock().get("Blazer", "L").await.unwrap().unwrap().quantity, 100);
    }

    #[tokio::test]
    async fn test_stock_equals_deliveries_minus_sales() {
        let db = db().await;
        for qty in [3, 4, 5] {
            db.stock().add_stock(stock("Socks", "S", qty, 5_000)).await.unwrap();
        }
        for qty in [2, 6] {
            db.ledger()
                .record_sale(sale("Socks", "S", qty, 8_000), None)
                .await
                .unwrap();
        }

        assert_eq!(db.stock().get("Socks", "S").await.unwrap().unwrap().quantity, 4);
        assert_eq!(db.sales().list(&SaleFilter::default()).await.unwrap().len(), 2);
        assert!(db.receipts().list(&ReceiptFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_id_collision_draws_again() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();
        db.ledger()
            .record_sale(sale("Shirt", "M", 1, 70_000), Some("bursar"))
            .await
            .unwrap();
        let taken: String = sqlx::query_scalar("SELECT receipt_id FROM uniform_sales")
            .fetch_one(db.pool())
            .await
            .unwrap();

        let mut candidates = vec!["REC-0000000A".to_string(), taken.clone()];
        let mut conn = db.pool().acquire().await.unwrap();
        let id = allocate_receipt_id(&mut conn, move || candidates.pop().unwrap())
            .await
            .unwrap();

        assert_eq!(id, "REC-0000000A");
        assert_ne!(id, taken);
    }

    #[tokio::test]
    async fn test_receipt_id_gives_up_after_bounded_attempts() {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();
        let outcome = db
            .ledger()
            .record_sale(sale("Shirt", "M", 1, 70_000), None)
            .await
            .unwrap();
        let taken = outcome.sale.receipt_id.clone();

        let ledger = db.ledger();
        let err = ledger
            .record_sale_tx(
                &validate_new_sale(sale("Shirt", "M", 1, 70_000)).unwrap(),
                None,
                move || taken.clone(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Internal(_)));
        // The decrement was rolled back with the failed transaction
        assert_eq!(db.stock().get("Shirt", "M").await.unwrap().unwrap().quantity, 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_cannot_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("tracker.db")).max_connections(4);
        let db = Database::new(config).await.unwrap();
        db.stock().add_stock(stock("Shirt", "M", 10, 50_000)).await.unwrap();

        let first = {
            let ledger = db.ledger();
            tokio::spawn(async move {
                ledger.record_sale(sale("Shirt", "M", 6, 70_000), Some("a")).await
            })
        };
        let second = {
            let ledger = db.ledger();
            tokio::spawn(async move {
                ledger.record_sale(sale("Shirt", "M", 6, 70_000), Some("b")).await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(DbError::Domain(CoreError::InsufficientStock { .. }))
        )));

        assert_eq!(db.stock().get("Shirt", "M").await.unwrap().unwrap().quantity, 4);
        assert_eq!(counts(&db).await, (1, 1));
        db.close().await;
    }
}
