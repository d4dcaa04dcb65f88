//! # Sale Repository
//!
//! Read side of uniform sales. Sales are written only by the
//! [`StockLedger`](super::ledger::StockLedger).

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::gateway::with_reconnect;
use crate::repository::like_pattern;
use tracker_core::validation::{normalize_receipt_id, validate_search_query};
use tracker_core::{DateRange, Money, Sale, SaleFilter};

const SALE_COLUMNS: &str = "id, date, student_name, student_class, item, size, quantity, \
     selling_price_cents, payment_mode, reference, receipt_id, created_at";

/// Repository for sale listings.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists sales matching the filter, newest first.
    ///
    /// ## Filter
    /// - `range`: inclusive date range
    /// - `items`: any of (empty = all)
    /// - `search`: case-insensitive substring of student name or reference
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let search = validate_search_query(filter.search.as_deref())?;
        let search = search.as_deref();

        debug!(?filter, "Listing sales");

        with_reconnect("list_sales", move || self.fetch_filtered(filter, search)).await
    }

    async fn fetch_filtered(&self, filter: &SaleFilter, search: Option<&str>) -> DbResult<Vec<Sale>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM uniform_sales WHERE 1 = 1", SALE_COLUMNS));

        if let Some(range) = filter.range {
            qb.push(" AND date BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
        }

        if !filter.items.is_empty() {
            qb.push(" AND item IN (");
            let mut items = qb.separated(", ");
            for item in &filter.items {
                items.push_bind(item.clone());
            }
            items.push_unseparated(")");
        }

        if let Some(search) = search {
            let pattern = like_pattern(search);
            qb.push(" AND (student_name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR reference LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        qb.push(" ORDER BY date DESC, id DESC");

        let rows = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Finds the sale behind a receipt ID.
    pub async fn get_by_receipt_id(&self, receipt_id: &str) -> DbResult<Option<Sale>> {
        let receipt_id = normalize_receipt_id(receipt_id)?;
        let receipt_id = receipt_id.as_str();
        let pool = &self.pool;

        with_reconnect("get_sale_by_receipt", move || async move {
            let row = sqlx::query_as(&format!(
                "SELECT {} FROM uniform_sales WHERE receipt_id = ?1",
                SALE_COLUMNS
            ))
            .bind(receipt_id)
            .fetch_optional(pool)
            .await?;
            Ok(row)
        })
        .await
    }

    /// Most recent sales, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let pool = &self.pool;
        with_reconnect("recent_sales", move || async move {
            let rows = sqlx::query_as(&format!(
                "SELECT {} FROM uniform_sales ORDER BY date DESC, id DESC LIMIT ?1",
                SALE_COLUMNS
            ))
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Revenue (`Σ selling_price × quantity`) within the range.
    pub async fn total_between(&self, range: DateRange) -> DbResult<Money> {
        let pool = &self.pool;
        let cents: i64 = with_reconnect("total_sales", move || async move {
            let cents = sqlx::query_scalar(
                "SELECT COALESCE(SUM(selling_price_cents * quantity), 0) \
                 FROM uniform_sales WHERE date BETWEEN ?1 AND ?2",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await?;
            Ok(cents)
        })
        .await?;

        Ok(Money::from_cents(cents))
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{date, db, sale, stock};
    use tracker_core::{DateRange, PaymentMode, SaleFilter};

    async fn seeded() -> crate::pool::Database {
        let db = db().await;
        db.stock().add_stock(stock("Shirt", "M", 20, 50_000)).await.unwrap();
        db.stock().add_stock(stock("Tie", "ONE", 20, 10_000)).await.unwrap();

        let mut first = sale("Shirt", "M", 2, 70_000);
        first.date = date(2024, 1, 10);
        first.student_name = Some("Amani Otieno".to_string());
        db.ledger().record_sale(first, None).await.unwrap();

        let mut second = sale("Tie", "ONE", 1, 20_000);
        second.date = date(2024, 2, 3);
        second.payment_mode = PaymentMode::Mpesa;
        second.reference = Some("QX12AB".to_string());
        db.ledger().record_sale(second, Some("clerk")).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = seeded().await;
        let rows = db.sales().list(&SaleFilter::default()).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item, "Tie");
        assert_eq!(rows[0].payment_mode, PaymentMode::Mpesa);
        assert_eq!(rows[1].total().cents(), 140_000);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = seeded().await;
        let repo = db.sales();

        let shirts = SaleFilter {
            items: vec!["Shirt".to_string()],
            ..Default::default()
        };
        assert_eq!(repo.list(&shirts).await.unwrap().len(), 1);

        let february = SaleFilter {
            range: Some(DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap()),
            ..Default::default()
        };
        let rows = repo.list(&february).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Tie");

        let by_name = SaleFilter {
            search: Some("amani".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_name).await.unwrap()[0].item, "Shirt");

        let by_reference = SaleFilter {
            search: Some("qx12".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_reference).await.unwrap()[0].item, "Tie");
    }

    #[tokio::test]
    async fn test_get_by_receipt_id_is_case_insensitive() {
        let db = seeded().await;
        let rows = db.sales().list(&SaleFilter::default()).await.unwrap();
        let receipt_id = rows[0].receipt_id.to_lowercase();

        let found = db.sales().get_by_receipt_id(&receipt_id).await.unwrap().unwrap();
        assert_eq!(found.id, rows[0].id);
        assert!(db.sales().get_by_receipt_id("REC-FFFFFFFF").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_totals_and_recent() {
        let db = seeded().await;
        let january = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(db.sales().total_between(january).await.unwrap().cents(), 140_000);
        assert_eq!(db.sales().recent(1).await.unwrap().len(), 1);
    }
}
