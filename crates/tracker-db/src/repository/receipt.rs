//! # Receipt Repository
//!
//! Lookup of stored receipts for reprinting. Receipts are written by the
//! [`StockLedger`](super::ledger::StockLedger) in the same transaction as
//! their sale and never change afterwards.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::gateway::with_reconnect;
use crate::repository::like_pattern;
use tracker_core::validation::{normalize_receipt_id, validate_search_query};
use tracker_core::{CoreError, Receipt, ReceiptFilter, ReceiptRecord};

const RECEIPT_COLUMNS: &str = "receipt_id, date, customer_name, items_json, total_amount_cents, \
     payment_mode, reference, issued_by, created_at";

/// Repository for stored receipts.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Gets a receipt by its ID. Lookup is case-insensitive.
    ///
    /// ## Errors
    /// * `Domain(InvalidReceiptData)` - stored row has unreadable line items
    pub async fn get_by_id(&self, receipt_id: &str) -> DbResult<Option<Receipt>> {
        let receipt_id = normalize_receipt_id(receipt_id)?;
        let id = receipt_id.as_str();
        let pool = &self.pool;

        debug!(receipt_id = id, "Fetching receipt");

        let record: Option<ReceiptRecord> = with_reconnect("get_receipt", move || async move {
            let row = sqlx::query_as(&format!(
                "SELECT {} FROM receipts WHERE receipt_id = ?1",
                RECEIPT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(pool)
            .await?;
            Ok(row)
        })
        .await?;

        Ok(record.map(Receipt::try_from).transpose()?)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing receipt is an error.
    ///
    /// ## Errors
    /// * `Domain(ReceiptNotFound)` - no receipt with that ID
    pub async fn require(&self, receipt_id: &str) -> DbResult<Receipt> {
        self.get_by_id(receipt_id)
            .await?
            .ok_or_else(|| CoreError::ReceiptNotFound(receipt_id.trim().to_uppercase()).into())
    }

    /// Lists receipts matching the filter, newest first.
    ///
    /// ## Filter
    /// - `range`: inclusive receipt date range
    /// - `search`: case-insensitive substring of receipt ID or customer name
    pub async fn list(&self, filter: &ReceiptFilter) -> DbResult<Vec<Receipt>> {
        let search = validate_search_query(filter.search.as_deref())?;
        let search = search.as_deref();

        debug!(?filter, "Listing receipts");

        let records = with_reconnect("list_receipts", move || self.fetch_filtered(filter, search)).await?;

        let receipts = records
            .into_iter()
            .map(Receipt::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(receipts)
    }

    async fn fetch_filtered(
        &self,
        filter: &ReceiptFilter,
        search: Option<&str>,
    ) -> DbResult<Vec<ReceiptRecord>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM receipts WHERE 1 = 1", RECEIPT_COLUMNS));

        if let Some(range) = filter.range {
            qb.push(" AND date BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
        }

        if let Some(search) = search {
            let pattern = like_pattern(search);
            qb.push(" AND (receipt_id LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR customer_name LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb
            .build_query_as::<ReceiptRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
