//! Invoice repository.
//!
//! Invoices are insert-only; there is no update path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bosco_core::{CartItem, Invoice, InvoiceId, OrderId, UserId};

use super::{RepositoryError, parse_column};

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: InvoiceId,
    order_id: OrderId,
    user_id: Option<UserId>,
    items: Json<Vec<CartItem>>,
    item_price: Decimal,
    shipping_fee: Decimal,
    total_price: Decimal,
    delivery_type: String,
    notes: Option<String>,
    username: String,
    email: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            items: row.items.0,
            item_price: row.item_price,
            shipping_fee: row.shipping_fee,
            total_price: row.total_price,
            delivery_type: parse_column(&row.delivery_type, "delivery type")?,
            notes: row.notes,
            username: row.username,
            email: row.email,
            status: parse_column(&row.status, "invoice status")?,
            created_at: row.created_at,
        })
    }
}

/// Repository for invoice database operations.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a freshly issued invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, invoice: &Invoice) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.invoices
                (id, order_id, user_id, items, item_price, shipping_fee, total_price,
                 delivery_type, notes, username, email, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(invoice.id)
        .bind(invoice.order_id)
        .bind(invoice.user_id)
        .bind(Json(&invoice.items))
        .bind(invoice.item_price)
        .bind(invoice.shipping_fee)
        .bind(invoice.total_price)
        .bind(invoice.delivery_type.as_str())
        .bind(invoice.notes.as_deref())
        .bind(&invoice.username)
        .bind(&invoice.email)
        .bind(invoice.status.as_str())
        .bind(invoice.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, order_id, user_id, items, item_price, shipping_fee, total_price,
                   delivery_type, notes, username, email, status, created_at
            FROM storefront.invoices
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }
}
