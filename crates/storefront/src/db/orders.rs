//! Order repository.
//!
//! Orders are listed newest first using keyset pagination on
//! `(created_at, id)`: the cursor is the id of the last order on the
//! previous page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use bosco_core::{CartItem, ORDER_PAGE_SIZE, Order, OrderId, OrderStatus, UserId};

use super::{RepositoryError, parse_column};

/// Name of the global order counter in `storefront.counters`.
pub const ORDER_COUNTER: &str = "orders";

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, shipping_phone, \
    delivery_type, notes, item_price, shipping_fee, total_price, status, \
    settled_by_paystack, payment_reference, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    items: Json<Vec<CartItem>>,
    shipping_address: String,
    shipping_phone: String,
    delivery_type: String,
    notes: Option<String>,
    item_price: Decimal,
    shipping_fee: Option<Decimal>,
    total_price: Option<Decimal>,
    status: String,
    settled_by_paystack: bool,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            shipping_address: row.shipping_address,
            shipping_phone: row.shipping_phone,
            delivery_type: parse_column(&row.delivery_type, "delivery type")?,
            notes: row.notes,
            item_price: row.item_price,
            shipping_fee: row.shipping_fee,
            total_price: row.total_price,
            status: parse_column(&row.status, "order status")?,
            settled_by_paystack: row.settled_by_paystack,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// One page of the back-office order listing.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Id of the last order on this page, the cursor for the next one.
    /// `None` only when the page is empty.
    pub last_id: Option<OrderId>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order and bump the global and daily order counters.
    ///
    /// All three writes commit together, so concurrent checkouts never lose
    /// a count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO storefront.orders
                (id, user_id, items, shipping_address, shipping_phone, delivery_type, notes,
                 item_price, shipping_fee, total_price, status, settled_by_paystack,
                 payment_reference, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(&order.shipping_address)
        .bind(&order.shipping_phone)
        .bind(order.delivery_type.as_str())
        .bind(order.notes.as_deref())
        .bind(order.item_price)
        .bind(order.shipping_fee)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(order.settled_by_paystack)
        .bind(order.payment_reference.as_deref())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        increment_order_counters(&mut tx, order.created_at).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum value is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// List one page of orders, newest first, starting after `start_after`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cursor order doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page(
        &self,
        start_after: Option<OrderId>,
    ) -> Result<OrderPage, RepositoryError> {
        let rows = match start_after {
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM storefront.orders \
                     ORDER BY created_at DESC, id DESC LIMIT $1"
                ))
                .bind(ORDER_PAGE_SIZE)
                .fetch_all(self.pool)
                .await?
            }
            Some(cursor) => {
                let cursor_created_at: Option<DateTime<Utc>> =
                    sqlx::query_scalar("SELECT created_at FROM storefront.orders WHERE id = $1")
                        .bind(cursor)
                        .fetch_optional(self.pool)
                        .await?;
                let cursor_created_at = cursor_created_at.ok_or(RepositoryError::NotFound)?;

                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM storefront.orders \
                     WHERE (created_at, id) < ($1, $2) \
                     ORDER BY created_at DESC, id DESC LIMIT $3"
                ))
                .bind(cursor_created_at)
                .bind(cursor)
                .bind(ORDER_PAGE_SIZE)
                .fetch_all(self.pool)
                .await?
            }
        };

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let last_id = orders.last().map(|o| o.id);

        Ok(OrderPage { orders, last_id })
    }

    /// List a customer's orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(status.map(OrderStatus::as_str))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Persist the shipping fee, total and status of a re-priced order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_pricing(&self, order: &Order) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.orders
            SET shipping_fee = $2, total_price = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(order.id)
        .bind(order.shipping_fee)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.orders SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark an order as paid through Paystack and record the reference.
    ///
    /// Returns `false` if the order was already settled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_settled(&self, id: OrderId, reference: &str) -> Result<bool, RepositoryError> {
        let settled_before: Option<bool> = sqlx::query_scalar(
            r"
            UPDATE storefront.orders AS o
            SET settled_by_paystack = TRUE, payment_reference = $2, updated_at = NOW()
            FROM (SELECT id, settled_by_paystack FROM storefront.orders WHERE id = $1 FOR UPDATE) AS prev
            WHERE o.id = prev.id
            RETURNING prev.settled_by_paystack
            ",
        )
        .bind(id)
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        settled_before
            .map(|was_settled| !was_settled)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Upsert-increment the global and per-day order counters.
async fn increment_order_counters(
    tx: &mut Transaction<'_, Postgres>,
    placed_at: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefront.counters (name, value, updated_at)
        VALUES ($1, 1, $2)
        ON CONFLICT (name)
        DO UPDATE SET value = counters.value + 1, updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(ORDER_COUNTER)
    .bind(placed_at)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO storefront.daily_order_counts (day, orders)
        VALUES ($1, 1)
        ON CONFLICT (day)
        DO UPDATE SET orders = daily_order_counts.orders + 1
        ",
    )
    .bind(placed_at.date_naive())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
