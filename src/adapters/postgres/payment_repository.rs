//! PostgreSQL implementation of PaymentRepository.
//!
//! `apply` locks the order row, then writes payment, status, and grants in
//! one transaction. The unique constraint on `external_reference` is the
//! final duplicate guard across concurrent deliveries.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ExternalReference, OrderId, UserId};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{ApplyOutcome, OwnershipRecord, Payment, PaymentConfirmation};
use crate::ports::PaymentRepository;

use super::rows::{db_error, order_status, PaymentItemRow, PaymentRow};

const PAYMENT_COLUMNS: &str =
    "id, order_id, user_id, amount_cents, external_reference, status, created_at";

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<PaymentRow>) -> Result<Vec<Payment>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let item_rows: Vec<PaymentItemRow> = sqlx::query_as(
            r#"
            SELECT payment_id, item_id, price_at_payment_cents
            FROM payment_items
            WHERE payment_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment items", e))?;

        let mut items: HashMap<Uuid, Vec<PaymentItemRow>> = HashMap::new();
        for row in item_rows {
            items.entry(row.payment_id).or_default().push(row);
        }

        rows.into_iter()
            .map(|row| {
                let payment_items = items.remove(&row.id).unwrap_or_default();
                row.into_payment(payment_items)
            })
            .collect()
    }

    /// Writes payment, status change, and grants. Returns false if the
    /// payment insert hit an existing external reference.
    async fn write_applied(
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
        grants: &[OwnershipRecord],
    ) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, user_id, amount_cents, external_reference, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT ON CONSTRAINT payments_external_reference_key DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.amount.cents())
        .bind(payment.external_reference.as_str())
        .bind(payment.status.as_str())
        .bind(payment.created_at.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to insert payment", e))?;

        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE orders SET status = 'paid', updated_at = now() WHERE id = $1 AND status = 'pending'",
        )
        .bind(payment.order_id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to mark order paid", e))?;

        for item in &payment.items {
            sqlx::query(
                r#"
                INSERT INTO payment_items (payment_id, item_id, price_at_payment_cents)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(payment.id.as_uuid())
            .bind(item.item_id.as_uuid())
            .bind(item.price_at_payment.cents())
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to insert payment item", e))?;
        }

        for grant in grants {
            sqlx::query(
                r#"
                INSERT INTO ownership_records (user_id, item_id, order_id, granted_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, item_id) DO NOTHING
                "#,
            )
            .bind(grant.user_id.as_str())
            .bind(grant.item_id.as_uuid())
            .bind(grant.order_id.as_uuid())
            .bind(grant.granted_at.as_datetime())
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to grant ownership", e))?;
        }

        Ok(true)
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn apply(
        &self,
        order: &Order,
        confirmation: &PaymentConfirmation,
    ) -> Result<ApplyOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(confirmation.order_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to lock order", e))?;

        let status: OrderStatus = match status {
            None => return Ok(ApplyOutcome::OrderNotFound),
            Some(raw) => order_status(&raw)?,
        };
        match status {
            OrderStatus::Pending => {}
            OrderStatus::Paid => return Ok(ApplyOutcome::OrderAlreadyPaid),
            other => return Ok(ApplyOutcome::OrderNotPayable(other)),
        }

        let payment = Payment::successful_for(
            order,
            confirmation.external_reference.clone(),
            confirmation.amount,
        );
        let grants = OwnershipRecord::for_order(order);

        if !Self::write_applied(&mut tx, &payment, &grants).await? {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back payment", e))?;
            return Ok(ApplyOutcome::DuplicateReference);
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit payment", e))?;

        Ok(ApplyOutcome::Applied(payment))
    }

    async fn find_by_external_reference(
        &self,
        reference: &ExternalReference,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE external_reference = $1",
            PAYMENT_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment", e))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE order_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment", e))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list payments", e))?;

        self.hydrate(rows).await
    }
}
