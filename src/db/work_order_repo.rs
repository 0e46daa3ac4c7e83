// src/db/work_order_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::gateway::WorkOrderGateway,
    models::{
        quote::{LinkedQuote, PersistedLineItem, PersistedLineItemRow, QuoteServiceLine, QuoteServiceLineRow, QUOTE_STATUS_PENDING},
        work_order::{Client, Vehicle, WorkOrder, WorkOrderDetails},
    },
};

const WORK_ORDER_COLUMNS: &str = r#"
    id, number, service_status, payment_status, total_value, discount,
    paid_amount, amount_due, payment_method, start_date, deadline_date,
    note, current_mileage, client_id, vehicle_id, quote_id
"#;

#[derive(Clone)]
pub struct WorkOrderRepository {
    pool: PgPool,
}

impl WorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resolve cliente, veículo e orçamento (com itens) de uma OS
    async fn load_details(&self, header: WorkOrder) -> Result<WorkOrderDetails, AppError> {
        let client = match header.client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Client>(
                    "SELECT id, name, make, model, year, plate FROM clients WHERE id = $1",
                )
                    .bind(client_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let vehicle = match header.vehicle_id {
            Some(vehicle_id) => {
                sqlx::query_as::<_, Vehicle>(
                    "SELECT id, make, model, year, plate FROM vehicles WHERE id = $1",
                )
                    .bind(vehicle_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let quote = match header.quote_id {
            Some(quote_id) => self.load_quote(quote_id).await?,
            None => None,
        };

        Ok(WorkOrderDetails { header, client, vehicle, quote })
    }

    async fn load_quote(&self, quote_id: Uuid) -> Result<Option<LinkedQuote>, AppError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM quotes WHERE id = $1")
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(status) = status else {
            return Ok(None);
        };

        let part_items = sqlx::query_as::<_, PersistedLineItemRow>(
            r#"
            SELECT qp.id, qp.quote_id, qp.part_id, qp.quantity, qp.unit_price,
                   p.name AS part_name
            FROM quote_parts qp
            JOIN parts p ON p.id = qp.part_id
            WHERE qp.quote_id = $1
            ORDER BY qp.created_at ASC
            "#,
        )
            .bind(quote_id)
            .fetch_all(&self.pool)
            .await?;

        let service_items = sqlx::query_as::<_, QuoteServiceLineRow>(
            r#"
            SELECT qs.id, qs.hours, qs.hourly_rate,
                   s.id AS service_id, s.name AS service_name
            FROM quote_services qs
            LEFT JOIN services s ON s.id = qs.service_id
            WHERE qs.quote_id = $1
            ORDER BY qs.created_at ASC
            "#,
        )
            .bind(quote_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(LinkedQuote {
            id: quote_id,
            status,
            part_items: Some(part_items.into_iter().map(PersistedLineItem::from).collect()),
            service_items: Some(service_items.into_iter().map(QuoteServiceLine::from).collect()),
        }))
    }
}

#[async_trait]
impl WorkOrderGateway for WorkOrderRepository {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrderDetails>, AppError> {
        let headers = sqlx::query_as::<_, WorkOrder>(&format!(
            "SELECT {WORK_ORDER_COLUMNS} FROM work_orders ORDER BY number DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            orders.push(self.load_details(header).await?);
        }
        Ok(orders)
    }

    async fn get_work_order(&self, id: Uuid) -> Result<Option<WorkOrderDetails>, AppError> {
        let header = sqlx::query_as::<_, WorkOrder>(&format!(
            "SELECT {WORK_ORDER_COLUMNS} FROM work_orders WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match header {
            Some(header) => Ok(Some(self.load_details(header).await?)),
            None => Ok(None),
        }
    }

    async fn delete_work_order(&self, id: Uuid) -> Result<(), AppError> {
        // A OS e o status do orçamento mudam juntos ou não mudam
        let mut tx = self.pool.begin().await?;

        let quote_id: Option<Option<Uuid>> =
            sqlx::query_scalar("DELETE FROM work_orders WHERE id = $1 RETURNING quote_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(Some(quote_id)) = quote_id {
            sqlx::query("UPDATE quotes SET status = $1 WHERE id = $2")
                .bind(QUOTE_STATUS_PENDING)
                .bind(quote_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!("Orçamento {} voltou para '{}'", quote_id, QUOTE_STATUS_PENDING);
        }

        tx.commit().await?;
        Ok(())
    }
}
