// src/db/quote_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::gateway::LineItemGateway,
    models::quote::{NewLineItem, PersistedLineItem, PersistedLineItemRow},
};

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LineItemGateway for QuoteRepository {
    async fn list_line_items(&self, quote_id: Uuid) -> Result<Vec<PersistedLineItem>, AppError> {
        let rows = sqlx::query_as::<_, PersistedLineItemRow>(
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

        Ok(rows.into_iter().map(PersistedLineItem::from).collect())
    }

    async fn create_line_item(&self, item: NewLineItem) -> Result<PersistedLineItem, AppError> {
        // CTE para devolver o item já com o nome da peça, numa ida só ao banco
        let row = sqlx::query_as::<_, PersistedLineItemRow>(
            r#"
            WITH inserted AS (
                INSERT INTO quote_parts (quote_id, part_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, quote_id, part_id, quantity, unit_price
            )
            SELECT i.id, i.quote_id, i.part_id, i.quantity, i.unit_price,
                   p.name AS part_name
            FROM inserted i
            JOIN parts p ON p.id = i.part_id
            "#,
        )
            .bind(item.quote_id)
            .bind(item.part_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Item {} adicionado ao orçamento {}", row.id, row.quote_id);
        Ok(row.into())
    }

    async fn delete_line_item(&self, id: Uuid, quote_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM quote_parts WHERE id = $1 AND quote_id = $2")
            .bind(id)
            .bind(quote_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
