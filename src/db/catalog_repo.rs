// src/db/catalog_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::gateway::CatalogProvider,
    models::catalog::Part,
};

// Leitura do catálogo de peças (tabela 'parts')
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogProvider for CatalogRepository {
    async fn list_parts(&self) -> Result<Vec<Part>, AppError> {
        let parts = sqlx::query_as::<_, Part>(
            "SELECT id, name, unit_price FROM parts ORDER BY name ASC",
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(parts)
    }
}
