// src/db/gateway.rs
//
// Contratos com a camada de dados. Os serviços só conhecem estas traits;
// quem implementa é o repositório Postgres ou o InMemoryStore.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        catalog::Part,
        quote::{NewLineItem, PersistedLineItem},
        work_order::WorkOrderDetails,
    },
};

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    // Sem paginação: o catálogo de uma oficina é pequeno
    async fn list_parts(&self) -> Result<Vec<Part>, AppError>;
}

#[async_trait]
pub trait LineItemGateway: Send + Sync {
    async fn list_line_items(&self, quote_id: Uuid) -> Result<Vec<PersistedLineItem>, AppError>;

    async fn create_line_item(&self, item: NewLineItem) -> Result<PersistedLineItem, AppError>;

    /// Remover um item que não existe não é erro.
    async fn delete_line_item(&self, id: Uuid, quote_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait WorkOrderGateway: Send + Sync {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrderDetails>, AppError>;

    async fn get_work_order(&self, id: Uuid) -> Result<Option<WorkOrderDetails>, AppError>;

    /// Apaga a OS. Se ela tiver orçamento vinculado, o orçamento volta para "Pendente".
    async fn delete_work_order(&self, id: Uuid) -> Result<(), AppError>;
}
