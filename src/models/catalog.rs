// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Peças ---
// Catálogo de peças: o preço aqui é só a sugestão usada ao montar um orçamento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
}
