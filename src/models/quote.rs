// src/models/quote.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::catalog::Part;

// Referência resumida da peça que vem junto (JOIN) com o item persistido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Part> for PartRef {
    fn from(part: &Part) -> Self {
        Self { id: part.id, name: part.name.clone() }
    }
}

// --- Item de peça já gravado no orçamento ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLineItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub part: PartRef,
}

// Linha "achatada" que o banco devolve; vira PersistedLineItem logo em seguida.
#[derive(Debug, FromRow)]
pub struct PersistedLineItemRow {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub part_name: String,
}

impl From<PersistedLineItemRow> for PersistedLineItem {
    fn from(row: PersistedLineItemRow) -> Self {
        Self {
            id: row.id,
            quote_id: row.quote_id,
            part_id: row.part_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            part: PartRef { id: row.part_id, name: row.part_name },
        }
    }
}

// --- Item de rascunho ---
// Existe só em memória enquanto o orçamento ainda não foi salvo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItem {
    pub id: Uuid,
    pub part_id: Uuid,
    pub part_name: String, // copiado do catálogo no momento do "adicionar"
    pub quantity: i32,
    pub unit_price: Decimal,
}

// Pedido de criação enviado ao gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub quote_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Uma linha da lista de peças. A lista é sempre homogênea: ou toda `Persisted`
/// (orçamento já existe) ou toda `Draft` (orçamento em criação).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LineItemRow {
    Persisted(PersistedLineItem),
    Draft(DraftLineItem),
}

impl LineItemRow {
    pub fn id(&self) -> Uuid {
        match self {
            LineItemRow::Persisted(item) => item.id,
            LineItemRow::Draft(item) => item.id,
        }
    }

    pub fn part_name(&self) -> &str {
        match self {
            LineItemRow::Persisted(item) => &item.part.name,
            LineItemRow::Draft(item) => &item.part_name,
        }
    }

    pub fn quantity(&self) -> i32 {
        match self {
            LineItemRow::Persisted(item) => item.quantity,
            LineItemRow::Draft(item) => item.quantity,
        }
    }

    pub fn unit_price(&self) -> Decimal {
        match self {
            LineItemRow::Persisted(item) => item.unit_price,
            LineItemRow::Draft(item) => item.unit_price,
        }
    }

    /// `None` só se a multiplicação estourar o `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        Decimal::from(self.quantity()).checked_mul(self.unit_price())
    }
}

// --- Serviços do orçamento ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteServiceLine {
    pub id: Uuid,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub service: Option<ServiceRef>,
}

#[derive(Debug, FromRow)]
pub struct QuoteServiceLineRow {
    pub id: Uuid,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub service_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl From<QuoteServiceLineRow> for QuoteServiceLine {
    fn from(row: QuoteServiceLineRow) -> Self {
        let service = match (row.service_id, row.service_name) {
            (Some(id), Some(name)) => Some(ServiceRef { id, name }),
            _ => None,
        };
        Self { id: row.id, hours: row.hours, hourly_rate: row.hourly_rate, service }
    }
}

// Orçamento vinculado a uma OS, com os itens já carregados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedQuote {
    pub id: Uuid,
    pub status: String,
    pub part_items: Option<Vec<PersistedLineItem>>,
    pub service_items: Option<Vec<QuoteServiceLine>>,
}

pub const QUOTE_STATUS_PENDING: &str = "Pendente";

// Maior valor que cabe em NUMERIC(12, 2)
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}
