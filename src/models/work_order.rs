// src/models/work_order.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::quote::LinkedQuote;

// --- Enums ---
// Os status chegam como texto do banco/frontend. Valores fora do conjunto
// conhecido são preservados em `Other` em vez de virar erro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceStatus {
    Pendente,
    Andamento,
    AguardandoPecas,
    Finalizado,
    Entregue,
    Other(String),
}

impl ServiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Pendente => "Pendente",
            ServiceStatus::Andamento => "Andamento",
            ServiceStatus::AguardandoPecas => "Aguardando Peças",
            ServiceStatus::Finalizado => "Finalizado",
            ServiceStatus::Entregue => "Entregue",
            ServiceStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ServiceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pendente" => ServiceStatus::Pendente,
            "Andamento" => ServiceStatus::Andamento,
            "Aguardando Peças" => ServiceStatus::AguardandoPecas,
            "Finalizado" => ServiceStatus::Finalizado,
            "Entregue" => ServiceStatus::Entregue,
            _ => ServiceStatus::Other(raw),
        }
    }
}

impl From<ServiceStatus> for String {
    fn from(status: ServiceStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pendente,
    Parcial,
    Pago,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pendente => "Pendente",
            PaymentStatus::Parcial => "Parcial",
            PaymentStatus::Pago => "Pago",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pendente" => PaymentStatus::Pendente,
            "Parcial" => PaymentStatus::Parcial,
            "Pago" => PaymentStatus::Pago,
            _ => PaymentStatus::Other(raw),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

// --- Cliente ---
// Clientes antigos guardam os dados do carro direto no cadastro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub plate: Option<String>,
}

// --- Veículo ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: String,
    pub plate: String,
}

// --- Ordem de Serviço ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: Uuid,
    pub number: i32,
    #[sqlx(try_from = "String")]
    pub service_status: ServiceStatus,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub total_value: Decimal,
    pub discount: Option<Decimal>,
    pub paid_amount: Decimal,
    pub amount_due: Option<Decimal>,
    pub payment_method: Option<String>,
    pub start_date: NaiveDate,
    pub deadline_date: NaiveDate,
    pub note: Option<String>,
    pub current_mileage: Option<i32>, // km atual
    pub client_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
}

// OS com cliente, veículo e orçamento já resolvidos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetails {
    #[serde(flatten)]
    pub header: WorkOrder,
    pub client: Option<Client>,
    pub vehicle: Option<Vehicle>,
    pub quote: Option<LinkedQuote>,
}
