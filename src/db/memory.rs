//! Implementação em memória dos gateways, para testes e desenvolvimento local
//! (`STORAGE_BACKEND=memory`).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::gateway::{CatalogProvider, LineItemGateway, WorkOrderGateway},
    models::{
        catalog::Part,
        quote::{LinkedQuote, NewLineItem, PartRef, PersistedLineItem, QuoteServiceLine, QUOTE_STATUS_PENDING},
        work_order::{Client, Vehicle, WorkOrder, WorkOrderDetails},
    },
};

// Carga inicial em JSON (`MEMORY_SEED`), no mesmo formato camelCase da API
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seed {
    pub parts: Vec<Part>,
    pub clients: Vec<Client>,
    pub vehicles: Vec<Vehicle>,
    pub quotes: Vec<SeedQuote>,
    pub work_orders: Vec<WorkOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedQuote {
    pub id: Uuid,
    pub status: String,
    #[serde(default)]
    pub services: Vec<QuoteServiceLine>,
}

#[derive(Default)]
struct Tables {
    parts: Vec<Part>,
    quotes: HashMap<Uuid, String>, // id -> status
    quote_parts: Vec<PersistedLineItem>,
    quote_services: HashMap<Uuid, Vec<QuoteServiceLine>>,
    clients: HashMap<Uuid, Client>,
    vehicles: HashMap<Uuid, Vehicle>,
    work_orders: Vec<WorkOrder>,
}

/// Todas as "tabelas" atrás de um único RwLock; as operações são curtas e nunca atravessam um `.await`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|e| AppError::InternalServerError(anyhow!("Falha ao adquirir lock de leitura: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|e| AppError::InternalServerError(anyhow!("Falha ao adquirir lock de escrita: {}", e)))
    }

    // --- Carga de dados ---

    pub fn load_seed(&self, seed: Seed) -> Result<(), AppError> {
        let counts = (seed.parts.len(), seed.work_orders.len());
        for part in seed.parts {
            self.insert_part(part)?;
        }
        for client in seed.clients {
            self.insert_client(client)?;
        }
        for vehicle in seed.vehicles {
            self.insert_vehicle(vehicle)?;
        }
        for quote in seed.quotes {
            self.insert_quote(quote.id, &quote.status)?;
            for line in quote.services {
                self.insert_quote_service(quote.id, line)?;
            }
        }
        for work_order in seed.work_orders {
            self.insert_work_order(work_order)?;
        }
        tracing::info!("Carga inicial: {} peça(s), {} OS", counts.0, counts.1);
        Ok(())
    }

    pub fn insert_part(&self, part: Part) -> Result<(), AppError> {
        self.write()?.parts.push(part);
        Ok(())
    }

    pub fn insert_quote(&self, id: Uuid, status: &str) -> Result<(), AppError> {
        self.write()?.quotes.insert(id, status.to_string());
        Ok(())
    }

    pub fn insert_quote_service(&self, quote_id: Uuid, line: QuoteServiceLine) -> Result<(), AppError> {
        self.write()?.quote_services.entry(quote_id).or_default().push(line);
        Ok(())
    }

    pub fn insert_client(&self, client: Client) -> Result<(), AppError> {
        self.write()?.clients.insert(client.id, client);
        Ok(())
    }

    pub fn insert_vehicle(&self, vehicle: Vehicle) -> Result<(), AppError> {
        self.write()?.vehicles.insert(vehicle.id, vehicle);
        Ok(())
    }

    pub fn insert_work_order(&self, work_order: WorkOrder) -> Result<(), AppError> {
        self.write()?.work_orders.push(work_order);
        Ok(())
    }

    #[cfg(test)]
    pub fn quote_status(&self, quote_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.read()?.quotes.get(&quote_id).cloned())
    }

    fn details(tables: &Tables, header: &WorkOrder) -> WorkOrderDetails {
        let client = header.client_id.and_then(|id| tables.clients.get(&id).cloned());
        let vehicle = header.vehicle_id.and_then(|id| tables.vehicles.get(&id).cloned());
        let quote = header.quote_id.and_then(|quote_id| {
            tables.quotes.get(&quote_id).map(|status| LinkedQuote {
                id: quote_id,
                status: status.clone(),
                part_items: Some(
                    tables.quote_parts.iter().filter(|i| i.quote_id == quote_id).cloned().collect(),
                ),
                service_items: Some(tables.quote_services.get(&quote_id).cloned().unwrap_or_default()),
            })
        });

        WorkOrderDetails { header: header.clone(), client, vehicle, quote }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryStore {
    async fn list_parts(&self) -> Result<Vec<Part>, AppError> {
        let mut parts = self.read()?.parts.clone();
        parts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parts)
    }
}

#[async_trait]
impl LineItemGateway for InMemoryStore {
    async fn list_line_items(&self, quote_id: Uuid) -> Result<Vec<PersistedLineItem>, AppError> {
        Ok(self
            .read()?
            .quote_parts
            .iter()
            .filter(|item| item.quote_id == quote_id)
            .cloned()
            .collect())
    }

    async fn create_line_item(&self, item: NewLineItem) -> Result<PersistedLineItem, AppError> {
        let mut tables = self.write()?;

        // Mesmo comportamento da FK no Postgres
        let part = tables
            .parts
            .iter()
            .find(|p| p.id == item.part_id)
            .map(PartRef::from)
            .ok_or_else(|| AppError::InternalServerError(anyhow!("Peça {} não existe", item.part_id)))?;

        let created = PersistedLineItem {
            id: Uuid::new_v4(),
            quote_id: item.quote_id,
            part_id: item.part_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            part,
        };
        tables.quote_parts.push(created.clone());
        Ok(created)
    }

    async fn delete_line_item(&self, id: Uuid, quote_id: Uuid) -> Result<(), AppError> {
        self.write()?
            .quote_parts
            .retain(|item| !(item.id == id && item.quote_id == quote_id));
        Ok(())
    }
}

#[async_trait]
impl WorkOrderGateway for InMemoryStore {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrderDetails>, AppError> {
        let tables = self.read()?;
        let mut orders: Vec<WorkOrderDetails> =
            tables.work_orders.iter().map(|wo| Self::details(&tables, wo)).collect();
        orders.sort_by(|a, b| b.header.number.cmp(&a.header.number));
        Ok(orders)
    }

    async fn get_work_order(&self, id: Uuid) -> Result<Option<WorkOrderDetails>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .work_orders
            .iter()
            .find(|wo| wo.id == id)
            .map(|wo| Self::details(&tables, wo)))
    }

    async fn delete_work_order(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.write()?;

        let Some(position) = tables.work_orders.iter().position(|wo| wo.id == id) else {
            return Ok(());
        };
        let removed = tables.work_orders.remove(position);

        if let Some(quote_id) = removed.quote_id {
            if let Some(status) = tables.quotes.get_mut(&quote_id) {
                *status = QUOTE_STATUS_PENDING.to_string();
                tracing::info!("Orçamento {} voltou para '{}'", quote_id, QUOTE_STATUS_PENDING);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::models::work_order::{PaymentStatus, ServiceStatus};

    fn part(name: &str) -> Part {
        Part { id: Uuid::new_v4(), name: name.into(), unit_price: dec!(10) }
    }

    fn work_order(quote_id: Option<Uuid>) -> WorkOrder {
        WorkOrder {
            id: Uuid::new_v4(),
            number: 1,
            service_status: ServiceStatus::Andamento,
            payment_status: PaymentStatus::Pendente,
            total_value: dec!(100),
            discount: None,
            paid_amount: dec!(0),
            amount_due: None,
            payment_method: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            deadline_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            note: None,
            current_mileage: None,
            client_id: None,
            vehicle_id: None,
            quote_id,
        }
    }

    #[tokio::test]
    async fn created_line_item_carries_the_part_name() {
        let store = InMemoryStore::new();
        let filtro = part("Filtro de óleo");
        store.insert_part(filtro.clone()).unwrap();
        let quote_id = Uuid::new_v4();

        let created = store
            .create_line_item(NewLineItem { quote_id, part_id: filtro.id, quantity: 2, unit_price: dec!(30) })
            .await
            .unwrap();

        assert_eq!(created.part.name, "Filtro de óleo");
        assert_eq!(store.list_line_items(quote_id).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn line_items_are_scoped_to_their_quote() {
        let store = InMemoryStore::new();
        let vela = part("Vela");
        store.insert_part(vela.clone()).unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.create_line_item(NewLineItem { quote_id: a, part_id: vela.id, quantity: 1, unit_price: dec!(5) }).await.unwrap();
        let other = store
            .create_line_item(NewLineItem { quote_id: b, part_id: vela.id, quantity: 4, unit_price: dec!(5) })
            .await
            .unwrap();

        // id certo, orçamento errado: não apaga
        store.delete_line_item(other.id, a).await.unwrap();
        assert_eq!(store.list_line_items(b).await.unwrap().len(), 1);
        assert_eq!(store.list_line_items(a).await.unwrap().len(), 1);

        store.delete_line_item(other.id, b).await.unwrap();
        assert!(store.list_line_items(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_part_fails() {
        let store = InMemoryStore::new();
        let result = store
            .create_line_item(NewLineItem {
                quote_id: Uuid::new_v4(),
                part_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: dec!(1),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn deleting_a_work_order_reverts_its_quote() {
        let store = InMemoryStore::new();
        let quote_id = Uuid::new_v4();
        store.insert_quote(quote_id, "Aprovado").unwrap();
        let wo = work_order(Some(quote_id));
        store.insert_work_order(wo.clone()).unwrap();

        store.delete_work_order(wo.id).await.unwrap();

        assert!(store.get_work_order(wo.id).await.unwrap().is_none());
        assert_eq!(store.quote_status(quote_id).unwrap().as_deref(), Some("Pendente"));
    }

    #[tokio::test]
    async fn details_resolve_linked_quote_items() {
        let store = InMemoryStore::new();
        let quote_id = Uuid::new_v4();
        store.insert_quote(quote_id, "Aprovado").unwrap();
        let wo = work_order(Some(quote_id));
        store.insert_work_order(wo.clone()).unwrap();

        let details = store.get_work_order(wo.id).await.unwrap().unwrap();
        let quote = details.quote.unwrap();
        assert_eq!(quote.part_items, Some(vec![]));
        assert_eq!(quote.service_items, Some(vec![]));
    }

    #[tokio::test]
    async fn seed_json_populates_the_store() {
        let quote_id = Uuid::new_v4();
        let seed: Seed = serde_json::from_value(serde_json::json!({
            "parts": [{ "id": Uuid::new_v4(), "name": "Amortecedor", "unitPrice": 250.0 }],
            "quotes": [{
                "id": quote_id,
                "status": "Aprovado",
                "services": [{ "id": Uuid::new_v4(), "hours": 2.0, "hourlyRate": 90.0, "service": null }]
            }],
            "workOrders": [{
                "id": Uuid::new_v4(),
                "number": 3,
                "serviceStatus": "Aguardando Peças",
                "paymentStatus": "Pendente",
                "totalValue": 430.0,
                "paidAmount": 0.0,
                "startDate": "2024-02-01",
                "deadlineDate": "2024-02-09",
                "quoteId": quote_id
            }]
        }))
        .unwrap();

        let store = InMemoryStore::new();
        store.load_seed(seed).unwrap();

        assert_eq!(store.list_parts().await.unwrap().len(), 1);
        let orders = store.list_work_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        let quote = orders[0].quote.as_ref().unwrap();
        assert_eq!(quote.service_items.as_ref().unwrap().len(), 1);
    }
}
