// src/services/work_order_card.rs
//
// Cartão de resumo de uma OS: só leitura, mais a exclusão com confirmação.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        format::{format_currency, format_date},
    },
    db::gateway::WorkOrderGateway,
    models::work_order::{PaymentStatus, ServiceStatus, WorkOrder, WorkOrderDetails},
    services::mutation::MutationState,
};

pub type CardCallback = Box<dyn Fn(&WorkOrderDetails) + Send + Sync>;

// --- Tratamento visual do status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusGlyph {
    Settings,
    Package,
    CheckCircle,
    AlertTriangle,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Blue,
    Yellow,
    Green,
    Purple,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBadge {
    pub label: String,
    pub glyph: StatusGlyph,
    pub tone: StatusTone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBadge {
    pub label: String,
    pub variant: BadgeVariant,
}

pub fn status_badge(status: &ServiceStatus) -> StatusBadge {
    let (glyph, tone) = match status {
        ServiceStatus::Andamento => (StatusGlyph::Settings, StatusTone::Blue),
        ServiceStatus::AguardandoPecas => (StatusGlyph::Package, StatusTone::Yellow),
        ServiceStatus::Finalizado => (StatusGlyph::CheckCircle, StatusTone::Green),
        ServiceStatus::Entregue => (StatusGlyph::AlertTriangle, StatusTone::Purple),
        // Pendente e qualquer valor desconhecido
        _ => (StatusGlyph::Clock, StatusTone::Gray),
    };
    StatusBadge { label: status.as_str().to_string(), glyph, tone }
}

pub fn payment_badge(status: &PaymentStatus) -> PaymentBadge {
    let variant = match status {
        PaymentStatus::Pendente => BadgeVariant::Destructive,
        _ => BadgeVariant::Default,
    };
    PaymentBadge { label: status.as_str().to_string(), variant }
}

// --- Valores derivados ---

pub const NO_VEHICLE: &str = "N/A";

/// Veículo cadastrado > dados do carro no cadastro do cliente > "N/A".
pub fn vehicle_description(details: &WorkOrderDetails) -> String {
    if let Some(vehicle) = &details.vehicle {
        return format!("{} {} {} - {}", vehicle.make, vehicle.model, vehicle.year, vehicle.plate);
    }

    if let Some(client) = &details.client {
        if let (Some(make), Some(model)) = (filled(&client.make), filled(&client.model)) {
            return format!(
                "{} {} {} - {}",
                make,
                model,
                client.year.as_deref().unwrap_or_default(),
                client.plate.as_deref().unwrap_or_default()
            );
        }
    }

    NO_VEHICLE.to_string()
}

// Texto vazio conta como ausente
fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

pub fn discounted_total(work_order: &WorkOrder) -> Decimal {
    let discount = work_order.discount.unwrap_or(Decimal::ZERO);
    work_order.total_value.checked_sub(discount).unwrap_or(work_order.total_value)
}

// --- Projeção serializável ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub label: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LineSummary {
    Lines { lines: Vec<SummaryLine> },
    Placeholder { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_value: String,
    pub discount: Option<String>, // só aparece quando > 0
    pub discounted_total: Option<String>,
    pub paid_amount: String,
    pub amount_due: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteControl {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderCardView {
    pub id: Uuid,
    pub title: String,
    pub status: StatusBadge,
    pub payment: PaymentBadge,
    pub client_name: Option<String>,
    pub vehicle: String,
    pub current_mileage: Option<i32>,
    pub start_date: String,
    pub deadline_date: String,
    pub note: Option<String>,
    pub financial: FinancialSummary,
    pub parts: LineSummary,
    pub services: LineSummary,
    pub delete: DeleteControl,
}

/// Aviso exibido antes de excluir. Só `request_delete` cria um, então
/// `confirm_delete` nunca roda sem a confirmação ter sido pedida antes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePrompt {
    work_order_id: Uuid,
    pub title: String,
    pub message: String,
    pub quote_warning: Option<String>,
}

impl DeletePrompt {
    pub fn full_text(&self) -> String {
        match &self.quote_warning {
            Some(warning) => format!("{} {}", self.message, warning),
            None => self.message.clone(),
        }
    }
}

pub struct WorkOrderSummaryCard {
    details: WorkOrderDetails,
    gateway: Arc<dyn WorkOrderGateway>,
    on_view: Option<CardCallback>,
    on_edit: Option<CardCallback>,
    deleting: MutationState,
}

impl WorkOrderSummaryCard {
    /// `deleting` deve ser o mesmo para todos os cartões da mesma OS.
    pub fn new(
        details: WorkOrderDetails,
        gateway: Arc<dyn WorkOrderGateway>,
        deleting: MutationState,
    ) -> Self {
        Self {
            details,
            gateway,
            on_view: None,
            on_edit: None,
            deleting,
        }
    }

    pub fn on_view(mut self, callback: impl Fn(&WorkOrderDetails) + Send + Sync + 'static) -> Self {
        self.on_view = Some(Box::new(callback));
        self
    }

    pub fn on_edit(mut self, callback: impl Fn(&WorkOrderDetails) + Send + Sync + 'static) -> Self {
        self.on_edit = Some(Box::new(callback));
        self
    }

    pub fn details(&self) -> &WorkOrderDetails {
        &self.details
    }

    pub fn view(&self) {
        if let Some(callback) = &self.on_view {
            callback(&self.details);
        }
    }

    pub fn edit(&self) {
        if let Some(callback) = &self.on_edit {
            callback(&self.details);
        }
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_pending()
    }

    pub fn request_delete(&self) -> DeletePrompt {
        let header = &self.details.header;
        DeletePrompt {
            work_order_id: header.id,
            title: "Confirmar Exclusão".to_string(),
            message: format!(
                "Tem certeza que deseja excluir a OS {}? Esta ação não pode ser desfeita.",
                header.number
            ),
            quote_warning: self
                .details
                .quote
                .as_ref()
                .map(|_| "O orçamento vinculado voltará para o status \"Pendente\".".to_string()),
        }
    }

    pub async fn confirm_delete(&self, prompt: DeletePrompt) -> Result<(), AppError> {
        if prompt.work_order_id != self.details.header.id {
            return Err(AppError::ConfirmationRequired(self.request_delete().full_text()));
        }
        let Some(_guard) = self.deleting.try_begin() else {
            return Err(AppError::MutationPending);
        };

        self.gateway.delete_work_order(prompt.work_order_id).await?;
        tracing::info!("🗑️ OS {} excluída", self.details.header.number);
        Ok(())
    }

    pub fn render(&self) -> WorkOrderCardView {
        let header = &self.details.header;
        WorkOrderCardView {
            id: header.id,
            title: format!("OS {}", header.number),
            status: status_badge(&header.service_status),
            payment: payment_badge(&header.payment_status),
            client_name: self.details.client.as_ref().map(|c| c.name.clone()),
            vehicle: vehicle_description(&self.details),
            // 0 km é tratado como "não informado"
            current_mileage: header.current_mileage.filter(|km| *km != 0),
            start_date: format_date(header.start_date),
            deadline_date: format_date(header.deadline_date),
            note: header.note.clone(),
            financial: self.financial(),
            parts: self.part_lines(),
            services: self.service_lines(),
            delete: DeleteControl {
                label: if self.is_deleting() { "Excluindo..." } else { "Excluir" }.to_string(),
                disabled: self.is_deleting(),
            },
        }
    }

    fn financial(&self) -> FinancialSummary {
        let header = &self.details.header;
        let discount = header.discount.unwrap_or(Decimal::ZERO);
        let has_discount = discount > Decimal::ZERO;

        FinancialSummary {
            total_value: format_currency(header.total_value),
            discount: has_discount.then(|| format_currency(discount)),
            discounted_total: has_discount.then(|| format_currency(discounted_total(header))),
            paid_amount: format_currency(header.paid_amount),
            amount_due: format_currency(header.amount_due.unwrap_or(Decimal::ZERO)),
            payment_method: header
                .payment_method
                .clone()
                .unwrap_or_else(|| "Não informado".to_string()),
        }
    }

    fn part_lines(&self) -> LineSummary {
        let items = self.details.quote.as_ref().and_then(|q| q.part_items.as_ref());
        match items {
            Some(items) if !items.is_empty() => LineSummary::Lines {
                lines: items
                    .iter()
                    .map(|item| SummaryLine {
                        label: format!("{}x {}", item.quantity, item.part.name),
                        subtotal: format_currency(
                            Decimal::from(item.quantity)
                                .checked_mul(item.unit_price)
                                .unwrap_or(Decimal::ZERO),
                        ),
                    })
                    .collect(),
            },
            _ => LineSummary::Placeholder { text: "Nenhuma peça".to_string() },
        }
    }

    fn service_lines(&self) -> LineSummary {
        let items = self.details.quote.as_ref().and_then(|q| q.service_items.as_ref());
        match items {
            Some(items) if !items.is_empty() => LineSummary::Lines {
                lines: items
                    .iter()
                    .map(|item| SummaryLine {
                        label: format!(
                            "{}h {}",
                            item.hours.normalize(),
                            item.service.as_ref().map(|s| s.name.as_str()).unwrap_or_default()
                        ),
                        subtotal: format_currency(
                            item.hours.checked_mul(item.hourly_rate).unwrap_or(Decimal::ZERO),
                        ),
                    })
                    .collect(),
            },
            _ => LineSummary::Placeholder { text: "Nenhum serviço".to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::{
        db::InMemoryStore,
        models::{
            quote::{LinkedQuote, PartRef, PersistedLineItem, QuoteServiceLine, ServiceRef},
            work_order::{Client, Vehicle},
        },
    };

    fn header() -> WorkOrder {
        WorkOrder {
            id: Uuid::new_v4(),
            number: 42,
            service_status: ServiceStatus::Andamento,
            payment_status: PaymentStatus::Pendente,
            total_value: dec!(500.00),
            discount: Some(dec!(50.00)),
            paid_amount: dec!(100),
            amount_due: None,
            payment_method: None,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            deadline_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            note: Some("Cliente pediu para guardar as peças velhas".into()),
            current_mileage: Some(85_000),
            client_id: None,
            vehicle_id: None,
            quote_id: None,
        }
    }

    fn details(header: WorkOrder) -> WorkOrderDetails {
        WorkOrderDetails { header, client: None, vehicle: None, quote: None }
    }

    fn client_with_car() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            make: Some("Fiat".into()),
            model: Some("Uno".into()),
            year: Some("2010".into()),
            plate: Some("ABC1D23".into()),
        }
    }

    fn card(details: WorkOrderDetails, store: &InMemoryStore) -> WorkOrderSummaryCard {
        WorkOrderSummaryCard::new(details, Arc::new(store.clone()), MutationState::new())
    }

    #[test]
    fn status_mapping_is_total() {
        let cases = [
            (ServiceStatus::Andamento, StatusGlyph::Settings, StatusTone::Blue),
            (ServiceStatus::AguardandoPecas, StatusGlyph::Package, StatusTone::Yellow),
            (ServiceStatus::Finalizado, StatusGlyph::CheckCircle, StatusTone::Green),
            (ServiceStatus::Entregue, StatusGlyph::AlertTriangle, StatusTone::Purple),
            (ServiceStatus::Pendente, StatusGlyph::Clock, StatusTone::Gray),
            (ServiceStatus::from("Cancelado".to_string()), StatusGlyph::Clock, StatusTone::Gray),
        ];
        for (status, glyph, tone) in cases {
            let badge = status_badge(&status);
            assert_eq!((badge.glyph, badge.tone), (glyph, tone), "status {:?}", status);
        }
        assert_eq!(status_badge(&ServiceStatus::Other("Cancelado".into())).label, "Cancelado");
    }

    #[test]
    fn vehicle_entity_wins_over_client_fields() {
        let mut d = details(header());
        d.client = Some(client_with_car());
        d.vehicle = Some(Vehicle {
            id: Uuid::new_v4(),
            make: "VW".into(),
            model: "Gol".into(),
            year: "2018".into(),
            plate: "XYZ9K87".into(),
        });
        assert_eq!(vehicle_description(&d), "VW Gol 2018 - XYZ9K87");
    }

    #[test]
    fn client_fields_are_the_fallback() {
        let mut d = details(header());
        d.client = Some(client_with_car());
        assert_eq!(vehicle_description(&d), "Fiat Uno 2010 - ABC1D23");
    }

    #[test]
    fn no_vehicle_data_renders_na() {
        let mut d = details(header());
        assert_eq!(vehicle_description(&d), "N/A");

        // cliente sem carro no cadastro
        d.client = Some(Client { make: None, model: None, year: None, plate: None, ..client_with_car() });
        assert_eq!(vehicle_description(&d), "N/A");
    }

    #[test]
    fn blank_make_or_model_renders_na() {
        let mut d = details(header());
        d.client = Some(Client { make: Some(String::new()), ..client_with_car() });
        assert_eq!(vehicle_description(&d), "N/A");

        d.client = Some(Client { model: Some(String::new()), ..client_with_car() });
        assert_eq!(vehicle_description(&d), "N/A");
    }

    #[test]
    fn zero_mileage_is_hidden() {
        let mut h = header();
        h.current_mileage = Some(0);
        let view = card(details(h), &InMemoryStore::new()).render();
        assert_eq!(view.current_mileage, None);
    }

    #[test]
    fn discount_is_subtracted_and_formatted_with_comma() {
        let store = InMemoryStore::new();
        let view = card(details(header()), &store).render();
        assert_eq!(discounted_total(&header()), dec!(450.00));
        assert_eq!(view.financial.total_value, "R$ 500,00");
        assert_eq!(view.financial.discount.as_deref(), Some("R$ 50,00"));
        assert_eq!(view.financial.discounted_total.as_deref(), Some("R$ 450,00"));
    }

    #[test]
    fn absent_discount_counts_as_zero() {
        let mut h = header();
        h.discount = None;
        assert_eq!(discounted_total(&h), dec!(500.00));

        let view = card(details(h), &InMemoryStore::new()).render();
        assert_eq!(view.financial.discount, None);
        assert_eq!(view.financial.discounted_total, None);
        assert_eq!(view.financial.amount_due, "R$ 0,00");
        assert_eq!(view.financial.payment_method, "Não informado");
    }

    #[test]
    fn render_formats_header_fields() {
        let view = card(details(header()), &InMemoryStore::new()).render();
        assert_eq!(view.title, "OS 42");
        assert_eq!(view.start_date, "02/05/2024");
        assert_eq!(view.deadline_date, "10/05/2024");
        assert_eq!(view.payment.variant, BadgeVariant::Destructive);
        assert_eq!(view.current_mileage, Some(85_000));
        assert_eq!(view.delete, DeleteControl { label: "Excluir".into(), disabled: false });

        let mut paid = header();
        paid.payment_status = PaymentStatus::Pago;
        let view = card(details(paid), &InMemoryStore::new()).render();
        assert_eq!(view.payment.variant, BadgeVariant::Default);
    }

    #[test]
    fn missing_quote_lists_render_placeholders() {
        let view = card(details(header()), &InMemoryStore::new()).render();
        assert_eq!(view.parts, LineSummary::Placeholder { text: "Nenhuma peça".into() });
        assert_eq!(view.services, LineSummary::Placeholder { text: "Nenhum serviço".into() });
    }

    #[test]
    fn quote_lines_show_quantity_hours_and_subtotals() {
        let quote_id = Uuid::new_v4();
        let part_id = Uuid::new_v4();
        let mut d = details(header());
        d.quote = Some(LinkedQuote {
            id: quote_id,
            status: "Aprovado".into(),
            part_items: Some(vec![PersistedLineItem {
                id: Uuid::new_v4(),
                quote_id,
                part_id,
                quantity: 3,
                unit_price: dec!(12.5),
                part: PartRef { id: part_id, name: "Vela".into() },
            }]),
            service_items: Some(vec![QuoteServiceLine {
                id: Uuid::new_v4(),
                hours: dec!(1.50),
                hourly_rate: dec!(80),
                service: Some(ServiceRef { id: Uuid::new_v4(), name: "Troca de óleo".into() }),
            }]),
        });

        let view = card(d, &InMemoryStore::new()).render();
        assert_eq!(
            view.parts,
            LineSummary::Lines { lines: vec![SummaryLine { label: "3x Vela".into(), subtotal: "R$ 37,50".into() }] }
        );
        assert_eq!(
            view.services,
            LineSummary::Lines {
                lines: vec![SummaryLine { label: "1.5h Troca de óleo".into(), subtotal: "R$ 120,00".into() }]
            }
        );
    }

    #[test]
    fn callbacks_receive_the_work_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let d = details(header());
        let id = d.header.id;
        let card = WorkOrderSummaryCard::new(d, Arc::new(InMemoryStore::new()), MutationState::new())
            .on_view({
                let seen = seen.clone();
                move |wo| seen.lock().unwrap().push(("view", wo.header.id))
            })
            .on_edit({
                let seen = seen.clone();
                move |wo| seen.lock().unwrap().push(("edit", wo.header.id))
            });

        card.view();
        card.edit();
        assert_eq!(*seen.lock().unwrap(), vec![("view", id), ("edit", id)]);
    }

    #[tokio::test]
    async fn delete_only_happens_after_confirmation() {
        let store = InMemoryStore::new();
        let quote_id = Uuid::new_v4();
        store.insert_quote(quote_id, "Aprovado").unwrap();
        let mut h = header();
        h.quote_id = Some(quote_id);
        store.insert_work_order(h.clone()).unwrap();
        let d = store.get_work_order(h.id).await.unwrap().unwrap();
        let card = card(d, &store);

        // Pedir a exclusão só devolve o aviso
        let prompt = card.request_delete();
        assert_eq!(prompt.title, "Confirmar Exclusão");
        assert!(prompt.message.contains("OS 42"));
        assert!(prompt.quote_warning.is_some());
        assert!(store.get_work_order(h.id).await.unwrap().is_some());

        card.confirm_delete(prompt).await.unwrap();
        assert!(store.get_work_order(h.id).await.unwrap().is_none());
        assert_eq!(store.quote_status(quote_id).unwrap().as_deref(), Some("Pendente"));
    }

    #[test]
    fn prompt_without_quote_has_no_warning() {
        let prompt = card(details(header()), &InMemoryStore::new()).request_delete();
        assert_eq!(prompt.quote_warning, None);
        assert_eq!(prompt.full_text(), "Tem certeza que deseja excluir a OS 42? Esta ação não pode ser desfeita.");
    }

    #[tokio::test]
    async fn prompt_from_another_card_is_refused() {
        let store = InMemoryStore::new();
        let first = card(details(header()), &store);
        let second = card(details(header()), &store);

        let result = first.confirm_delete(second.request_delete()).await;
        assert!(matches!(result, Err(AppError::ConfirmationRequired(_))));
    }

    #[tokio::test]
    async fn cards_of_the_same_order_share_the_delete_state() {
        let store = InMemoryStore::new();
        let d = details(header());
        let deleting = MutationState::new();
        let first = WorkOrderSummaryCard::new(d.clone(), Arc::new(store.clone()), deleting.clone());
        let second = WorkOrderSummaryCard::new(d, Arc::new(store.clone()), deleting.clone());

        let _in_flight = deleting.try_begin().unwrap();
        assert!(first.is_deleting());
        assert_eq!(second.render().delete, DeleteControl { label: "Excluindo...".into(), disabled: true });
        assert!(matches!(second.confirm_delete(second.request_delete()).await, Err(AppError::MutationPending)));
    }

    #[test]
    fn huge_quote_lines_do_not_panic() {
        let quote_id = Uuid::new_v4();
        let part_id = Uuid::new_v4();
        let mut d = details(header());
        d.quote = Some(LinkedQuote {
            id: quote_id,
            status: "Aprovado".into(),
            part_items: Some(vec![PersistedLineItem {
                id: Uuid::new_v4(),
                quote_id,
                part_id,
                quantity: i32::MAX,
                unit_price: Decimal::MAX,
                part: PartRef { id: part_id, name: "Motor".into() },
            }]),
            service_items: None,
        });

        let view = card(d, &InMemoryStore::new()).render();
        assert!(matches!(view.parts, LineSummary::Lines { .. }));
    }
}
