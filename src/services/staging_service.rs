// src/services/staging_service.rs
//
// Lista de peças de um orçamento. Funciona em dois modos, escolhidos na criação:
//  - Bound: o orçamento já existe, a lista vive no gateway (banco);
//  - Staging: orçamento ainda em criação, a lista é um rascunho em memória.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::format_amount},
    db::gateway::{CatalogProvider, LineItemGateway},
    models::quote::{max_amount, DraftLineItem, LineItemRow, NewLineItem},
    services::mutation::MutationState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "quoteId", rename_all = "camelCase")]
pub enum Mode {
    Bound(Uuid),
    Staging,
}

// Campos do formulário "nova peça", exatamente como o usuário digitou
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemForm {
    pub selected_part_id: Option<Uuid>,
    pub quantity: String,
    pub unit_price: String,
}

impl LineItemForm {
    fn has_missing_field(&self) -> bool {
        self.selected_part_id.is_none()
            || self.quantity.trim().is_empty()
            || self.unit_price.trim().is_empty()
    }
}

#[derive(Default)]
struct LocalState {
    form: LineItemForm,
    drafts: Vec<DraftLineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingField,
    UnknownPart,
    CreatePending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AddOutcome {
    Added { row: LineItemRow },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRowView {
    pub id: Uuid,
    pub persisted: bool,
    pub part_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&LineItemRow> for LineItemRowView {
    fn from(row: &LineItemRow) -> Self {
        Self {
            id: row.id(),
            persisted: matches!(row, LineItemRow::Persisted(_)),
            part_name: row.part_name().to_string(),
            quantity: row.quantity(),
            unit_price: format_amount(row.unit_price()),
            subtotal: format_amount(row.subtotal().unwrap_or(Decimal::ZERO)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingListView {
    pub mode: Mode,
    pub rows: Vec<LineItemRowView>,
    pub form: LineItemForm,
    pub total_preview: String,
    pub can_add: bool,
    pub is_adding: bool,
    pub is_removing: bool,
}

pub struct LineItemStagingList {
    mode: Mode,
    catalog: Arc<dyn CatalogProvider>,
    gateway: Arc<dyn LineItemGateway>,
    // Nunca segurar este lock através de um `.await`
    local: Mutex<LocalState>,
    creating: MutationState,
    removing: MutationState,
}

impl LineItemStagingList {
    pub fn new(
        quote_id: Option<Uuid>,
        catalog: Arc<dyn CatalogProvider>,
        gateway: Arc<dyn LineItemGateway>,
    ) -> Self {
        let mode = match quote_id {
            Some(id) => Mode::Bound(id),
            None => Mode::Staging,
        };
        Self {
            mode,
            catalog,
            gateway,
            local: Mutex::new(LocalState::default()),
            creating: MutationState::new(),
            removing: MutationState::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn local(&self) -> Result<MutexGuard<'_, LocalState>, AppError> {
        self.local
            .lock()
            .map_err(|e| AppError::InternalServerError(anyhow!("Estado local envenenado: {}", e)))
    }

    pub fn form(&self) -> Result<LineItemForm, AppError> {
        Ok(self.local()?.form.clone())
    }

    // --- Eventos do formulário ---

    /// Seleciona a peça e sobrescreve o valor unitário com o preço do catálogo.
    pub async fn select_part(&self, part_id: Uuid) -> Result<(), AppError> {
        let parts = self.catalog.list_parts().await?;
        let price = parts.iter().find(|p| p.id == part_id).map(|p| p.unit_price);

        let mut local = self.local()?;
        local.form.selected_part_id = Some(part_id);
        if let Some(price) = price {
            local.form.unit_price = price.to_string();
        }
        Ok(())
    }

    pub fn clear_selection(&self) -> Result<(), AppError> {
        self.local()?.form.selected_part_id = None;
        Ok(())
    }

    pub fn set_quantity(&self, text: &str) -> Result<(), AppError> {
        self.local()?.form.quantity = text.to_string();
        Ok(())
    }

    pub fn set_unit_price(&self, text: &str) -> Result<(), AppError> {
        self.local()?.form.unit_price = text.to_string();
        Ok(())
    }

    // --- Operações ---

    pub async fn add(&self) -> Result<AddOutcome, AppError> {
        let form = self.form()?;
        if form.has_missing_field() {
            return Ok(AddOutcome::Skipped { reason: SkipReason::MissingField });
        }
        let Some(part_id) = form.selected_part_id else {
            return Ok(AddOutcome::Skipped { reason: SkipReason::MissingField });
        };

        // Pego antes de qualquer `.await` para que dois cliques seguidos não passem juntos
        let Some(_guard) = self.creating.try_begin() else {
            return Ok(AddOutcome::Skipped { reason: SkipReason::CreatePending });
        };

        let parts = self.catalog.list_parts().await?;
        let Some(part) = parts.into_iter().find(|p| p.id == part_id) else {
            return Ok(AddOutcome::Skipped { reason: SkipReason::UnknownPart });
        };

        let (quantity, unit_price) = parse_line(&form)?;

        let row = match self.mode {
            Mode::Bound(quote_id) => {
                let created = self
                    .gateway
                    .create_line_item(NewLineItem { quote_id, part_id, quantity, unit_price })
                    .await?;
                tracing::info!("Peça '{}' adicionada ao orçamento {}", part.name, quote_id);
                LineItemRow::Persisted(created)
            }
            Mode::Staging => {
                let draft = DraftLineItem {
                    id: Uuid::new_v4(),
                    part_id,
                    part_name: part.name,
                    quantity,
                    unit_price,
                };
                self.local()?.drafts.push(draft.clone());
                LineItemRow::Draft(draft)
            }
        };

        // O que foi digitado durante a gravação não é apagado
        let mut local = self.local()?;
        if local.form == form {
            local.form = LineItemForm::default();
        }
        Ok(AddOutcome::Added { row })
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.mode {
            Mode::Bound(quote_id) => {
                let _guard = self.removing.begin();
                self.gateway.delete_line_item(id, quote_id).await?;
                tracing::info!("Item {} removido do orçamento {}", id, quote_id);
            }
            Mode::Staging => {
                self.local()?.drafts.retain(|draft| draft.id != id);
            }
        }
        Ok(())
    }

    /// Bound relê do gateway; Staging devolve o rascunho. Nunca mistura os dois.
    pub async fn rows(&self) -> Result<Vec<LineItemRow>, AppError> {
        match self.mode {
            Mode::Bound(quote_id) => Ok(self
                .gateway
                .list_line_items(quote_id)
                .await?
                .into_iter()
                .map(LineItemRow::Persisted)
                .collect()),
            Mode::Staging => Ok(self
                .drafts()?
                .into_iter()
                .map(LineItemRow::Draft)
                .collect()),
        }
    }

    pub fn drafts(&self) -> Result<Vec<DraftLineItem>, AppError> {
        Ok(self.local()?.drafts.clone())
    }

    // --- Valores derivados ---

    /// Prévia do "Total" da linha sendo digitada; nunca é gravada.
    pub fn pending_total(&self) -> Result<String, AppError> {
        Ok(preview_total(&self.form()?))
    }

    pub fn is_adding(&self) -> bool {
        self.creating.is_pending()
    }

    pub fn is_removing(&self) -> bool {
        self.removing.is_pending()
    }

    /// `add` só faz algo útil quando isto é verdadeiro.
    pub fn can_add(&self) -> Result<bool, AppError> {
        let form = self.form()?;
        Ok(!form.has_missing_field() && parse_line(&form).is_ok() && !self.is_adding())
    }

    pub async fn view(&self) -> Result<StagingListView, AppError> {
        let rows = self.rows().await?;
        let form = self.form()?;
        Ok(StagingListView {
            mode: self.mode,
            rows: rows.iter().map(LineItemRowView::from).collect(),
            total_preview: preview_total(&form),
            can_add: self.can_add()?,
            is_adding: self.is_adding(),
            is_removing: self.is_removing(),
            form,
        })
    }
}

// Quantidade, valor unitário e subtotal precisam caber em NUMERIC(12, 2)
fn parse_line(form: &LineItemForm) -> Result<(i32, Decimal), AppError> {
    let quantity = parse_quantity(&form.quantity)?;
    let unit_price = parse_unit_price(&form.unit_price)?;
    if unit_price > max_amount() {
        return Err(AppError::AmountOutOfRange(format!("valor unitário {}", unit_price)));
    }
    match Decimal::from(quantity).checked_mul(unit_price) {
        Some(subtotal) if subtotal <= max_amount() => Ok((quantity, unit_price)),
        _ => Err(AppError::AmountOutOfRange(format!("{} x {}", quantity, unit_price))),
    }
}

fn parse_quantity(text: &str) -> Result<i32, AppError> {
    match text.trim().parse::<i32>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(AppError::InvalidQuantity(text.to_string())),
    }
}

// Aceita "12,50" além de "12.50"
fn parse_unit_price(text: &str) -> Result<Decimal, AppError> {
    match Decimal::from_str(&text.trim().replace(',', ".")) {
        Ok(price) if !price.is_sign_negative() => Ok(price),
        _ => Err(AppError::InvalidUnitPrice(text.to_string())),
    }
}

fn preview_total(form: &LineItemForm) -> String {
    let quantity = Decimal::from_str(&form.quantity.trim().replace(',', "."));
    let unit_price = Decimal::from_str(&form.unit_price.trim().replace(',', "."));
    match (quantity, unit_price) {
        (Ok(quantity), Ok(unit_price)) => {
            format_amount(quantity.checked_mul(unit_price).unwrap_or(Decimal::ZERO))
        }
        _ => format_amount(Decimal::ZERO),
    }
}
