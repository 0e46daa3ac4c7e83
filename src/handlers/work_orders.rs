// src/handlers/work_orders.rs

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::confirm::Confirmation,
    models::work_order::WorkOrderDetails,
    services::work_order_card::{WorkOrderCardView, WorkOrderSummaryCard},
};

// Monta o cartão já com os callbacks de auditoria. O estado de exclusão vem do
// registro, para que requisições simultâneas sobre a mesma OS enxerguem umas às outras.
fn build_card(app_state: &AppState, details: WorkOrderDetails) -> Result<WorkOrderSummaryCard, AppError> {
    let deleting = app_state.deletes.state_for(details.header.id)?;
    Ok(WorkOrderSummaryCard::new(details, Arc::clone(&app_state.work_orders), deleting)
        .on_view(|wo| tracing::info!("OS {} visualizada", wo.header.number))
        .on_edit(|wo| tracing::info!("OS {} aberta para edição", wo.header.number)))
}

async fn load_card(app_state: &AppState, id: Uuid) -> Result<WorkOrderSummaryCard, AppError> {
    let details = app_state
        .work_orders
        .get_work_order(id)
        .await?
        .ok_or(AppError::WorkOrderNotFound)?;
    build_card(app_state, details)
}

// GET /api/work-orders
pub async fn list_work_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cards: Vec<WorkOrderCardView> = app_state
        .work_orders
        .list_work_orders()
        .await?
        .into_iter()
        .map(|details| build_card(&app_state, details).map(|card| card.render()))
        .collect::<Result<_, _>>()?;

    Ok(Json(cards))
}

// GET /api/work-orders/{id}
pub async fn get_work_order_card(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let card = load_card(&app_state, id).await?;
    Ok(Json(card.render()))
}

// POST /api/work-orders/{id}/view
pub async fn view_work_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let card = load_card(&app_state, id).await?;
    card.view();
    Ok(Json(card.details().clone()))
}

// POST /api/work-orders/{id}/edit
pub async fn edit_work_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let card = load_card(&app_state, id).await?;
    card.edit();
    Ok(Json(card.details().clone()))
}

// GET /api/work-orders/{id}/delete-prompt
pub async fn get_delete_prompt(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let card = load_card(&app_state, id).await?;
    Ok(Json(card.request_delete()))
}

// DELETE /api/work-orders/{id}
// Sem "x-confirm: true" nada é apagado: devolve 428 com o texto do aviso.
pub async fn delete_work_order(
    State(app_state): State<AppState>,
    Confirmation(confirmed): Confirmation,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let card = load_card(&app_state, id).await?;
    let prompt = card.request_delete();

    if !confirmed {
        return Err(AppError::ConfirmationRequired(prompt.full_text()));
    }

    card.confirm_delete(prompt).await?;
    Ok(StatusCode::NO_CONTENT)
}
