// src/handlers/quotes.rs
//
// Editor de peças do orçamento. Cada editor aberto no frontend é uma sessão
// com a sua própria LineItemStagingList.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    services::staging_service::{AddOutcome, StagingListView},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenComposerPayload {
    // Ausente = orçamento ainda em criação (rascunho em memória)
    pub quote_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerResponse {
    pub session_id: Uuid,
    pub view: StagingListView,
}

// POST /api/quote-composers
pub async fn open_composer(
    State(app_state): State<AppState>,
    Json(payload): Json<OpenComposerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (session_id, list) = app_state.composers.open(payload.quote_id).await;
    let view = list.view().await?;

    Ok((StatusCode::CREATED, Json(ComposerResponse { session_id, view })))
}

// GET /api/quote-composers/{id}
pub async fn get_composer(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let list = app_state.composers.get(session_id).await?;
    Ok(Json(list.view().await?))
}

// DELETE /api/quote-composers/{id}
pub async fn close_composer(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.composers.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPartPayload {
    // null limpa a seleção
    pub part_id: Option<Uuid>,
}

// PUT /api/quote-composers/{id}/part
pub async fn select_part(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectPartPayload>,
) -> Result<impl IntoResponse, AppError> {
    let list = app_state.composers.get(session_id).await?;
    match payload.part_id {
        Some(part_id) => list.select_part(part_id).await?,
        None => list.clear_selection()?,
    }
    Ok(Json(list.view().await?))
}

// O texto é guardado como digitado; a conversão só acontece no "adicionar"
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInputsPayload {
    #[validate(length(max = 16, message = "Quantidade muito longa."))]
    pub quantity: Option<String>,

    #[validate(length(max = 20, message = "Valor unitário muito longo."))]
    pub unit_price: Option<String>,
}

// PUT /api/quote-composers/{id}/inputs
pub async fn update_inputs(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateInputsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let list = app_state.composers.get(session_id).await?;
    if let Some(quantity) = &payload.quantity {
        list.set_quantity(quantity)?;
    }
    if let Some(unit_price) = &payload.unit_price {
        list.set_unit_price(unit_price)?;
    }
    Ok(Json(list.view().await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub result: AddOutcome,
    pub view: StagingListView,
}

// POST /api/quote-composers/{id}/items
pub async fn add_item(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let list = app_state.composers.get(session_id).await?;
    let result = list.add().await?;

    let status = match result {
        AddOutcome::Added { .. } => StatusCode::CREATED,
        AddOutcome::Skipped { .. } => StatusCode::OK,
    };
    Ok((status, Json(AddItemResponse { result, view: list.view().await? })))
}

// DELETE /api/quote-composers/{id}/items/{item_id}
pub async fn remove_item(
    State(app_state): State<AppState>,
    Path((session_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let list = app_state.composers.get(session_id).await?;
    list.remove(item_id).await?;
    Ok(Json(list.view().await?))
}
