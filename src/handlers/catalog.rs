// src/handlers/catalog.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState};

// GET /api/parts
pub async fn list_parts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let parts = app_state.catalog.list_parts().await?;
    Ok(Json(parts))
}
