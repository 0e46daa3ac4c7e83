use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação. Os gateways, os serviços e os handlers falam todos este tipo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantidade inválida: '{0}'")]
    InvalidQuantity(String),

    #[error("Valor unitário inválido: '{0}'")]
    InvalidUnitPrice(String),

    #[error("Valor fora do limite permitido: {0}")]
    AmountOutOfRange(String),

    #[error("Sessão de orçamento não encontrada")]
    SessionNotFound,

    #[error("Ordem de serviço não encontrada")]
    WorkOrderNotFound,

    // Carrega o texto do aviso que o usuário precisa confirmar
    #[error("Confirmação necessária: {0}")]
    ConfirmationRequired(String),

    #[error("Já existe uma operação em andamento")]
    MutationPending,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ConfirmationRequired(prompt) => {
                let body = Json(json!({
                    "error": "Esta ação precisa ser confirmada.",
                    "prompt": prompt,
                }));
                return (StatusCode::PRECONDITION_REQUIRED, body).into_response();
            }
            ref e @ (AppError::InvalidQuantity(_)
            | AppError::InvalidUnitPrice(_)
            | AppError::AmountOutOfRange(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::SessionNotFound => (StatusCode::NOT_FOUND, "Sessão de orçamento não encontrada.".to_string()),
            AppError::WorkOrderNotFound => (StatusCode::NOT_FOUND, "Ordem de serviço não encontrada.".to_string()),
            AppError::MutationPending => (StatusCode::CONFLICT, "Aguarde a operação em andamento terminar.".to_string()),

            // DatabaseError e InternalServerError viram 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
