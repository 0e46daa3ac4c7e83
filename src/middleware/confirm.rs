// src/middleware/confirm.rs

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

// Cabeçalho que o frontend envia depois que o usuário clica em "Excluir" no diálogo
const CONFIRM_HEADER: &str = "x-confirm";

// Extrator da confirmação explícita de ações destrutivas.
// Cabeçalho ausente ou com qualquer outro valor conta como "não confirmado".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation(pub bool);

impl<S> FromRequestParts<S> for Confirmation
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let confirmed = parts
            .headers
            .get(CONFIRM_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "sim"))
            .unwrap_or(false);

        Ok(Confirmation(confirmed))
    }
}
