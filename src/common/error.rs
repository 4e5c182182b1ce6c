use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // SQL recusado pela guarda (não chegou ao banco)
    #[error("SQL validation failed: {0}")]
    InvalidQuery(String),

    #[error("Missing value for query parameter ':{0}'")]
    MissingParameter(String),

    // O SQL do usuário chegou ao banco e falhou lá (sintaxe, coluna inexistente...)
    #[error("Database error: {0}")]
    QueryFailed(String),

    // Variante para erros de infraestrutura do banco
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ref e @ (AppError::InvalidQuery(_)
            | AppError::MissingParameter(_)
            | AppError::QueryFailed(_)) => {
                tracing::warn!("Consulta SQL recusada: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe uma genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_errors_map_to_bad_request() {
        let response = AppError::InvalidQuery("Only SELECT queries are allowed".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::MissingParameter("client".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("pool exploded")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
