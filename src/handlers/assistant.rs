// src/handlers/assistant.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::assistant::{AskQuestionPayload, ChatReply},
};

// POST /api/assistant/ask
#[utoipa::path(
    post,
    path = "/api/assistant/ask",
    tag = "Assistant",
    request_body = AskQuestionPayload,
    responses(
        (status = 200, description = "Resposta do assistente (escalar, tabela, vazia ou indisponível)", body = ChatReply),
        (status = 400, description = "Pergunta vazia ou longa demais")
    )
)]
pub async fn ask(
    State(app_state): State<AppState>,
    Json(payload): Json<AskQuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = app_state.assistant_service.ask(&payload.question).await;

    Ok((StatusCode::OK, Json(reply)))
}
