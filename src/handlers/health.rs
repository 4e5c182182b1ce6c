// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    #[schema(example = "OK")]
    pub status: String,
    pub database: bool,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço no ar (o banco pode estar fora)", body = HealthStatus)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let database = sqlx::query("SELECT 1")
        .execute(&app_state.db_pool)
        .await
        .map_err(|e| tracing::warn!("Health check sem banco: {}", e))
        .is_ok();

    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "OK".to_string(),
            database,
        }),
    )
}
