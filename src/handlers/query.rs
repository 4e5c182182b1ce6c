// src/handlers/query.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::query::{SchemaInfo, SqlQueryPayload, SqlQueryResponse},
};

// POST /api/query/sql
#[utoipa::path(
    post,
    path = "/api/query/sql",
    tag = "Query",
    request_body = SqlQueryPayload,
    responses(
        (status = 200, description = "Linhas retornadas pela consulta", body = SqlQueryResponse),
        (status = 400, description = "SQL recusado pela guarda ou inválido no banco")
    )
)]
pub async fn execute_sql(
    State(app_state): State<AppState>,
    Json(payload): Json<SqlQueryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state
        .query_service
        .execute_sql(&payload.query, payload.parameters.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/schema
#[utoipa::path(
    get,
    path = "/api/schema",
    tag = "Query",
    responses(
        (status = 200, description = "Tabelas públicas: colunas, chaves primárias e estrangeiras, índices", body = SchemaInfo)
    )
)]
pub async fn get_schema(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let schema = app_state.query_service.schema().await?;
    Ok((StatusCode::OK, Json(schema)))
}
