// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::dashboard::{
        DesignationOverview, ExecutiveOverview, ManagerOverview, SkillOverview, TimeOverview,
    },
};

// Nenhum destes handlers falha: se a carga do snapshot falhar, a view sai
// vazia com `source.degraded = true`.

// GET /api/dashboard/executive
#[utoipa::path(
    get,
    path = "/api/dashboard/executive",
    tag = "Dashboard",
    responses(
        (status = 200, description = "KPIs de receita por cliente, concentração (HHI) e curva de Pareto", body = ExecutiveOverview)
    )
)]
pub async fn get_executive(State(app_state): State<AppState>) -> impl IntoResponse {
    let view = app_state.dashboard_service.executive().await;
    (StatusCode::OK, Json(view))
}

// GET /api/dashboard/skills
#[utoipa::path(
    get,
    path = "/api/dashboard/skills",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Receita atribuída por skill (pizza e heatmap)", body = SkillOverview)
    )
)]
pub async fn get_skills(State(app_state): State<AppState>) -> impl IntoResponse {
    let view = app_state.dashboard_service.skills().await;
    (StatusCode::OK, Json(view))
}

// GET /api/dashboard/designations
#[utoipa::path(
    get,
    path = "/api/dashboard/designations",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Receita, quantidade e média por cargo", body = DesignationOverview)
    )
)]
pub async fn get_designations(State(app_state): State<AppState>) -> impl IntoResponse {
    let view = app_state.dashboard_service.designations().await;
    (StatusCode::OK, Json(view))
}

// GET /api/dashboard/time
#[utoipa::path(
    get,
    path = "/api/dashboard/time",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Série mensal, crescimento MoM e volatilidade", body = TimeOverview)
    )
)]
pub async fn get_time(State(app_state): State<AppState>) -> impl IntoResponse {
    let view = app_state.dashboard_service.time().await;
    (StatusCode::OK, Json(view))
}

// GET /api/dashboard/managers
#[utoipa::path(
    get,
    path = "/api/dashboard/managers",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Receita trimestral por gerente, QoQ e estabilidade", body = ManagerOverview)
    )
)]
pub async fn get_managers(State(app_state): State<AppState>) -> impl IntoResponse {
    let view = app_state.dashboard_service.managers().await;
    (StatusCode::OK, Json(view))
}
