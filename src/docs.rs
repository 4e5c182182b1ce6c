// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Revenue Insights API", description = "Dashboard de receita, consultas SQL e assistente NL -> SQL"),
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Dashboard ---
        handlers::dashboard::get_executive,
        handlers::dashboard::get_skills,
        handlers::dashboard::get_designations,
        handlers::dashboard::get_time,
        handlers::dashboard::get_managers,

        // --- Query ---
        handlers::query::execute_sql,
        handlers::query::get_schema,

        // --- Assistant ---
        handlers::assistant::ask,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- DASHBOARD ---
            models::revenue::SnapshotInfo,
            models::dashboard::GroupTotal,
            models::dashboard::ParetoPoint,
            models::dashboard::TopEntry,
            models::dashboard::ClientEntry,
            models::dashboard::ExecutiveOverview,
            models::dashboard::PieSlice,
            models::dashboard::HeatmapCell,
            models::dashboard::SkillOverview,
            models::dashboard::DesignationEntry,
            models::dashboard::DesignationOverview,
            models::dashboard::MonthlyEntry,
            models::dashboard::TimeOverview,
            models::dashboard::QuarterBreakdown,
            models::dashboard::ManagerQuarterly,
            models::dashboard::ManagerOverview,

            // --- Query ---
            models::query::SqlQueryPayload,
            models::query::SqlQueryResponse,
            models::query::ColumnInfo,
            models::query::ForeignKeyInfo,
            models::query::IndexInfo,
            models::query::TableSchema,
            models::query::SchemaInfo,

            // --- Assistant ---
            models::assistant::AskQuestionPayload,
            models::assistant::ChatAnswer,
            models::assistant::ChatReply,
        )
    ),
    tags(
        (name = "Health", description = "Estado do serviço"),
        (name = "Dashboard", description = "Indicadores e Gráficos de Receita"),
        (name = "Query", description = "Consultas SQL somente leitura"),
        (name = "Assistant", description = "Perguntas em linguagem natural")
    )
)]
pub struct ApiDoc;
