// src/models/revenue.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Uma linha da tabela `revenue`. Tudo é opcional porque a planilha de origem
// chega com buracos; `manager` vem de `project_manager`.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct RevenueRow {
    pub customer: Option<String>,
    pub designation: Option<String>,
    pub skill: Option<String>, // "Scala, Kotlin, DevOps"
    pub manager: Option<String>,
    pub month: Option<NaiveDate>,
    pub actual_revenue: Option<f64>,
}

impl RevenueRow {
    /// Receita utilizável da linha: ausente ou não finita conta como zero.
    pub fn revenue(&self) -> f64 {
        self.actual_revenue.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Foto imutável das linhas carregadas para uma requisição.
/// Todas as agregações recebem isto e nada mais.
#[derive(Debug, Clone, Default)]
pub struct RevenueSnapshot {
    rows: Vec<RevenueRow>,
    degraded: bool,
}

impl RevenueSnapshot {
    pub fn new(rows: Vec<RevenueRow>) -> Self {
        Self { rows, degraded: false }
    }

    /// Snapshot vazio usado quando a carga falhou.
    pub fn degraded() -> Self {
        Self { rows: Vec::new(), degraded: true }
    }

    pub fn rows(&self) -> &[RevenueRow] {
        &self.rows
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(RevenueRow::revenue).sum()
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            row_count: self.rows.len(),
            degraded: self.degraded,
        }
    }
}

// Vai junto de toda view: o front usa `degraded` no lugar do antigo "loading"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    #[schema(example = 1240)]
    pub row_count: usize,
    #[schema(example = false)]
    pub degraded: bool,
}
