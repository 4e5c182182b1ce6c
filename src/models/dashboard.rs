// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::revenue::SnapshotInfo;

// Bloco básico de todas as agregações: chave, soma e quantidade de linhas
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    #[schema(example = "Disney Streaming")]
    pub key: String,
    #[schema(example = 152340.5)]
    pub revenue: f64,
    #[schema(example = 42)]
    pub count: usize,
}

// Ponto da curva de Pareto (80/20)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParetoPoint {
    pub key: String,
    pub revenue: f64,
    pub cumulative: f64,
    #[schema(example = 75.0)]
    pub cumulative_pct: f64,
}

// Maior participante de um ranking, com sua fatia do total
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub name: String,
    pub revenue: f64,
    pub share_pct: f64,
}

// =============================================================================
//  EXECUTIVO (/executive)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientEntry {
    #[schema(example = "Disney Streaming")]
    pub name: String, // Nome curto para o eixo do gráfico
    #[schema(example = "47D_Disney Streaming - Media")]
    pub full_name: String,
    pub revenue: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveOverview {
    pub source: SnapshotInfo,
    pub total_revenue: f64,
    pub client_count: usize,
    pub avg_revenue_per_client: f64,
    pub top_client: Option<TopEntry>,
    pub top5_share_pct: f64,
    // HHI na escala 0..10000
    #[schema(example = 1850.0)]
    pub concentration_hhi: Option<f64>,
    pub long_tail_share_pct: f64,
    pub clients: Vec<ClientEntry>,
    pub pareto: Vec<ParetoPoint>,
}

// =============================================================================
//  SKILLS (/skills)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub skill: String,
    // Receita relativa à skill líder (0..100)
    pub intensity: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillOverview {
    pub source: SnapshotInfo,
    // Soma com dupla contagem: uma linha com N skills conta N vezes
    pub skill_attributed_revenue: f64,
    pub top_skill: Option<TopEntry>,
    // HHI na escala 0..100
    pub skill_dependency: Option<f64>,
    pub skills: Vec<GroupTotal>,
    pub pie: Vec<PieSlice>,
    pub heatmap: Vec<HeatmapCell>,
}

// =============================================================================
//  CARGOS (/designations)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignationEntry {
    #[schema(example = "Senior Software Engineer")]
    pub designation: String,
    pub revenue: f64,
    pub count: usize,
    pub avg_revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignationOverview {
    pub source: SnapshotInfo,
    pub total_revenue: f64,
    pub total_count: usize,
    pub avg_revenue_per_role: f64,
    pub top_role: Option<TopEntry>,
    // Média das médias por cargo
    pub avg_efficiency: f64,
    pub designations: Vec<DesignationEntry>,
}

// =============================================================================
//  TEMPO (/time)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    #[schema(example = "2025-03")]
    pub month: String,
    #[schema(example = "Mar")]
    pub label: String,
    pub revenue: f64,
    // Variação % sobre o mês anterior; nula no primeiro mês ou se o anterior for zero
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeOverview {
    pub source: SnapshotInfo,
    pub latest_month: Option<MonthlyEntry>,
    pub mom_growth: Option<f64>,
    pub best_month: Option<MonthlyEntry>,
    pub volatility_pct: f64,
    pub months: Vec<MonthlyEntry>,
}

// =============================================================================
//  GERENTES (/managers)
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuarterBreakdown {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
    // Linhas sem mês informado
    pub undated: f64,
}

impl QuarterBreakdown {
    pub fn total(&self) -> f64 {
        self.q1 + self.q2 + self.q3 + self.q4 + self.undated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerQuarterly {
    pub manager: String,
    pub quarters: QuarterBreakdown,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerOverview {
    pub source: SnapshotInfo,
    pub quarter_totals: QuarterBreakdown,
    // Último trimestre (ano, trimestre) contra o anterior
    pub qoq_growth: Option<f64>,
    pub top_manager: Option<TopEntry>,
    pub stability_score: f64,
    // Ordenado por receita total, maior primeiro
    pub managers: Vec<ManagerQuarterly>,
}
