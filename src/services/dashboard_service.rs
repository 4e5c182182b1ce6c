// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::RevenueRepository,
    models::{
        dashboard::{
            ClientEntry, DesignationEntry, DesignationOverview, ExecutiveOverview, GroupTotal,
            HeatmapCell, ManagerOverview, MonthlyEntry, PieSlice, QuarterBreakdown, SkillOverview,
            TimeOverview, TopEntry,
        },
        revenue::{RevenueRow, RevenueSnapshot},
    },
    services::analytics::{
        calendar_quarters, coefficient_of_variation, concentration_index, group_by,
        group_by_multi_valued, month_over_month, monthly_totals, pareto, quarter_over_quarter,
        quarterly_by, share_pct, short_client_name, top_n_with_others, total_of, OTHERS_KEY,
    },
};

// Densidade dos gráficos (mesma das telas)
pub const TOP_CLIENTS: usize = 10;
pub const HEAD_CLIENTS: usize = 5;
pub const PIE_SLICES: usize = 6;
pub const HEATMAP_CELLS: usize = 8;

#[derive(Clone)]
pub struct DashboardService {
    repo: RevenueRepository,
}

impl DashboardService {
    pub fn new(repo: RevenueRepository) -> Self {
        Self { repo }
    }

    /// Uma carga por requisição. Falha nunca sobe: vira snapshot vazio.
    pub async fn snapshot(&self) -> RevenueSnapshot {
        snapshot_or_empty(self.repo.fetch_all().await)
    }

    pub async fn executive(&self) -> ExecutiveOverview {
        executive_view(&self.snapshot().await)
    }

    pub async fn skills(&self) -> SkillOverview {
        skill_view(&self.snapshot().await)
    }

    pub async fn designations(&self) -> DesignationOverview {
        designation_view(&self.snapshot().await)
    }

    pub async fn time(&self) -> TimeOverview {
        time_view(&self.snapshot().await)
    }

    pub async fn managers(&self) -> ManagerOverview {
        manager_view(&self.snapshot().await)
    }
}

pub fn snapshot_or_empty(result: Result<Vec<RevenueRow>, AppError>) -> RevenueSnapshot {
    match result {
        Ok(rows) => {
            tracing::debug!("Snapshot de receita carregado com {} linhas", rows.len());
            RevenueSnapshot::new(rows)
        }
        Err(e) => {
            tracing::error!("🔥 Falha ao carregar a tabela revenue: {:?}", e);
            RevenueSnapshot::degraded()
        }
    }
}

fn top_entry(group: &GroupTotal, name: String, total: f64) -> TopEntry {
    TopEntry {
        name,
        revenue: group.revenue,
        share_pct: share_pct(group.revenue, total),
    }
}

fn display_name(key: &str) -> String {
    if key == OTHERS_KEY {
        key.to_string()
    } else {
        short_client_name(key)
    }
}

// =============================================================================
//  EXECUTIVO
// =============================================================================

pub fn executive_view(snapshot: &RevenueSnapshot) -> ExecutiveOverview {
    let clients = group_by(snapshot.rows(), |r| r.customer.as_deref());
    // Linhas sem cliente caem em "Unassigned", então bate com a soma dos grupos
    let total_revenue = snapshot.total_revenue();
    let client_count = clients.len();

    let avg_revenue_per_client = if client_count > 0 {
        total_revenue / client_count as f64
    } else {
        0.0
    };

    let top_client = clients
        .first()
        .map(|c| top_entry(c, short_client_name(&c.key), total_revenue));

    let head: f64 = clients.iter().take(HEAD_CLIENTS).map(|c| c.revenue).sum();
    let long_tail: f64 = clients.iter().skip(HEAD_CLIENTS).map(|c| c.revenue).sum();

    // HHI sobre todos os clientes, antes de juntar a cauda
    let concentration_hhi = concentration_index(&clients).map(|hhi| hhi * 10_000.0);

    let ranked = top_n_with_others(clients, TOP_CLIENTS);

    let mut curve = pareto(&ranked);
    if curve.is_empty() && !ranked.is_empty() {
        tracing::warn!("Receita total não positiva; curva de Pareto omitida");
    }
    for point in &mut curve {
        point.key = display_name(&point.key);
    }

    let clients = ranked
        .into_iter()
        .map(|g| ClientEntry {
            name: display_name(&g.key),
            full_name: g.key,
            revenue: g.revenue,
            count: g.count,
        })
        .collect();

    ExecutiveOverview {
        source: snapshot.info(),
        total_revenue,
        client_count,
        avg_revenue_per_client,
        top_client,
        top5_share_pct: share_pct(head, total_revenue),
        concentration_hhi,
        long_tail_share_pct: share_pct(long_tail, total_revenue),
        clients,
        pareto: curve,
    }
}

// =============================================================================
//  SKILLS
// =============================================================================

pub fn skill_view(snapshot: &RevenueSnapshot) -> SkillOverview {
    let skills = group_by_multi_valued(snapshot.rows(), |r| r.skill.as_deref());
    let total = total_of(&skills);

    let top_skill = skills.first().map(|s| top_entry(s, s.key.clone(), total));
    let top_revenue = skills.first().map(|s| s.revenue).unwrap_or_default();

    let pie = skills
        .iter()
        .take(PIE_SLICES)
        .map(|s| PieSlice {
            name: s.key.clone(),
            value: s.revenue,
        })
        .collect();

    let heatmap = skills
        .iter()
        .take(HEATMAP_CELLS)
        .map(|s| HeatmapCell {
            skill: s.key.clone(),
            intensity: share_pct(s.revenue, top_revenue),
            revenue: s.revenue,
        })
        .collect();

    SkillOverview {
        source: snapshot.info(),
        skill_attributed_revenue: total,
        top_skill,
        skill_dependency: concentration_index(&skills).map(|hhi| hhi * 100.0),
        skills,
        pie,
        heatmap,
    }
}

// =============================================================================
//  CARGOS
// =============================================================================

pub fn designation_view(snapshot: &RevenueSnapshot) -> DesignationOverview {
    let groups = group_by(snapshot.rows(), |r| r.designation.as_deref());
    let total_revenue = total_of(&groups);
    let total_count: usize = groups.iter().map(|g| g.count).sum();

    let top_role = groups
        .first()
        .map(|g| top_entry(g, g.key.clone(), total_revenue));

    let designations: Vec<DesignationEntry> = groups
        .into_iter()
        .map(|g| DesignationEntry {
            avg_revenue: g.revenue / g.count.max(1) as f64,
            designation: g.key,
            revenue: g.revenue,
            count: g.count,
        })
        .collect();

    let avg_efficiency = if designations.is_empty() {
        0.0
    } else {
        designations.iter().map(|d| d.avg_revenue).sum::<f64>() / designations.len() as f64
    };

    DesignationOverview {
        source: snapshot.info(),
        total_revenue,
        total_count,
        avg_revenue_per_role: if total_count > 0 {
            total_revenue / total_count as f64
        } else {
            0.0
        },
        top_role,
        avg_efficiency,
        designations,
    }
}

// =============================================================================
//  TEMPO
// =============================================================================

pub fn time_view(snapshot: &RevenueSnapshot) -> TimeOverview {
    let months = month_over_month(&monthly_totals(snapshot.rows()));

    let latest_month = months.last().cloned();

    // Em empate fica o primeiro mês
    let best_month = months
        .iter()
        .fold(None::<&MonthlyEntry>, |best, m| match best {
            Some(b) if b.revenue >= m.revenue => Some(b),
            _ => Some(m),
        })
        .cloned();

    let revenues: Vec<f64> = months.iter().map(|m| m.revenue).collect();
    let volatility_pct = if revenues.len() > 1 {
        coefficient_of_variation(&revenues).unwrap_or_default()
    } else {
        0.0
    };

    TimeOverview {
        source: snapshot.info(),
        mom_growth: latest_month.as_ref().and_then(|m| m.growth),
        latest_month,
        best_month,
        volatility_pct,
        months,
    }
}

// =============================================================================
//  GERENTES
// =============================================================================

pub fn manager_view(snapshot: &RevenueSnapshot) -> ManagerOverview {
    let managers = quarterly_by(snapshot.rows(), |r| r.manager.as_deref());

    let quarter_totals = managers
        .iter()
        .fold(QuarterBreakdown::default(), |mut acc, m| {
            acc.merge(&m.quarters);
            acc
        });
    let total = quarter_totals.total();

    let top_manager = managers.first().map(|m| TopEntry {
        name: m.manager.clone(),
        revenue: m.revenue,
        share_pct: share_pct(m.revenue, total),
    });

    let revenues: Vec<f64> = managers.iter().map(|m| m.revenue).collect();
    let stability_score = coefficient_of_variation(&revenues)
        .map(|cv| (100.0 - cv).max(0.0))
        .unwrap_or_default();

    ManagerOverview {
        source: snapshot.info(),
        quarter_totals,
        qoq_growth: quarter_over_quarter(&calendar_quarters(snapshot.rows())),
        top_manager,
        stability_score,
        managers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(y: i32, m: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, 1)
    }

    fn revenue_row(
        customer: &str,
        designation: &str,
        skill: &str,
        manager: &str,
        when: Option<NaiveDate>,
        revenue: f64,
    ) -> RevenueRow {
        RevenueRow {
            customer: Some(customer.into()),
            designation: Some(designation.into()),
            skill: Some(skill.into()),
            manager: Some(manager.into()),
            month: when,
            actual_revenue: Some(revenue),
        }
    }

    fn fixture() -> RevenueSnapshot {
        RevenueSnapshot::new(vec![
            revenue_row("47D_Disney Streaming - Media", "Senior Engineer", "Scala, DevOps", "Ana Lima", month(2025, 1), 300.0),
            revenue_row("47D_Disney Streaming - Media", "Engineer", "Scala", "Ana Lima", month(2025, 4), 100.0),
            revenue_row("Salesforce", "Engineer", "Java", "Bruno Souza", month(2025, 4), 200.0),
            revenue_row("Norwegian - Cruise", "Architect", "DevOps", "Bruno Souza", month(2025, 5), 400.0),
        ])
    }

    #[test]
    fn failed_fetch_degrades_to_empty_views() {
        let snapshot = snapshot_or_empty(Err(AppError::QueryFailed("connection refused".into())));

        assert!(snapshot.info().degraded);

        let executive = executive_view(&snapshot);
        assert!(executive.source.degraded);
        assert!(executive.clients.is_empty());
        assert!(executive.pareto.is_empty());
        assert_eq!(executive.total_revenue, 0.0);
        assert_eq!(executive.concentration_hhi, None);

        assert!(skill_view(&snapshot).skills.is_empty());
        assert!(designation_view(&snapshot).designations.is_empty());
        assert!(time_view(&snapshot).months.is_empty());
        assert!(manager_view(&snapshot).managers.is_empty());
    }

    #[test]
    fn executive_kpis() {
        let view = executive_view(&fixture());

        assert_eq!(view.source.row_count, 4);
        assert_eq!(view.total_revenue, 1000.0);
        assert_eq!(view.client_count, 3);

        let top = view.top_client.unwrap();
        assert_eq!(top.name, "Disney Streaming");
        assert_eq!(top.share_pct, 40.0);

        let names: Vec<&str> = view.clients.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Disney Streaming", "Norwegian", "Salesforce"]);
        assert_eq!(view.clients[0].full_name, "47D_Disney Streaming - Media");

        let pct: Vec<f64> = view.pareto.iter().map(|p| p.cumulative_pct).collect();
        assert_eq!(pct, vec![40.0, 80.0, 100.0]);
        assert_eq!(view.pareto[0].key, "Disney Streaming");

        // 0.4² + 0.4² + 0.2² = 0.36
        assert!((view.concentration_hhi.unwrap() - 3600.0).abs() < 1e-6);
        assert_eq!(view.top5_share_pct, 100.0);
        assert_eq!(view.long_tail_share_pct, 0.0);
    }

    #[test]
    fn executive_collapses_long_tail() {
        let rows = (0..14)
            .map(|i| revenue_row(&format!("Client {i:02}"), "Engineer", "Rust", "Ana", None, 100.0 - i as f64))
            .collect();
        let view = executive_view(&RevenueSnapshot::new(rows));

        assert_eq!(view.client_count, 14);
        assert_eq!(view.clients.len(), TOP_CLIENTS + 1);

        let others = view.clients.last().unwrap();
        assert_eq!(others.name, OTHERS_KEY);
        assert_eq!(others.count, 4);
        // 90 + 89 + 88 + 87
        assert_eq!(others.revenue, 354.0);

        let listed: f64 = view.clients.iter().map(|c| c.revenue).sum();
        assert!((listed - view.total_revenue).abs() < 1e-9);
        assert_eq!(view.pareto.last().unwrap().cumulative_pct, 100.0);
    }

    #[test]
    fn skill_view_double_counts() {
        let view = skill_view(&fixture());

        let scala = view.skills.iter().find(|s| s.key == "Scala").unwrap();
        let devops = view.skills.iter().find(|s| s.key == "DevOps").unwrap();
        assert_eq!(scala.revenue, 400.0);
        assert_eq!(devops.revenue, 700.0);

        // 1000 de receita real, 1300 atribuídos às skills
        assert_eq!(view.skill_attributed_revenue, 1300.0);
        assert_eq!(view.top_skill.unwrap().name, "DevOps");
        assert_eq!(view.heatmap[0].intensity, 100.0);
        assert!(view.pie.len() <= PIE_SLICES);
    }

    #[test]
    fn designation_view_averages() {
        let view = designation_view(&fixture());

        let engineer = view
            .designations
            .iter()
            .find(|d| d.designation == "Engineer")
            .unwrap();
        assert_eq!(engineer.count, 2);
        assert_eq!(engineer.avg_revenue, 150.0);

        assert_eq!(view.total_count, 4);
        assert_eq!(view.avg_revenue_per_role, 250.0);
        assert_eq!(view.top_role.unwrap().name, "Architect");
        // (400 + 300 + 150) / 3
        assert!((view.avg_efficiency - 850.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn time_view_tracks_latest_and_best_month() {
        let view = time_view(&fixture());

        let labels: Vec<&str> = view.months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Apr", "May"]);

        let latest = view.latest_month.unwrap();
        assert_eq!(latest.month, "2025-05");
        assert!((view.mom_growth.unwrap() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(view.best_month.unwrap().month, "2025-05");
        assert!(view.volatility_pct > 0.0);
    }

    #[test]
    fn single_month_has_no_volatility() {
        let snapshot = RevenueSnapshot::new(vec![revenue_row("A", "E", "S", "M", month(2025, 1), 10.0)]);
        let view = time_view(&snapshot);
        assert_eq!(view.volatility_pct, 0.0);
        assert_eq!(view.mom_growth, None);
    }

    #[test]
    fn manager_view_quarters_and_qoq() {
        let view = manager_view(&fixture());

        assert_eq!(view.managers[0].manager, "Bruno Souza");
        assert_eq!(view.managers[0].quarters.q2, 600.0);
        assert_eq!(view.quarter_totals.q1, 300.0);
        assert_eq!(view.quarter_totals.q2, 700.0);

        // Q1 2025 = 300, Q2 2025 = 700
        let qoq = view.qoq_growth.unwrap();
        assert!((qoq - 400.0 / 3.0).abs() < 1e-9);

        let top = view.top_manager.unwrap();
        assert!((top.share_pct - 60.0).abs() < 1e-9);
        // totais 600 e 400: média 500, desvio 100 -> CV 20%
        assert!((view.stability_score - 80.0).abs() < 1e-9);
    }
}
