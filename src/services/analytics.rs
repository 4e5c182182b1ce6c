//! Agregações de receita em memória.
//!
//! Tudo aqui é puro: recebe linhas (ou grupos já agregados) e devolve novos
//! vetores. Nenhuma função faz IO nem guarda estado entre chamadas.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::models::{
    dashboard::{GroupTotal, ManagerQuarterly, MonthlyEntry, ParetoPoint, QuarterBreakdown},
    revenue::RevenueRow,
};

pub const OTHERS_KEY: &str = "Others";
pub const UNASSIGNED_KEY: &str = "Unassigned";

fn key_or_unassigned(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => UNASSIGNED_KEY.to_string(),
    }
}

/// Maior receita primeiro; empate desfeito pela chave em ordem alfabética.
pub fn sort_by_revenue_desc(groups: &mut [GroupTotal]) {
    groups.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.key.cmp(&b.key))
    });
}

fn into_sorted_groups(map: HashMap<String, (f64, usize)>) -> Vec<GroupTotal> {
    let mut groups: Vec<GroupTotal> = map
        .into_iter()
        .map(|(key, (revenue, count))| GroupTotal { key, revenue, count })
        .collect();
    sort_by_revenue_desc(&mut groups);
    groups
}

/// Soma a receita por chave. Chaves vazias caem em "Unassigned", então a soma
/// dos grupos é sempre a soma da entrada.
pub fn group_by<F>(rows: &[RevenueRow], key_of: F) -> Vec<GroupTotal>
where
    F: Fn(&RevenueRow) -> Option<&str>,
{
    let mut map: HashMap<String, (f64, usize)> = HashMap::new();

    for row in rows {
        let entry = map.entry(key_or_unassigned(key_of(row))).or_default();
        entry.0 += row.revenue();
        entry.1 += 1;
    }

    into_sorted_groups(map)
}

/// Campo com vários valores separados por vírgula ("Scala, DevOps").
/// A receita inteira da linha vai para cada valor distinto: dupla contagem
/// proposital.
pub fn group_by_multi_valued<F>(rows: &[RevenueRow], values_of: F) -> Vec<GroupTotal>
where
    F: Fn(&RevenueRow) -> Option<&str>,
{
    let mut map: HashMap<String, (f64, usize)> = HashMap::new();

    for row in rows {
        let revenue = row.revenue();

        let mut values: Vec<&str> = Vec::new();
        for value in values_of(row).unwrap_or_default().split(',').map(str::trim) {
            if !value.is_empty() && !values.contains(&value) {
                values.push(value);
            }
        }
        if values.is_empty() {
            values.push(UNASSIGNED_KEY);
        }

        for value in values {
            let entry = map.entry(value.to_string()).or_default();
            entry.0 += revenue;
            entry.1 += 1;
        }
    }

    into_sorted_groups(map)
}

/// Mantém os `n` primeiros e junta a cauda num único balde "Others".
pub fn top_n_with_others(mut groups: Vec<GroupTotal>, n: usize) -> Vec<GroupTotal> {
    if groups.len() <= n {
        return groups;
    }

    let tail = groups.split_off(n);
    let others = tail.iter().fold(
        GroupTotal {
            key: OTHERS_KEY.to_string(),
            revenue: 0.0,
            count: 0,
        },
        |mut acc, g| {
            acc.revenue += g.revenue;
            acc.count += g.count;
            acc
        },
    );
    groups.push(others);
    groups
}

/// Soma na mesma ordem usada pelo acumulado da curva de Pareto.
pub fn total_of(groups: &[GroupTotal]) -> f64 {
    groups.iter().fold(0.0, |acc, g| acc + g.revenue)
}

/// Acumulado e % acumulado, na ordem recebida. Vazio quando não há grupos ou
/// o total não é positivo.
pub fn pareto(groups: &[GroupTotal]) -> Vec<ParetoPoint> {
    let total = total_of(groups);
    if groups.is_empty() || total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    groups
        .iter()
        .map(|g| {
            cumulative += g.revenue;
            ParetoPoint {
                key: g.key.clone(),
                revenue: g.revenue,
                cumulative,
                cumulative_pct: cumulative / total * 100.0,
            }
        })
        .collect()
}

/// Índice Herfindahl-Hirschman (0..1). `None` quando o total não é positivo.
pub fn concentration_index(groups: &[GroupTotal]) -> Option<f64> {
    let total = total_of(groups);
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    Some(groups.iter().map(|g| (g.revenue / total).powi(2)).sum())
}

pub fn share_pct(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Variação percentual; `None` se não houver base de comparação.
pub fn growth_pct(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Desvio padrão populacional sobre a média, em %.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return None;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean * 100.0)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Receita por mês, em ordem cronológica. Linhas sem mês ficam de fora.
pub fn monthly_totals(rows: &[RevenueRow]) -> Vec<(NaiveDate, f64)> {
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        if let Some(month) = row.month {
            *months.entry(month_start(month)).or_default() += row.revenue();
        }
    }
    months.into_iter().collect()
}

pub fn month_over_month(monthly: &[(NaiveDate, f64)]) -> Vec<MonthlyEntry> {
    monthly
        .iter()
        .enumerate()
        .map(|(idx, (month, revenue))| {
            let growth = idx
                .checked_sub(1)
                .and_then(|prev| growth_pct(*revenue, monthly[prev].1));

            MonthlyEntry {
                month: month.format("%Y-%m").to_string(),
                label: month.format("%b").to_string(),
                revenue: *revenue,
                growth,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Quarter::Q1,
            4..=6 => Quarter::Q2,
            7..=9 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }
}

impl QuarterBreakdown {
    pub fn add(&mut self, quarter: Option<Quarter>, revenue: f64) {
        let slot = match quarter {
            Some(Quarter::Q1) => &mut self.q1,
            Some(Quarter::Q2) => &mut self.q2,
            Some(Quarter::Q3) => &mut self.q3,
            Some(Quarter::Q4) => &mut self.q4,
            None => &mut self.undated,
        };
        *slot += revenue;
    }

    pub fn merge(&mut self, other: &QuarterBreakdown) {
        self.q1 += other.q1;
        self.q2 += other.q2;
        self.q3 += other.q3;
        self.q4 += other.q4;
        self.undated += other.undated;
    }
}

/// Receita por chave e trimestre do ano, ordenado pelo total.
pub fn quarterly_by<F>(rows: &[RevenueRow], key_of: F) -> Vec<ManagerQuarterly>
where
    F: Fn(&RevenueRow) -> Option<&str>,
{
    let mut map: HashMap<String, QuarterBreakdown> = HashMap::new();
    for row in rows {
        map.entry(key_or_unassigned(key_of(row)))
            .or_default()
            .add(row.month.map(Quarter::of), row.revenue());
    }

    let mut entries: Vec<ManagerQuarterly> = map
        .into_iter()
        .map(|(manager, quarters)| ManagerQuarterly {
            revenue: quarters.total(),
            manager,
            quarters,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.manager.cmp(&b.manager))
    });
    entries
}

/// Receita por (ano, trimestre) em ordem cronológica.
pub fn calendar_quarters(rows: &[RevenueRow]) -> Vec<((i32, Quarter), f64)> {
    let mut quarters: BTreeMap<(i32, Quarter), f64> = BTreeMap::new();
    for row in rows {
        if let Some(month) = row.month {
            *quarters
                .entry((month.year(), Quarter::of(month)))
                .or_default() += row.revenue();
        }
    }
    quarters.into_iter().collect()
}

/// Crescimento do último trimestre com dados sobre o anterior.
pub fn quarter_over_quarter(quarters: &[((i32, Quarter), f64)]) -> Option<f64> {
    match quarters {
        [.., (_, previous), (_, latest)] => growth_pct(*latest, *previous),
        _ => None,
    }
}

/// "47D_Disney Streaming - Media" -> "Disney Streaming"
pub fn short_client_name(full_name: &str) -> String {
    let without_prefix = full_name.strip_prefix("47D_").unwrap_or(full_name);
    let short = without_prefix.split('-').next().unwrap_or_default().trim();
    if short.is_empty() {
        full_name.trim().to_string()
    } else {
        short.to_string()
    }
}
