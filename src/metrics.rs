// 📊 Metrics - role KPIs, flagged-clients listing, chart series
// Pure aggregations over an already-filtered slice of records

use crate::filters::Role;
use crate::record::ClientRecord;
use crate::rules::{self, RiskRule, Severity, STRESS_INDEX_LIMIT};
use serde::{Deserialize, Serialize};

// ============================================================================
// ROLE KPIs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachKpis {
    pub total_clients: usize,
    /// Any of high debt, low savings, high stress
    pub high_risk_clients: usize,
    /// Percentage, 0-100
    pub risk_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientKpis {
    pub client_id: String,
    pub net_income: f64,
    pub wellness_score: f64,
    pub stress_index: f64,
    pub recommendations: Vec<PersonalRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminKpis {
    pub total_clients: usize,
    pub avg_wellness_score: f64,
    /// Stress index above the limit only
    pub high_risk_clients: usize,
    pub avg_debt_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunderKpis {
    pub clients_served: usize,
    pub avg_wellness_score: f64,
    /// `70 - mean stress`, in points
    pub stress_reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleKpis {
    Coach(CoachKpis),
    Client(ClientKpis),
    Admin(AdminKpis),
    Funder(FunderKpis),
    /// Filters left nothing to summarize
    NoData,
}

/// Short nudge shown on the client's own overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecommendation {
    pub severity: Severity,
    pub message: String,
}

pub fn role_kpis(role: Role, records: &[ClientRecord]) -> RoleKpis {
    if records.is_empty() {
        return RoleKpis::NoData;
    }

    match role {
        Role::Coach => RoleKpis::Coach(coach_kpis(records)),
        Role::Client => RoleKpis::Client(client_kpis(&records[0])),
        Role::Admin => RoleKpis::Admin(admin_kpis(records)),
        Role::Funder => RoleKpis::Funder(funder_kpis(records)),
    }
}

pub fn coach_kpis(records: &[ClientRecord]) -> CoachKpis {
    let total_clients = records.len();
    let high_risk_clients = records.iter().filter(|r| is_coach_high_risk(r)).count();

    let risk_rate = if total_clients == 0 {
        0.0
    } else {
        high_risk_clients as f64 / total_clients as f64 * 100.0
    };

    CoachKpis {
        total_clients,
        high_risk_clients,
        risk_rate,
    }
}

/// Coach overview counts debt, savings and stress only; negative worth
/// shows up in the flagged listing but not in this KPI.
fn is_coach_high_risk(record: &ClientRecord) -> bool {
    [RiskRule::HighDebt, RiskRule::LowSavings, RiskRule::HighStress]
        .iter()
        .any(|rule| rule.fires(record))
}

pub fn client_kpis(record: &ClientRecord) -> ClientKpis {
    ClientKpis {
        client_id: record.client_id.clone(),
        net_income: record.net_income,
        wellness_score: record.financial_wellness_score,
        stress_index: record.financial_stress_index,
        recommendations: personal_recommendations(record),
    }
}

pub fn personal_recommendations(record: &ClientRecord) -> Vec<PersonalRecommendation> {
    let mut out = Vec::new();

    if RiskRule::LowSavings.fires(record) {
        out.push(PersonalRecommendation {
            severity: Severity::Info,
            message: "Try saving at least 10% of your monthly income".to_string(),
        });
    }
    if RiskRule::HighDebt.fires(record) {
        out.push(PersonalRecommendation {
            severity: Severity::Warning,
            message: "Consider reducing your debt burden".to_string(),
        });
    }
    if RiskRule::HighStress.fires(record) {
        out.push(PersonalRecommendation {
            severity: Severity::Error,
            message: "Focus on stress management and financial planning".to_string(),
        });
    }

    out
}

pub fn admin_kpis(records: &[ClientRecord]) -> AdminKpis {
    AdminKpis {
        total_clients: records.len(),
        avg_wellness_score: mean(records.iter().map(|r| r.financial_wellness_score)),
        high_risk_clients: records
            .iter()
            .filter(|r| RiskRule::HighStress.fires(r))
            .count(),
        avg_debt_ratio: mean(records.iter().map(|r| r.debt_to_income)),
    }
}

pub fn funder_kpis(records: &[ClientRecord]) -> FunderKpis {
    FunderKpis {
        clients_served: records.len(),
        avg_wellness_score: mean(records.iter().map(|r| r.financial_wellness_score)),
        stress_reduction: STRESS_INDEX_LIMIT
            - mean(records.iter().map(|r| r.financial_stress_index)),
    }
}

/// Arithmetic mean, 0.0 for an empty input
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ============================================================================
// FLAGGED CLIENTS
// ============================================================================

/// One row of the flagged-clients listing / CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRow {
    #[serde(rename = "Client_ID")]
    pub client_id: String,

    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "Debt_to_Income")]
    pub debt_to_income: f64,

    #[serde(rename = "Savings_to_Income")]
    pub savings_to_income: f64,

    #[serde(rename = "Financial_Stress_Index")]
    pub financial_stress_index: f64,

    #[serde(rename = "Risk_Tags")]
    pub risk_tags: String,
}

impl FlaggedRow {
    pub const HEADERS: [&'static str; 6] = [
        "Client_ID",
        "Region",
        "Debt_to_Income",
        "Savings_to_Income",
        "Financial_Stress_Index",
        "Risk_Tags",
    ];
}

/// Flagged clients only, highest stress first. Ties keep input order.
pub fn flagged_report(records: &[ClientRecord]) -> Vec<FlaggedRow> {
    let mut rows: Vec<FlaggedRow> = records
        .iter()
        .filter_map(|record| {
            let tags = rules::risk_tags(record);
            if tags.is_empty() {
                return None;
            }
            Some(FlaggedRow {
                client_id: record.client_id.clone(),
                region: record.region.clone(),
                debt_to_income: record.debt_to_income,
                savings_to_income: record.savings_to_income,
                financial_stress_index: record.financial_stress_index,
                risk_tags: rules::join_tags(&tags),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.financial_stress_index.total_cmp(&a.financial_stress_index));

    tracing::debug!(
        total = records.len(),
        flagged = rows.len(),
        "built flagged clients report"
    );

    rows
}

// ============================================================================
// SCATTER CHART
// ============================================================================

/// Y-axis choices for the "Net Income vs ..." chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ChartMetric {
    TotalExpenses,
    FinancialWellnessScore,
    FinancialStressIndex,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 3] = [
        ChartMetric::TotalExpenses,
        ChartMetric::FinancialWellnessScore,
        ChartMetric::FinancialStressIndex,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            ChartMetric::TotalExpenses => "Total_Expenses",
            ChartMetric::FinancialWellnessScore => "Financial_Wellness_Score",
            ChartMetric::FinancialStressIndex => "Financial_Stress_Index",
        }
    }

    pub fn label(&self) -> String {
        self.column().replace('_', " ")
    }

    pub fn value(&self, record: &ClientRecord) -> f64 {
        match self {
            ChartMetric::TotalExpenses => record.total_expenses(),
            ChartMetric::FinancialWellnessScore => record.financial_wellness_score,
            ChartMetric::FinancialStressIndex => record.financial_stress_index,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChartMetric::TotalExpenses => ChartMetric::FinancialWellnessScore,
            ChartMetric::FinancialWellnessScore => ChartMetric::FinancialStressIndex,
            ChartMetric::FinancialStressIndex => ChartMetric::TotalExpenses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub spending_pattern: String,
    /// (net income, metric value)
    pub points: Vec<(f64, f64)>,
}

/// Net income vs `metric`, one series per spending pattern in first-seen order.
pub fn scatter_series(records: &[ClientRecord], metric: ChartMetric) -> Vec<ScatterSeries> {
    let mut series: Vec<ScatterSeries> = Vec::new();

    for record in records {
        let point = (record.net_income, metric.value(record));
        match series
            .iter_mut()
            .find(|s| s.spending_pattern == record.spending_pattern)
        {
            Some(existing) => existing.points.push(point),
            None => series.push(ScatterSeries {
                spending_pattern: record.spending_pattern.clone(),
                points: vec![point],
            }),
        }
    }

    series
}

/// (min, max) over all points of all series, per axis. Degenerate ranges are
/// widened by one unit so chart axes never collapse.
pub fn chart_bounds(series: &[ScatterSeries]) -> ([f64; 2], [f64; 2]) {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];

    for (px, py) in series.iter().flat_map(|s| s.points.iter()) {
        x = [x[0].min(*px), x[1].max(*px)];
        y = [y[0].min(*py), y[1].max(*py)];
    }

    (widen(x), widen(y))
}

fn widen(range: [f64; 2]) -> [f64; 2] {
    if !range[0].is_finite() || !range[1].is_finite() {
        return [0.0, 1.0];
    }
    if range[0] == range[1] {
        return [range[0] - 1.0, range[1] + 1.0];
    }
    range
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, stress: f64) -> ClientRecord {
        ClientRecord {
            client_id: id.to_string(),
            region: "Khomas".to_string(),
            spending_pattern: "Balanced".to_string(),
            net_income: 10_000.0,
            expenses_fixed: 3_000.0,
            expenses_variable: 2_000.0,
            expenses_discretionary: 1_000.0,
            net_worth: 20_000.0,
            debt_to_income: 0.2,
            savings_to_income: 0.3,
            financial_stress_index: stress,
            happiness_index: 60.0,
            financial_wellness_score: 70.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_coach_kpis_ignore_negative_worth() {
        let records = vec![
            client("A", 80.0),
            ClientRecord {
                net_worth: -10.0,
                ..client("B", 10.0)
            },
            ClientRecord {
                debt_to_income: 0.7,
                ..client("C", 10.0)
            },
            client("D", 10.0),
        ];

        let kpis = coach_kpis(&records);

        assert_eq!(kpis.total_clients, 4);
        assert_eq!(kpis.high_risk_clients, 2);
        assert_eq!(kpis.risk_rate, 50.0);
    }

    #[test]
    fn test_role_kpis_empty_is_no_data() {
        for role in Role::ALL {
            assert_eq!(role_kpis(role, &[]), RoleKpis::NoData);
        }
    }

    #[test]
    fn test_admin_and_funder_kpis() {
        let records = vec![
            ClientRecord {
                financial_wellness_score: 50.0,
                debt_to_income: 0.4,
                ..client("A", 90.0)
            },
            ClientRecord {
                financial_wellness_score: 70.0,
                debt_to_income: 0.2,
                ..client("B", 30.0)
            },
        ];

        let admin = admin_kpis(&records);
        assert_eq!(admin.total_clients, 2);
        assert_eq!(admin.avg_wellness_score, 60.0);
        assert_eq!(admin.high_risk_clients, 1);
        assert!((admin.avg_debt_ratio - 0.3).abs() < 1e-9);

        let funder = funder_kpis(&records);
        assert_eq!(funder.clients_served, 2);
        assert_eq!(funder.stress_reduction, 10.0);
    }

    #[test]
    fn test_client_kpis_recommendations_order() {
        let record = ClientRecord {
            savings_to_income: 0.02,
            debt_to_income: 0.9,
            ..client("A", 85.0)
        };

        let kpis = client_kpis(&record);
        let severities: Vec<Severity> = kpis.recommendations.iter().map(|r| r.severity).collect();

        assert_eq!(
            severities,
            vec![Severity::Info, Severity::Warning, Severity::Error]
        );
        assert!(client_kpis(&client("B", 10.0)).recommendations.is_empty());
    }

    #[test]
    fn test_flagged_report_sorted_by_stress_desc() {
        let records = vec![
            client("calm", 20.0),
            client("tense", 75.0),
            ClientRecord {
                net_worth: -1.0,
                ..client("underwater", 30.0)
            },
            client("panicked", 95.0),
            // Over budget only: advisory, not flagged
            ClientRecord {
                expenses_discretionary: 50_000.0,
                ..client("overspender", 50.0)
            },
        ];

        let rows = flagged_report(&records);
        let ids: Vec<&str> = rows.iter().map(|r| r.client_id.as_str()).collect();

        assert_eq!(ids, vec!["panicked", "tense", "underwater"]);
        assert_eq!(rows[2].risk_tags, "Negative Worth");
        assert_eq!(rows[0].risk_tags, "High Stress");
    }

    #[test]
    fn test_flagged_report_ties_keep_input_order() {
        let records = vec![
            ClientRecord {
                net_worth: -1.0,
                ..client("first", 50.0)
            },
            ClientRecord {
                net_worth: -1.0,
                ..client("second", 50.0)
            },
        ];

        let rows = flagged_report(&records);
        assert_eq!(rows[0].client_id, "first");
        assert_eq!(rows[1].client_id, "second");
    }

    #[test]
    fn test_scatter_series_groups_by_pattern() {
        let records = vec![
            client("A", 10.0),
            ClientRecord {
                spending_pattern: "Impulsive".to_string(),
                net_income: 5_000.0,
                ..client("B", 60.0)
            },
            client("C", 30.0),
        ];

        let series = scatter_series(&records, ChartMetric::FinancialStressIndex);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].spending_pattern, "Balanced");
        assert_eq!(series[0].points, vec![(10_000.0, 10.0), (10_000.0, 30.0)]);
        assert_eq!(series[1].points, vec![(5_000.0, 60.0)]);

        let totals = scatter_series(&records[..1], ChartMetric::TotalExpenses);
        assert_eq!(totals[0].points, vec![(10_000.0, 6_000.0)]);
    }

    #[test]
    fn test_chart_bounds() {
        assert_eq!(chart_bounds(&[]), ([0.0, 1.0], [0.0, 1.0]));

        let series = scatter_series(&[client("A", 40.0)], ChartMetric::FinancialStressIndex);
        assert_eq!(chart_bounds(&series), ([9_999.0, 10_001.0], [39.0, 41.0]));
    }

    #[test]
    fn test_chart_metric_labels() {
        assert_eq!(ChartMetric::TotalExpenses.label(), "Total Expenses");
        assert_eq!(ChartMetric::FinancialStressIndex.next(), ChartMetric::TotalExpenses);
    }
}
