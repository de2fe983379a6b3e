// 🔎 Role Filters - who sees which clients
// Boolean masking over the dataset, driven by explicit criteria instead of
// widget state

use crate::record::ClientRecord;
use crate::rules::RiskTag;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// ============================================================================
// ROLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Coach,
    Client,
    Admin,
    Funder,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Coach, Role::Client, Role::Admin, Role::Funder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coach => "Coach",
            Role::Client => "Client",
            Role::Admin => "Admin",
            Role::Funder => "Funder",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Role::Coach => Role::Client,
            Role::Client => Role::Admin,
            Role::Admin => Role::Funder,
            Role::Funder => Role::Coach,
        }
    }

    /// Coach and Admin see the flagged-clients listing
    pub fn sees_flagged_clients(&self) -> bool {
        matches!(self, Role::Coach | Role::Admin)
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics an admin can pin to the overview. Display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminMetric {
    FinancialWellness,
    StressIndex,
    DebtRatio,
    SavingsRate,
}

impl AdminMetric {
    pub fn label(&self) -> &'static str {
        match self {
            AdminMetric::FinancialWellness => "Financial Wellness",
            AdminMetric::StressIndex => "Stress Index",
            AdminMetric::DebtRatio => "Debt Ratio",
            AdminMetric::SavingsRate => "Savings Rate",
        }
    }
}

/// Categorical columns a filter can select on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Gender,
    SpendingPattern,
}

impl Dimension {
    pub fn value<'a>(&self, record: &'a ClientRecord) -> &'a str {
        match self {
            Dimension::Region => &record.region,
            Dimension::Gender => &record.gender,
            Dimension::SpendingPattern => &record.spending_pattern,
        }
    }
}

/// Distinct values of a column, in first-seen order
pub fn distinct_values(records: &[ClientRecord], dimension: Dimension) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records {
        let value = dimension.value(record);
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// An empty selection list means "every value" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub role: Role,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub genders: Vec<String>,
    /// Coach only
    #[serde(default)]
    pub spending_patterns: Vec<String>,
    /// Coach only; every selected factor must hold
    #[serde(default)]
    pub risk_factors: Vec<RiskTag>,
    /// Client only; `None` picks the first client in the dataset
    #[serde(default)]
    pub client_id: Option<String>,
    /// Admin only, display
    #[serde(default)]
    pub admin_metrics: Vec<AdminMetric>,
}

impl FilterCriteria {
    pub fn for_role(role: Role) -> Self {
        FilterCriteria {
            role,
            admin_metrics: if role == Role::Admin {
                vec![AdminMetric::FinancialWellness]
            } else {
                Vec::new()
            },
            ..Default::default()
        }
    }

    /// Apply the role's filters. Funder output carries anonymized ids.
    pub fn apply(&self, records: &[ClientRecord]) -> Vec<ClientRecord> {
        let filtered: Vec<ClientRecord> = match self.role {
            Role::Client => {
                let wanted = self
                    .client_id
                    .as_deref()
                    .or_else(|| records.first().map(|r| r.client_id.as_str()));
                records
                    .iter()
                    .filter(|r| Some(r.client_id.as_str()) == wanted)
                    .cloned()
                    .collect()
            }
            Role::Coach => records
                .iter()
                .filter(|r| self.matches_demographics(r))
                .filter(|r| selected(&self.spending_patterns, &r.spending_pattern))
                .filter(|r| self.risk_factors.iter().all(|tag| tag.rule().fires(r)))
                .cloned()
                .collect(),
            Role::Admin | Role::Funder => records
                .iter()
                .filter(|r| self.matches_demographics(r))
                .cloned()
                .collect(),
        };

        let filtered = if self.role == Role::Funder {
            filtered
                .into_iter()
                .map(|mut r| {
                    r.client_id = anonymize_id(&r.client_id);
                    r
                })
                .collect()
        } else {
            filtered
        };

        tracing::debug!(
            role = %self.role,
            input = records.len(),
            output = filtered.len(),
            "applied role filters"
        );

        filtered
    }

    fn matches_demographics(&self, record: &ClientRecord) -> bool {
        selected(&self.regions, &record.region) && selected(&self.genders, &record.gender)
    }

    /// Toggle a coach risk factor on or off. Negative Worth is not a filter.
    pub fn toggle_risk_factor(&mut self, tag: RiskTag) {
        if !RiskTag::COACH_FILTERS.contains(&tag) {
            return;
        }
        if let Some(pos) = self.risk_factors.iter().position(|t| *t == tag) {
            self.risk_factors.remove(pos);
        } else {
            self.risk_factors.push(tag);
        }
    }
}

fn selected(choices: &[String], value: &str) -> bool {
    choices.is_empty() || choices.iter().any(|c| c == value)
}

// ============================================================================
// ANONYMIZATION
// ============================================================================

/// Stable pseudonym for funder views: `Client_042`.
///
/// Derived from a SHA-256 digest so the same id maps to the same pseudonym
/// on every run. Only 1000 buckets, so collisions are possible.
pub fn anonymize_id(client_id: &str) -> String {
    let digest = Sha256::digest(client_id.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    format!("Client_{:03}", u64::from_be_bytes(prefix) % 1000)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, region: &str, gender: &str, pattern: &str) -> ClientRecord {
        ClientRecord {
            client_id: id.to_string(),
            region: region.to_string(),
            gender: gender.to_string(),
            spending_pattern: pattern.to_string(),
            net_income: 10_000.0,
            debt_to_income: 0.2,
            savings_to_income: 0.3,
            financial_stress_index: 30.0,
            net_worth: 1_000.0,
            ..Default::default()
        }
    }

    fn dataset() -> Vec<ClientRecord> {
        vec![
            record("C1", "Khomas", "Female", "Frugal"),
            ClientRecord {
                debt_to_income: 0.8,
                financial_stress_index: 85.0,
                ..record("C2", "Erongo", "Male", "Impulsive")
            },
            ClientRecord {
                debt_to_income: 0.6,
                ..record("C3", "Khomas", "Male", "Impulsive")
            },
            record("C4", "Oshana", "Female", "Balanced"),
        ]
    }

    fn ids(records: &[ClientRecord]) -> Vec<&str> {
        records.iter().map(|r| r.client_id.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let out = FilterCriteria::for_role(Role::Coach).apply(&dataset());
        assert_eq!(ids(&out), vec!["C1", "C2", "C3", "C4"]);
    }

    #[test]
    fn test_coach_demographic_and_pattern_filters() {
        let criteria = FilterCriteria {
            regions: vec!["Khomas".to_string()],
            spending_patterns: vec!["Impulsive".to_string()],
            ..FilterCriteria::for_role(Role::Coach)
        };

        assert_eq!(ids(&criteria.apply(&dataset())), vec!["C3"]);
    }

    #[test]
    fn test_coach_risk_factors_are_conjunctive() {
        let mut criteria = FilterCriteria::for_role(Role::Coach);
        criteria.toggle_risk_factor(RiskTag::HighDebt);
        assert_eq!(ids(&criteria.apply(&dataset())), vec!["C2", "C3"]);

        criteria.toggle_risk_factor(RiskTag::HighStress);
        assert_eq!(ids(&criteria.apply(&dataset())), vec!["C2"]);

        criteria.toggle_risk_factor(RiskTag::HighDebt);
        criteria.toggle_risk_factor(RiskTag::HighStress);
        assert!(criteria.risk_factors.is_empty());
    }

    #[test]
    fn test_negative_worth_toggle_is_ignored() {
        let mut criteria = FilterCriteria::for_role(Role::Coach);
        criteria.toggle_risk_factor(RiskTag::NegativeWorth);
        assert!(criteria.risk_factors.is_empty());
    }

    #[test]
    fn test_client_role_selects_one_client() {
        let criteria = FilterCriteria {
            client_id: Some("C3".to_string()),
            ..FilterCriteria::for_role(Role::Client)
        };
        assert_eq!(ids(&criteria.apply(&dataset())), vec!["C3"]);

        // Default is the first client
        let default = FilterCriteria::for_role(Role::Client).apply(&dataset());
        assert_eq!(ids(&default), vec!["C1"]);

        let unknown = FilterCriteria {
            client_id: Some("nobody".to_string()),
            ..FilterCriteria::for_role(Role::Client)
        };
        assert!(unknown.apply(&dataset()).is_empty());
    }

    #[test]
    fn test_admin_ignores_coach_only_filters() {
        let criteria = FilterCriteria {
            genders: vec!["Female".to_string()],
            spending_patterns: vec!["Impulsive".to_string()],
            risk_factors: vec![RiskTag::HighDebt],
            ..FilterCriteria::for_role(Role::Admin)
        };

        assert_eq!(ids(&criteria.apply(&dataset())), vec!["C1", "C4"]);
        assert_eq!(criteria.admin_metrics, vec![AdminMetric::FinancialWellness]);
    }

    #[test]
    fn test_funder_ids_are_anonymized() {
        let out = FilterCriteria::for_role(Role::Funder).apply(&dataset());

        assert_eq!(out.len(), 4);
        for (anon, original) in out.iter().zip(dataset()) {
            assert_eq!(anon.client_id, anonymize_id(&original.client_id));
            assert!(anon.client_id.starts_with("Client_"));
            assert_eq!(anon.client_id.len(), "Client_000".len());
            assert_eq!(anon.region, original.region);
        }
    }

    #[test]
    fn test_anonymize_is_stable() {
        assert_eq!(anonymize_id("C001"), anonymize_id("C001"));
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        assert_eq!(
            distinct_values(&dataset(), Dimension::Region),
            vec!["Khomas", "Erongo", "Oshana"]
        );
        assert_eq!(
            distinct_values(&dataset(), Dimension::Gender),
            vec!["Female", "Male"]
        );
    }

    #[test]
    fn test_role_cycle_and_lookup() {
        assert_eq!(Role::Funder.next(), Role::Coach);
        assert_eq!(Role::from_name("admin"), Some(Role::Admin));
        assert_eq!(Role::from_name("auditor"), None);
        assert!(Role::Coach.sees_flagged_clients());
        assert!(!Role::Funder.sees_flagged_clients());
    }
}
