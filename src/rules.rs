// 🏷️ Risk Classification Rules - Rules as Data
// Threshold rules that turn a client's financial fields into advisory
// findings (tips view) and risk tags (flagging view)

use crate::record::ClientRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Debt-to-income above this is "High Debt".
pub const DEBT_TO_INCOME_LIMIT: f64 = 0.5;

/// Savings-to-income below this is "Low Savings".
pub const SAVINGS_TO_INCOME_FLOOR: f64 = 0.1;

/// Stress index above this is "High Stress".
pub const STRESS_INDEX_LIMIT: f64 = 70.0;

/// Net worth below this is "Negative Worth".
pub const NET_WORTH_FLOOR: f64 = 0.0;

// ============================================================================
// SEVERITY
// ============================================================================

/// Display priority of a finding. Declaration order is the priority order
/// (most urgent first), so `Ord` can be used to pick the headline finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FINDINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCode {
    BudgetExceeded,
    HighDebt,
    LowSavings,
    HighStress,
    /// Synthetic: emitted only when no advisory rule fired
    OnTrack,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::BudgetExceeded => "budget-exceeded",
            FindingCode::HighDebt => "high-debt",
            FindingCode::LowSavings => "low-savings",
            FindingCode::HighStress => "high-stress",
            FindingCode::OnTrack => "on-track",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FindingCode::BudgetExceeded => Severity::Error,
            FindingCode::HighDebt => Severity::Warning,
            FindingCode::LowSavings => Severity::Info,
            FindingCode::HighStress => Severity::Warning,
            FindingCode::OnTrack => Severity::Success,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FindingCode::BudgetExceeded => "Budget Alert",
            FindingCode::HighDebt => "High Debt Load",
            FindingCode::LowSavings => "Low Savings",
            FindingCode::HighStress => "High Stress Level",
            FindingCode::OnTrack => "On Track!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FindingCode::BudgetExceeded => {
                "Your expenses exceed your income. Consider reducing discretionary spending by tracking daily expenses."
            }
            FindingCode::HighDebt => {
                "Your debt payments are high relative to income. Consider debt consolidation or speaking with a financial advisor."
            }
            FindingCode::LowSavings => {
                "Try to save at least 10% of your income. Consider setting up automatic transfers to a savings account."
            }
            FindingCode::HighStress => {
                "Your financial stress is elevated. Schedule a session with our financial wellness coach."
            }
            FindingCode::OnTrack => "You're managing your finances well. Keep up the good work!",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advisory message, ready for display or a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Finding {
    pub fn from_code(code: FindingCode) -> Self {
        Finding {
            code,
            severity: code.severity(),
            title: code.title().to_string(),
            message: code.message().to_string(),
        }
    }

    pub fn on_track() -> Self {
        Finding::from_code(FindingCode::OnTrack)
    }
}

// ============================================================================
// RISK TAGS
// ============================================================================

/// Short label for filtering/sorting flagged clients. Declaration order is
/// rule order, so a `BTreeSet<RiskTag>` iterates in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTag {
    #[serde(rename = "High Debt")]
    HighDebt,
    #[serde(rename = "Low Savings")]
    LowSavings,
    #[serde(rename = "High Stress")]
    HighStress,
    #[serde(rename = "Negative Worth")]
    NegativeWorth,
}

impl RiskTag {
    pub const ALL: [RiskTag; 4] = [
        RiskTag::HighDebt,
        RiskTag::LowSavings,
        RiskTag::HighStress,
        RiskTag::NegativeWorth,
    ];

    /// Tags a coach can filter on; Negative Worth is report-only
    pub const COACH_FILTERS: [RiskTag; 3] = [
        RiskTag::HighDebt,
        RiskTag::LowSavings,
        RiskTag::HighStress,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTag::HighDebt => "High Debt",
            RiskTag::LowSavings => "Low Savings",
            RiskTag::HighStress => "High Stress",
            RiskTag::NegativeWorth => "Negative Worth",
        }
    }

    /// The rule that produces this tag
    pub fn rule(&self) -> RiskRule {
        match self {
            RiskTag::HighDebt => RiskRule::HighDebt,
            RiskTag::LowSavings => RiskRule::LowSavings,
            RiskTag::HighStress => RiskRule::HighStress,
            RiskTag::NegativeWorth => RiskRule::NegativeWorth,
        }
    }

    /// Case-insensitive lookup by label ("high debt") or kebab form ("high-debt").
    pub fn from_label(label: &str) -> Option<RiskTag> {
        let normalized = label.trim().to_lowercase().replace(['-', '_'], " ");
        RiskTag::ALL
            .into_iter()
            .find(|tag| tag.label().to_lowercase() == normalized)
    }

    /// Like `from_label`, restricted to `COACH_FILTERS`
    pub fn coach_filter(label: &str) -> Option<RiskTag> {
        RiskTag::from_label(label).filter(|tag| RiskTag::COACH_FILTERS.contains(tag))
    }
}

impl fmt::Display for RiskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// The fixed rule table. Every rule is evaluated on every record; there is
/// no short-circuiting between rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskRule {
    BudgetExceeded,
    HighDebt,
    LowSavings,
    HighStress,
    NegativeWorth,
}

impl RiskRule {
    /// Evaluation order
    pub const ALL: [RiskRule; 5] = [
        RiskRule::BudgetExceeded,
        RiskRule::HighDebt,
        RiskRule::LowSavings,
        RiskRule::HighStress,
        RiskRule::NegativeWorth,
    ];

    /// Strict comparisons: a value sitting exactly on a threshold does not fire.
    pub fn fires(&self, record: &ClientRecord) -> bool {
        match self {
            RiskRule::BudgetExceeded => record.total_expenses() > record.net_income,
            RiskRule::HighDebt => record.debt_to_income > DEBT_TO_INCOME_LIMIT,
            RiskRule::LowSavings => record.savings_to_income < SAVINGS_TO_INCOME_FLOOR,
            RiskRule::HighStress => record.financial_stress_index > STRESS_INDEX_LIMIT,
            RiskRule::NegativeWorth => record.net_worth < NET_WORTH_FLOOR,
        }
    }

    /// Advisory finding for the tips view. Negative worth has none.
    pub fn finding_code(&self) -> Option<FindingCode> {
        match self {
            RiskRule::BudgetExceeded => Some(FindingCode::BudgetExceeded),
            RiskRule::HighDebt => Some(FindingCode::HighDebt),
            RiskRule::LowSavings => Some(FindingCode::LowSavings),
            RiskRule::HighStress => Some(FindingCode::HighStress),
            RiskRule::NegativeWorth => None,
        }
    }

    /// Tag for the flagging view. Budget-exceeded is advisory only.
    pub fn risk_tag(&self) -> Option<RiskTag> {
        match self {
            RiskRule::BudgetExceeded => None,
            RiskRule::HighDebt => Some(RiskTag::HighDebt),
            RiskRule::LowSavings => Some(RiskTag::LowSavings),
            RiskRule::HighStress => Some(RiskTag::HighStress),
            RiskRule::NegativeWorth => Some(RiskTag::NegativeWorth),
        }
    }
}

/// Rules that fired for a record, in evaluation order.
pub fn evaluate(record: &ClientRecord) -> Vec<RiskRule> {
    RiskRule::ALL
        .into_iter()
        .filter(|rule| rule.fires(record))
        .collect()
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Never empty: falls back to a single on-track finding
    pub findings: Vec<Finding>,
    pub risk_tags: BTreeSet<RiskTag>,
    pub is_flagged: bool,
}

impl ClassificationResult {
    fn from_fired(fired: &[RiskRule]) -> Self {
        let risk_tags = tags_from_fired(fired);
        ClassificationResult {
            findings: findings_from_fired(fired),
            is_flagged: !risk_tags.is_empty(),
            risk_tags,
        }
    }

    pub fn is_on_track(&self) -> bool {
        self.findings.len() == 1 && self.findings[0].code == FindingCode::OnTrack
    }

    /// Tags joined for tables and CSV: "High Debt, Low Savings"
    pub fn tag_labels(&self) -> String {
        join_tags(&self.risk_tags)
    }

    /// Most urgent severity among the findings
    pub fn headline_severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .min()
            .unwrap_or(Severity::Success)
    }
}

fn findings_from_fired(fired: &[RiskRule]) -> Vec<Finding> {
    let findings: Vec<Finding> = fired
        .iter()
        .filter_map(|rule| rule.finding_code())
        .map(Finding::from_code)
        .collect();

    if findings.is_empty() {
        vec![Finding::on_track()]
    } else {
        findings
    }
}

fn tags_from_fired(fired: &[RiskRule]) -> BTreeSet<RiskTag> {
    fired.iter().filter_map(|rule| rule.risk_tag()).collect()
}

pub fn join_tags(tags: &BTreeSet<RiskTag>) -> String {
    tags.iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// ENGINE ENTRY POINTS
// ============================================================================

/// Classify one client. Total and pure: no I/O, no validation, same input
/// always gives the same output.
pub fn classify(record: &ClientRecord) -> ClassificationResult {
    ClassificationResult::from_fired(&evaluate(record))
}

/// Tips view only (findings sequence).
pub fn advisory_findings(record: &ClientRecord) -> Vec<Finding> {
    findings_from_fired(&evaluate(record))
}

/// Flagging view only (tag set).
pub fn risk_tags(record: &ClientRecord) -> BTreeSet<RiskTag> {
    tags_from_fired(&evaluate(record))
}

pub fn is_flagged(record: &ClientRecord) -> bool {
    !risk_tags(record).is_empty()
}

/// Order-preserving, independent application of [`classify`].
pub fn classify_batch(records: &[ClientRecord]) -> Vec<ClassificationResult> {
    let results: Vec<ClassificationResult> = records.iter().map(classify).collect();

    tracing::debug!(
        records = records.len(),
        flagged = results.iter().filter(|r| r.is_flagged).count(),
        "classified batch"
    );

    results
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Healthy baseline: no rule fires
    fn healthy() -> ClientRecord {
        ClientRecord {
            client_id: "C001".to_string(),
            net_income: 1200.0,
            expenses_fixed: 600.0,
            expenses_variable: 250.0,
            expenses_discretionary: 150.0,
            net_worth: 5000.0,
            debt_to_income: 0.3,
            savings_to_income: 0.2,
            financial_stress_index: 40.0,
            happiness_index: 60.0,
            financial_wellness_score: 70.0,
            ..Default::default()
        }
    }

    fn codes(result: &ClassificationResult) -> Vec<FindingCode> {
        result.findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_healthy_client_is_on_track() {
        let result = classify(&healthy());

        assert_eq!(result.findings, vec![Finding::on_track()]);
        assert_eq!(result.findings[0].severity, Severity::Success);
        assert!(result.risk_tags.is_empty());
        assert!(!result.is_flagged);
        assert!(result.is_on_track());
    }

    #[test]
    fn test_every_rule_fires() {
        let record = ClientRecord {
            net_income: 1200.0,
            expenses_fixed: 1500.0,
            expenses_variable: 0.0,
            expenses_discretionary: 0.0,
            debt_to_income: 0.6,
            savings_to_income: 0.05,
            financial_stress_index: 80.0,
            net_worth: -200.0,
            ..healthy()
        };

        let result = classify(&record);

        assert_eq!(
            codes(&result),
            vec![
                FindingCode::BudgetExceeded,
                FindingCode::HighDebt,
                FindingCode::LowSavings,
                FindingCode::HighStress,
            ]
        );
        let severities: Vec<Severity> = result.findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info, Severity::Warning]
        );
        assert_eq!(
            result.risk_tags.iter().copied().collect::<Vec<_>>(),
            vec![
                RiskTag::HighDebt,
                RiskTag::LowSavings,
                RiskTag::HighStress,
                RiskTag::NegativeWorth,
            ]
        );
        assert!(result.is_flagged);
        assert_eq!(result.headline_severity(), Severity::Error);
    }

    #[test]
    fn test_negative_worth_flags_without_finding() {
        let record = ClientRecord {
            net_worth: -1.0,
            ..healthy()
        };

        let result = classify(&record);

        // Tips view says all good...
        assert!(result.is_on_track());
        assert_eq!(advisory_findings(&record), vec![Finding::on_track()]);

        // ...while the flagging view flags the client
        assert_eq!(
            result.risk_tags,
            BTreeSet::from([RiskTag::NegativeWorth])
        );
        assert!(result.is_flagged);
        assert!(is_flagged(&record));
    }

    #[test]
    fn test_budget_exceeded_alone_does_not_flag() {
        let record = ClientRecord {
            expenses_discretionary: 1000.0,
            ..healthy()
        };

        let result = classify(&record);

        assert_eq!(codes(&result), vec![FindingCode::BudgetExceeded]);
        assert_eq!(result.findings[0].severity, Severity::Error);
        assert!(result.risk_tags.is_empty());
        assert!(!result.is_flagged);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let record = ClientRecord {
            debt_to_income: 0.5,
            savings_to_income: 0.1,
            financial_stress_index: 70.0,
            net_worth: 0.0,
            ..healthy()
        };

        let result = classify(&record);
        assert!(result.is_on_track());
        assert!(!result.is_flagged);

        // Expenses exactly equal to income is not over budget
        let even = ClientRecord {
            net_income: 1000.0,
            ..healthy()
        };
        assert_eq!(even.total_expenses(), 1000.0);
        assert!(classify(&even).is_on_track());
    }

    #[test]
    fn test_just_past_boundaries_fire() {
        let record = ClientRecord {
            debt_to_income: 0.5001,
            savings_to_income: 0.0999,
            financial_stress_index: 70.5,
            ..healthy()
        };

        assert_eq!(
            codes(&classify(&record)),
            vec![FindingCode::HighDebt, FindingCode::LowSavings, FindingCode::HighStress]
        );
    }

    #[test]
    fn test_out_of_domain_values_do_not_panic() {
        let record = ClientRecord {
            financial_stress_index: -10.0,
            debt_to_income: 15.0,
            net_income: -500.0,
            ..healthy()
        };

        let result = classify(&record);
        assert!(result.risk_tags.contains(&RiskTag::HighDebt));
        assert!(!result.risk_tags.contains(&RiskTag::HighStress));
        assert_eq!(result.findings[0].code, FindingCode::BudgetExceeded);
    }

    #[test]
    fn test_tag_labels_follow_rule_order() {
        let record = ClientRecord {
            net_worth: -5.0,
            financial_stress_index: 99.0,
            debt_to_income: 0.9,
            ..healthy()
        };

        assert_eq!(
            classify(&record).tag_labels(),
            "High Debt, High Stress, Negative Worth"
        );
    }

    #[test]
    fn test_risk_tag_from_label() {
        assert_eq!(RiskTag::from_label("High Debt"), Some(RiskTag::HighDebt));
        assert_eq!(RiskTag::from_label("low-savings"), Some(RiskTag::LowSavings));
        assert_eq!(RiskTag::from_label(" negative_worth "), Some(RiskTag::NegativeWorth));
        assert_eq!(RiskTag::from_label("budget"), None);
    }

    #[test]
    fn test_coach_filter_excludes_negative_worth() {
        assert_eq!(RiskTag::coach_filter("high stress"), Some(RiskTag::HighStress));
        assert_eq!(RiskTag::coach_filter("Negative Worth"), None);
    }

    #[test]
    fn test_finding_serializes_with_kebab_codes() {
        let json = serde_json::to_value(Finding::from_code(FindingCode::BudgetExceeded)).unwrap();
        assert_eq!(json["code"], "budget-exceeded");
        assert_eq!(json["severity"], "error");

        let tags = serde_json::to_value(risk_tags(&ClientRecord {
            net_worth: -1.0,
            ..healthy()
        }))
        .unwrap();
        assert_eq!(tags, serde_json::json!(["Negative Worth"]));
    }

    #[test]
    fn test_batch_preserves_order() {
        let flagged = ClientRecord {
            client_id: "C002".to_string(),
            financial_stress_index: 90.0,
            ..healthy()
        };
        let records = vec![healthy(), flagged.clone(), healthy()];

        let results = classify_batch(&records);

        assert_eq!(results.len(), 3);
        assert!(!results[0].is_flagged);
        assert!(results[1].is_flagged);
        assert!(!results[2].is_flagged);
        assert_eq!(results[1], classify(&flagged));
    }

    #[test]
    fn test_classify_is_usable_across_threads() {
        let record = ClientRecord {
            debt_to_income: 0.8,
            ..healthy()
        };
        let expected = classify(&record);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let record = record.clone();
                std::thread::spawn(move || classify(&record))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    fn arb_record() -> impl Strategy<Value = ClientRecord> {
        (
            (0f64..20_000.0, 0f64..8_000.0, 0f64..8_000.0, 0f64..8_000.0),
            (-50_000f64..200_000.0, 0f64..2.0, 0f64..2.0),
            (0f64..100.0, 0f64..100.0, 0f64..100.0),
        )
            .prop_map(
                |((income, fixed, variable, discretionary), (worth, debt, savings), (stress, happy, wellness))| {
                    ClientRecord {
                        client_id: "P".to_string(),
                        net_income: income,
                        expenses_fixed: fixed,
                        expenses_variable: variable,
                        expenses_discretionary: discretionary,
                        net_worth: worth,
                        debt_to_income: debt,
                        savings_to_income: savings,
                        financial_stress_index: stress,
                        happiness_index: happy,
                        financial_wellness_score: wellness,
                        ..Default::default()
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_healthy_records_are_on_track(
            fixed in 0f64..1_000.0,
            variable in 0f64..1_000.0,
            discretionary in 0f64..1_000.0,
            headroom in 0f64..5_000.0,
            debt in 0f64..=0.5,
            savings in 0.1f64..2.0,
            stress in 0f64..=70.0,
            worth in 0f64..100_000.0,
        ) {
            let record = ClientRecord {
                expenses_fixed: fixed,
                expenses_variable: variable,
                expenses_discretionary: discretionary,
                net_income: fixed + variable + discretionary + headroom,
                debt_to_income: debt,
                savings_to_income: savings,
                financial_stress_index: stress,
                net_worth: worth,
                ..Default::default()
            };

            let result = classify(&record);
            prop_assert!(result.is_on_track());
            prop_assert!(result.risk_tags.is_empty());
            prop_assert!(!result.is_flagged);
        }

        #[test]
        fn prop_total_expenses_is_component_sum(record in arb_record()) {
            prop_assert_eq!(
                record.total_expenses(),
                record.expenses_fixed + record.expenses_variable + record.expenses_discretionary
            );
        }

        #[test]
        fn prop_classify_is_idempotent(record in arb_record()) {
            prop_assert_eq!(classify(&record), classify(&record));
        }

        #[test]
        fn prop_views_agree_with_classify(record in arb_record()) {
            let result = classify(&record);
            prop_assert_eq!(&result.findings, &advisory_findings(&record));
            prop_assert_eq!(&result.risk_tags, &risk_tags(&record));
            prop_assert_eq!(result.is_flagged, !result.risk_tags.is_empty());
            prop_assert!(!result.findings.is_empty());
        }

        #[test]
        fn prop_batch_is_independent(
            records in proptest::collection::vec(arb_record(), 1..12),
            pick in 0usize..12,
        ) {
            let idx = pick % records.len();
            let batch = classify_batch(&records);
            prop_assert_eq!(batch.len(), records.len());
            prop_assert_eq!(&batch[idx], &classify(&records[idx]));
        }
    }
}
