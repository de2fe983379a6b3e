// 🧾 Client Record - one typed row of the FinFit dataset
// Column names follow the CSV export exactly (Client_ID, Net_Income, ...)

use serde::{Deserialize, Serialize};

// ============================================================================
// CLIENT RECORD
// ============================================================================

/// One client's financial snapshot.
///
/// Every numeric field is guaranteed present and finite by the loader
/// (`dataset::load_csv`). Profile fields (region, gender, ...) are only used
/// by filters, charts and reports; the classification engine never reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    // ========================================================================
    // IDENTITY & PROFILE
    // ========================================================================
    #[serde(rename = "Client_ID")]
    pub client_id: String,

    #[serde(rename = "Region", default)]
    pub region: String,

    #[serde(rename = "Gender", default)]
    pub gender: String,

    #[serde(rename = "Financial_Personality", default)]
    pub financial_personality: String,

    #[serde(rename = "Spending_Pattern", default)]
    pub spending_pattern: String,

    // ========================================================================
    // MONEY (same currency unit, N$)
    // ========================================================================
    #[serde(rename = "Net_Income")]
    pub net_income: f64,

    #[serde(rename = "Expenses_Fixed")]
    pub expenses_fixed: f64,

    #[serde(rename = "Expenses_Variable")]
    pub expenses_variable: f64,

    #[serde(rename = "Expenses_Discretionary")]
    pub expenses_discretionary: f64,

    /// Signed: negative means liabilities exceed assets
    #[serde(rename = "Net_Worth")]
    pub net_worth: f64,

    // ========================================================================
    // RATIOS & SCORES
    // ========================================================================
    #[serde(rename = "Debt_to_Income")]
    pub debt_to_income: f64,

    #[serde(rename = "Savings_to_Income")]
    pub savings_to_income: f64,

    /// 0-100, higher is worse
    #[serde(rename = "Financial_Stress_Index")]
    pub financial_stress_index: f64,

    #[serde(rename = "Happiness_Index")]
    pub happiness_index: f64,

    #[serde(rename = "Financial_Wellness_Score")]
    pub financial_wellness_score: f64,
}

impl ClientRecord {
    /// Sum of the three expense components.
    ///
    /// Always recomputed; there is no stored total that could drift from
    /// its parts.
    pub fn total_expenses(&self) -> f64 {
        self.expenses_fixed + self.expenses_variable + self.expenses_discretionary
    }

    /// Named numeric fields, in CSV column order. Used by the loader to
    /// reject NaN/inf and by the raw-data views.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 10] {
        [
            ("Net_Income", self.net_income),
            ("Expenses_Fixed", self.expenses_fixed),
            ("Expenses_Variable", self.expenses_variable),
            ("Expenses_Discretionary", self.expenses_discretionary),
            ("Net_Worth", self.net_worth),
            ("Debt_to_Income", self.debt_to_income),
            ("Savings_to_Income", self.savings_to_income),
            ("Financial_Stress_Index", self.financial_stress_index),
            ("Happiness_Index", self.happiness_index),
            ("Financial_Wellness_Score", self.financial_wellness_score),
        ]
    }
}

// ============================================================================
// FORMATTING HELPERS
// ============================================================================

/// Format an amount with thousands separators and no decimals: `12,345`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// `N$ 12,345`
pub fn format_currency(value: f64) -> String {
    format!("N$ {}", format_thousands(value))
}

// ============================================================================
// TESTS
// ============================================================================
