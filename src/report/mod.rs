// 📄 Client Report - per-client wellness scorecard
// Document model first, then two renderers: plain text (CLI/TUI) and PDF.

pub mod pdf;

use crate::record::{format_currency, ClientRecord};
use crate::rules::{self, Finding};
use chrono::NaiveDate;
use pdf::{Align, FontStyle, PdfWriter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "FinFit Financial Wellness Report";

/// Progress deltas shown in every report until historical data exists.
/// Percent change: stress, wellness, savings.
pub const SIMULATED_PROGRESS: [(&str, i32); 3] = [
    ("Stress Level", -12),
    ("Wellness Score", 8),
    ("Savings Rate", 15),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
    /// Long prose lines that should be word-wrapped
    pub wrap: bool,
}

impl ReportSection {
    fn new(heading: &str, lines: Vec<String>) -> Self {
        ReportSection {
            heading: heading.to_string(),
            lines,
            wrap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    pub client_id: String,
    pub title: String,
    pub generated_on: NaiveDate,
    pub sections: Vec<ReportSection>,
    /// Findings backing the recommendations section, verbatim
    pub findings: Vec<Finding>,
}

impl ClientReport {
    pub fn build(record: &ClientRecord, generated_on: NaiveDate) -> Self {
        let findings = rules::advisory_findings(record);

        let profile = ReportSection::new(
            "Client Profile",
            vec![
                format!("Client ID: {}", record.client_id),
                format!("Region: {}", record.region),
                format!("Gender: {}", record.gender),
                format!("Financial Personality: {}", record.financial_personality),
                format!("Spending Pattern: {}", record.spending_pattern),
            ],
        );

        let overview = ReportSection::new(
            "Financial Overview",
            vec![
                format!("Net Income: {}", format_currency(record.net_income)),
                format!("Total Expenses: {}", format_currency(record.total_expenses())),
                format!("Savings-to-Income Ratio: {:.2}", record.savings_to_income),
                format!("Debt-to-Income Ratio: {:.2}", record.debt_to_income),
            ],
        );

        let wellness = ReportSection::new(
            "Wellness Indicators",
            vec![
                format!("Financial Stress Index: {}", record.financial_stress_index),
                format!("Happiness Index: {}", record.happiness_index),
                format!("Financial Wellness Score: {}", record.financial_wellness_score),
            ],
        );

        let progress = ReportSection::new(
            "Progress Summary",
            SIMULATED_PROGRESS
                .iter()
                .map(|(label, change)| format!("{}: {:+}%", label, change))
                .collect(),
        );

        let recommendations = ReportSection {
            wrap: true,
            ..ReportSection::new(
                "Personalized Recommendations",
                findings
                    .iter()
                    .map(|f| format!("{}: {}", f.title, f.message))
                    .collect(),
            )
        };

        ClientReport {
            client_id: record.client_id.clone(),
            title: REPORT_TITLE.to_string(),
            generated_on,
            sections: vec![profile, overview, wellness, progress, recommendations],
            findings,
        }
    }

    /// `<client_id>_Report.pdf`, with path separators replaced
    pub fn file_name(&self) -> String {
        let safe: String = self
            .client_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}_Report.pdf", safe)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push('\n');
        out.push_str(&format!("Generated: {}\n", self.generated_on.format("%Y-%m-%d")));

        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.heading);
            out.push('\n');
            out.push_str(&"-".repeat(section.heading.chars().count()));
            out.push('\n');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }

        out
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        let mut pdf = PdfWriter::new(&self.title);

        pdf.set_font(FontStyle::Bold, 16.0);
        pdf.cell(10.0, &self.title, Align::Center);
        pdf.set_font(FontStyle::Regular, 10.0);
        pdf.cell(
            6.0,
            &format!("Generated {}", self.generated_on.format("%d %B %Y")),
            Align::Center,
        );
        pdf.ln(10.0);

        for section in &self.sections {
            pdf.set_font(FontStyle::Bold, 14.0);
            pdf.cell(10.0, &section.heading, Align::Left);
            pdf.ln(5.0);

            pdf.set_font(FontStyle::Regular, 12.0);
            for line in &section.lines {
                if section.wrap {
                    pdf.multi_cell(10.0, line);
                } else {
                    pdf.cell(10.0, line, Align::Left);
                }
            }
            pdf.ln(if section.wrap { 5.0 } else { 10.0 });
        }

        pdf.finish()
    }

    /// Write the PDF into `dir`, returning the file path.
    pub fn write_pdf(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_pdf())?;

        tracing::info!(
            client_id = %self.client_id,
            path = %path.display(),
            "wrote client report"
        );
        Ok(path)
    }
}

// ============================================================================
// TESTS
// ============================================================================
