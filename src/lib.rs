// FinFit Dashboard - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod config;
pub mod dataset;
pub mod filters;
pub mod metrics;
pub mod record;
pub mod report;
pub mod rules;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::Settings;
pub use dataset::{export_flagged, load_csv, load_reader, write_flagged_csv, DatasetError};
pub use filters::{anonymize_id, distinct_values, AdminMetric, Dimension, FilterCriteria, Role};
pub use metrics::{
    flagged_report, role_kpis, scatter_series, ChartMetric, FlaggedRow, RoleKpis, ScatterSeries,
};
pub use record::ClientRecord;
pub use report::ClientReport;
pub use rules::{
    advisory_findings, classify, classify_batch, is_flagged, risk_tags, ClassificationResult,
    Finding, FindingCode, RiskRule, RiskTag, Severity,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
