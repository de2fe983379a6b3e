// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use finfit::{
    classify, export_flagged, flagged_report, load_csv, role_kpis, ChartMetric, ClientRecord,
    ClientReport, FilterCriteria, RiskTag, Role, RoleKpis, Settings, Severity,
};

#[derive(Debug, Parser)]
#[command(name = "finfit", version, about = "FinFit client wellness dashboard")]
struct Cli {
    /// Client dataset (CSV). Overrides FINFIT_DATA.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Directory for CSV/PDF exports. Overrides FINFIT_EXPORT_DIR.
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default)
    Ui {
        #[arg(long, value_enum, default_value_t = Role::Coach)]
        role: Role,
        /// Initial y-axis of the chart page
        #[arg(long, value_enum, default_value_t = ChartMetric::TotalExpenses)]
        metric: ChartMetric,
    },
    /// Print findings and risk tags for one client or all clients
    Classify {
        client_id: Option<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List flagged clients (highest stress first), optionally export CSV
    Flagged {
        /// Only these regions (repeatable)
        #[arg(long)]
        region: Vec<String>,
        /// Only clients with all of these risk factors: "High Debt",
        /// "Low Savings" or "High Stress"
        #[arg(long)]
        risk: Vec<String>,
        /// Write flagged_clients.csv into the export directory
        #[arg(long)]
        export: bool,
    },
    /// Role KPIs over the whole dataset
    Kpis {
        #[arg(value_enum)]
        role: Role,
    },
    /// Client report as text, or PDF with --pdf
    Report {
        client_id: String,
        #[arg(long)]
        pdf: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Command::Ui { .. }));
    init_tracing(interactive);

    let settings = Settings::from_env()?
        .with_data_path(cli.data)
        .with_export_dir(cli.export_dir);

    let records = load_csv(&settings.data_path)
        .with_context(|| format!("Failed to load dataset {:?}", settings.data_path))?;

    match cli.command.unwrap_or(Command::Ui {
        role: Role::Coach,
        metric: ChartMetric::TotalExpenses,
    }) {
        Command::Ui { role, metric } => run_ui_mode(records, role, metric, &settings),
        Command::Classify { client_id, json } => run_classify(&records, client_id.as_deref(), json),
        Command::Flagged { region, risk, export } => {
            run_flagged(&records, region, &risk, export, &settings)
        }
        Command::Kpis { role } => run_kpis(&records, role),
        Command::Report { client_id, pdf } => run_report(&records, &client_id, pdf, &settings),
    }
}

/// Logs go to stderr. The dashboard owns the terminal, so it stays quiet
/// unless RUST_LOG asks otherwise.
fn init_tracing(interactive: bool) {
    let default = if interactive { "off" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_client<'a>(records: &'a [ClientRecord], client_id: &str) -> Result<&'a ClientRecord> {
    records
        .iter()
        .find(|r| r.client_id == client_id)
        .with_context(|| format!("Unknown client: {}", client_id))
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✖",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
        Severity::Success => "✔",
    }
}

fn run_classify(records: &[ClientRecord], client_id: Option<&str>, json: bool) -> Result<()> {
    let selected: Vec<&ClientRecord> = match client_id {
        Some(id) => vec![find_client(records, id)?],
        None => records.iter().collect(),
    };

    if json {
        let out: Vec<serde_json::Value> = selected
            .iter()
            .map(|r| serde_json::json!({ "client_id": r.client_id, "result": classify(r) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for record in selected {
        let result = classify(record);
        let flag = if result.is_flagged { "FLAGGED" } else { "ok" };
        println!("{}  [{}]  {}", record.client_id, flag, result.tag_labels());
        for finding in &result.findings {
            println!(
                "    {} {}: {}",
                severity_icon(finding.severity),
                finding.title,
                finding.message
            );
        }
    }

    Ok(())
}

fn run_flagged(
    records: &[ClientRecord],
    regions: Vec<String>,
    risk: &[String],
    export: bool,
    settings: &Settings,
) -> Result<()> {
    let risk_factors = risk
        .iter()
        .map(|label| {
            RiskTag::coach_filter(label).with_context(|| format!("Unknown risk factor: {}", label))
        })
        .collect::<Result<Vec<_>>>()?;

    let criteria = FilterCriteria {
        regions,
        risk_factors,
        ..FilterCriteria::for_role(Role::Coach)
    };
    let rows = flagged_report(&criteria.apply(records));

    if rows.is_empty() {
        println!("🎉 No clients currently flagged for risk factors!");
        return Ok(());
    }

    println!(
        "{:<12} {:<14} {:>10} {:>13} {:>12}  Risk Factors",
        "Client ID", "Region", "Debt Ratio", "Savings Ratio", "Stress Index"
    );
    for row in &rows {
        println!(
            "{:<12} {:<14} {:>10.2} {:>13.2} {:>12}  {}",
            row.client_id,
            row.region,
            row.debt_to_income,
            row.savings_to_income,
            row.financial_stress_index,
            row.risk_tags
        );
    }
    println!("\n{} flagged of {} clients", rows.len(), records.len());

    if export {
        let path = export_flagged(&settings.export_dir, &rows)?;
        println!("✓ Exported {}", path.display());
    }

    Ok(())
}

fn run_kpis(records: &[ClientRecord], role: Role) -> Result<()> {
    let criteria = FilterCriteria::for_role(role);
    let kpis = role_kpis(role, &criteria.apply(records));

    match kpis {
        RoleKpis::Coach(k) => {
            println!("Client Risk Overview");
            println!("  Total Clients:      {}", k.total_clients);
            println!("  High Risk Clients:  {}", k.high_risk_clients);
            println!("  Risk Rate:          {:.1}%", k.risk_rate);
        }
        RoleKpis::Client(k) => {
            println!("Your Financial Overview ({})", k.client_id);
            println!("  Net Income:      {}", finfit::record::format_currency(k.net_income));
            println!("  Wellness Score:  {:.1}", k.wellness_score);
            println!("  Stress Index:    {}", k.stress_index);
            for rec in &k.recommendations {
                println!("  {} {}", severity_icon(rec.severity), rec.message);
            }
        }
        RoleKpis::Admin(k) => {
            println!("Performance Metrics");
            println!("  Total Clients:        {}", k.total_clients);
            println!("  Avg. Wellness Score:  {:.1}", k.avg_wellness_score);
            println!("  High Risk Clients:    {}", k.high_risk_clients);
            println!("  Avg. Debt Ratio:      {:.2}", k.avg_debt_ratio);
        }
        RoleKpis::Funder(k) => {
            println!("Impact Metrics");
            println!("  Clients Served:       {}", k.clients_served);
            println!("  Avg. Wellness Score:  {:.1}", k.avg_wellness_score);
            println!("  Stress Reduction:     {:.1}%", k.stress_reduction);
        }
        RoleKpis::NoData => println!("No data available with current filters."),
    }

    Ok(())
}

fn run_report(records: &[ClientRecord], client_id: &str, pdf: bool, settings: &Settings) -> Result<()> {
    let record = find_client(records, client_id)?;
    let report = ClientReport::build(record, chrono::Local::now().date_naive());

    if pdf {
        let path = report
            .write_pdf(&settings.export_dir)
            .with_context(|| format!("Failed to write report into {:?}", settings.export_dir))?;
        println!("✓ Report written to {}", path.display());
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(
    records: Vec<ClientRecord>,
    role: Role,
    metric: ChartMetric,
    settings: &Settings,
) -> Result<()> {
    println!("🖥️  Loading FinFit Dashboard...\n");
    println!("✓ Loaded {} clients", records.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(records, role, settings.export_dir.clone());
    app.chart_metric = metric;
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(
    _records: Vec<ClientRecord>,
    _role: Role,
    _metric: ChartMetric,
    _settings: &Settings,
) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: finfit flagged | finfit kpis coach | finfit report <ID>");
    std::process::exit(1);
}
