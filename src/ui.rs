use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finfit::filters::{distinct_values, Dimension, FilterCriteria, Role};
use finfit::metrics::{
    chart_bounds, flagged_report, role_kpis, scatter_series, ChartMetric, FlaggedRow, RoleKpis,
};
use finfit::record::{format_currency, ClientRecord};
use finfit::report::ClientReport;
use finfit::rules::{classify, RiskTag, Severity};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    FlaggedClients,
    Chart,
    Scorecard,
    RawData,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::FlaggedClients,
        Page::Chart,
        Page::Scorecard,
        Page::RawData,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::FlaggedClients,
            Page::FlaggedClients => Page::Chart,
            Page::Chart => Page::Scorecard,
            Page::Scorecard => Page::RawData,
            Page::RawData => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::RawData,
            Page::FlaggedClients => Page::Overview,
            Page::Chart => Page::FlaggedClients,
            Page::Scorecard => Page::Chart,
            Page::RawData => Page::Scorecard,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::FlaggedClients => "Flagged Clients",
            Page::Chart => "Chart",
            Page::Scorecard => "Scorecard",
            Page::RawData => "Raw Data",
        }
    }
}

pub struct App {
    pub records: Vec<ClientRecord>,
    pub criteria: FilterCriteria,
    pub filtered: Vec<ClientRecord>,
    pub state: TableState,
    pub flagged_state: TableState,
    pub current_page: Page,
    pub chart_metric: ChartMetric,
    /// Index into the dataset's regions; None = all regions
    pub region_cursor: Option<usize>,
    pub export_dir: PathBuf,
    pub status: Option<String>,
}

impl App {
    pub fn new(records: Vec<ClientRecord>, role: Role, export_dir: PathBuf) -> Self {
        let mut app = Self {
            records,
            criteria: FilterCriteria::for_role(role),
            filtered: Vec::new(),
            state: TableState::default(),
            flagged_state: TableState::default(),
            current_page: Page::Overview,
            chart_metric: ChartMetric::TotalExpenses,
            region_cursor: None,
            export_dir,
            status: None,
        };
        app.refilter();
        app
    }

    /// Re-run the role filters and reset selections
    pub fn refilter(&mut self) {
        self.filtered = self.criteria.apply(&self.records);

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }

        if self.flagged_rows().is_empty() {
            self.flagged_state.select(None);
        } else {
            self.flagged_state.select(Some(0));
        }
    }

    pub fn role(&self) -> Role {
        self.criteria.role
    }

    pub fn next_role(&mut self) {
        self.criteria = FilterCriteria::for_role(self.role().next());
        self.region_cursor = None;
        self.refilter();
        self.status = Some(format!("Role: {}", self.role()));
    }

    pub fn clear_filters(&mut self) {
        let client_id = self.criteria.client_id.clone();
        self.criteria = FilterCriteria {
            client_id,
            ..FilterCriteria::for_role(self.role())
        };
        self.region_cursor = None;
        self.refilter();
    }

    /// All regions -> first region -> ... -> last region -> all regions
    pub fn cycle_region(&mut self) {
        if self.role() == Role::Client {
            return;
        }

        let regions = distinct_values(&self.records, Dimension::Region);
        self.region_cursor = match self.region_cursor {
            None if !regions.is_empty() => Some(0),
            Some(i) if i + 1 < regions.len() => Some(i + 1),
            _ => None,
        };

        self.criteria.regions = match self.region_cursor {
            Some(i) => vec![regions[i].clone()],
            None => Vec::new(),
        };
        self.refilter();
    }

    pub fn toggle_risk_factor(&mut self, tag: RiskTag) {
        if self.role() != Role::Coach {
            return;
        }
        self.criteria.toggle_risk_factor(tag);
        self.refilter();
    }

    /// Client role: step through client ids
    pub fn cycle_client(&mut self, forward: bool) {
        if self.role() != Role::Client || self.records.is_empty() {
            return;
        }

        let len = self.records.len();
        let current = self
            .criteria
            .client_id
            .as_deref()
            .and_then(|id| self.records.iter().position(|r| r.client_id == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };

        self.criteria.client_id = Some(self.records[next].client_id.clone());
        self.refilter();
    }

    pub fn selected_record(&self) -> Option<&ClientRecord> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn flagged_rows(&self) -> Vec<FlaggedRow> {
        flagged_report(&self.filtered)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_state_and_len(&mut self) -> (&mut TableState, usize) {
        if self.current_page == Page::FlaggedClients {
            let len = self.flagged_rows().len();
            (&mut self.flagged_state, len)
        } else {
            let len = self.filtered.len();
            (&mut self.state, len)
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active_state_and_len();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active_state_and_len();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn export_flagged(&mut self) {
        if !self.role().sees_flagged_clients() {
            self.status = Some("Flagged report is available to Coach and Admin".to_string());
            return;
        }

        let rows = self.flagged_rows();
        self.status = Some(match finfit::dataset::export_flagged(&self.export_dir, &rows) {
            Ok(path) => format!("Exported {} rows to {}", rows.len(), path.display()),
            Err(e) => format!("Export failed: {}", e),
        });
    }

    pub fn export_report(&mut self) {
        let Some(record) = self.selected_record() else {
            self.status = Some("No data available with current filters.".to_string());
            return;
        };

        let report = ClientReport::build(record, chrono::Local::now().date_naive());
        self.status = Some(match report.write_pdf(&self.export_dir) {
            Ok(path) => format!("Report written to {}", path.display()),
            Err(e) => format!("Report failed: {}", e),
        });
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Char('r') => app.next_role(),
                KeyCode::Char('g') => app.cycle_region(),
                KeyCode::Char('c') => app.clear_filters(),
                KeyCode::Char('1') => app.toggle_risk_factor(RiskTag::HighDebt),
                KeyCode::Char('2') => app.toggle_risk_factor(RiskTag::LowSavings),
                KeyCode::Char('3') => app.toggle_risk_factor(RiskTag::HighStress),
                KeyCode::Char('m') => app.chart_metric = app.chart_metric.next(),
                KeyCode::Char('[') => app.cycle_client(false),
                KeyCode::Char(']') => app.cycle_client(true),
                KeyCode::Char('e') => app.export_flagged(),
                KeyCode::Char('p') => app.export_report(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.filtered.is_empty() {
        let empty = Paragraph::new("  No data available with current filters.")
            .block(Block::default().borders(Borders::ALL).title(" FinFit "));
        f.render_widget(empty, chunks[1]);
    } else {
        match app.current_page {
            Page::Overview => render_overview(f, chunks[1], app),
            Page::FlaggedClients => render_flagged(f, chunks[1], app),
            Page::Chart => render_chart(f, chunks[1], app),
            Page::Scorecard => render_scorecard(f, chunks[1], app),
            Page::RawData => render_raw_data(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("  {}: ", text),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Role: {}", app.role()),
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Clients: {}/{}", app.filtered.len(), app.records.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" FinFit Dashboard "),
    );

    f.render_widget(header, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![Line::from("")];

    match role_kpis(app.role(), &app.filtered) {
        RoleKpis::Coach(k) => {
            content.push(Line::from(Span::styled("  Client Risk Overview", header_style())));
            content.push(Line::from(""));
            content.push(Line::from(vec![label("Total Clients"), Span::raw(k.total_clients.to_string())]));
            content.push(Line::from(vec![
                label("High Risk Clients"),
                Span::styled(k.high_risk_clients.to_string(), Style::default().fg(Color::Red)),
            ]));
            content.push(Line::from(vec![label("Risk Rate"), Span::raw(format!("{:.1}%", k.risk_rate))]));
        }
        RoleKpis::Client(k) => {
            content.push(Line::from(Span::styled("  Your Financial Overview", header_style())));
            content.push(Line::from(""));
            content.push(Line::from(vec![label("Client"), Span::raw(k.client_id.clone())]));
            content.push(Line::from(vec![label("Net Income"), Span::raw(format_currency(k.net_income))]));
            content.push(Line::from(vec![
                label("Wellness Score"),
                Span::raw(format!("{:.1}", k.wellness_score)),
            ]));
            content.push(Line::from(vec![label("Stress Index"), Span::raw(k.stress_index.to_string())]));
            content.push(Line::from(""));
            content.push(Line::from(Span::styled("  Personal Recommendations", header_style())));
            for rec in &k.recommendations {
                content.push(Line::from(Span::styled(
                    format!("  • {}", rec.message),
                    Style::default().fg(severity_color(rec.severity)),
                )));
            }
        }
        RoleKpis::Admin(k) => {
            content.push(Line::from(Span::styled("  Performance Metrics", header_style())));
            content.push(Line::from(""));
            content.push(Line::from(vec![label("Total Clients"), Span::raw(k.total_clients.to_string())]));
            content.push(Line::from(vec![
                label("Avg. Wellness Score"),
                Span::raw(format!("{:.1}", k.avg_wellness_score)),
            ]));
            content.push(Line::from(vec![
                label("High Risk Clients"),
                Span::styled(k.high_risk_clients.to_string(), Style::default().fg(Color::Red)),
            ]));
            content.push(Line::from(vec![
                label("Avg. Debt Ratio"),
                Span::raw(format!("{:.2}", k.avg_debt_ratio)),
            ]));
            let pinned: Vec<&str> = app.criteria.admin_metrics.iter().map(|m| m.label()).collect();
            content.push(Line::from(vec![label("Key Metrics"), Span::raw(pinned.join(", "))]));
        }
        RoleKpis::Funder(k) => {
            content.push(Line::from(Span::styled("  Impact Metrics", header_style())));
            content.push(Line::from(""));
            content.push(Line::from(vec![label("Clients Served"), Span::raw(k.clients_served.to_string())]));
            content.push(Line::from(vec![
                label("Avg. Wellness Score"),
                Span::raw(format!("{:.1}", k.avg_wellness_score)),
            ]));
            content.push(Line::from(vec![
                label("Stress Reduction"),
                Span::styled(format!("{:.1}%", k.stress_reduction), Style::default().fg(Color::Green)),
            ]));
        }
        RoleKpis::NoData => content.push(Line::from("  No data available with current filters.")),
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  Active Filters", header_style())));
    let regions = if app.criteria.regions.is_empty() {
        "All".to_string()
    } else {
        app.criteria.regions.join(", ")
    };
    content.push(Line::from(vec![label("Region"), Span::raw(regions)]));
    if app.role() == Role::Coach {
        let risks: Vec<&str> = app.criteria.risk_factors.iter().map(|t| t.label()).collect();
        let risks = if risks.is_empty() { "None".to_string() } else { risks.join(", ") };
        content.push(Line::from(vec![label("Risk Factors"), Span::raw(risks)]));
    }

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} View ", app.role())),
    );

    f.render_widget(paragraph, area);
}

fn render_flagged(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" 🚨 Flagged Clients ");

    if !app.role().sees_flagged_clients() {
        let msg = Paragraph::new("  Flagged clients are visible to Coach and Admin roles.").block(block);
        f.render_widget(msg, area);
        return;
    }

    let flagged = app.flagged_rows();
    if flagged.is_empty() {
        let msg = Paragraph::new(Span::styled(
            "  🎉 No clients currently flagged for risk factors!",
            Style::default().fg(Color::Green),
        ))
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header_cells = ["Client ID", "Region", "Debt Ratio", "Savings Ratio", "Stress Index", "Risk Factors"]
        .iter()
        .map(|h| Cell::from(*h).style(header_style()));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = flagged.iter().map(|row| {
        let stress_color = if row.financial_stress_index > finfit::rules::STRESS_INDEX_LIMIT {
            Color::Red
        } else {
            Color::White
        };

        Row::new(vec![
            Cell::from(row.client_id.clone()),
            Cell::from(row.region.clone()),
            Cell::from(format!("{:.2}", row.debt_to_income)),
            Cell::from(format!("{:.2}", row.savings_to_income)),
            Cell::from(row.financial_stress_index.to_string()).style(Style::default().fg(stress_color)),
            Cell::from(row.risk_tags.clone()).style(Style::default().fg(Color::Yellow)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.flagged_state);
}

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| Span::raw(format!("{:.0}", v)))
        .collect()
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let metric = app.chart_metric;
    let series = scatter_series(&app.filtered, metric);
    let (x_bounds, y_bounds) = chart_bounds(&series);

    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name = if s.spending_pattern.is_empty() {
                "Unknown".to_string()
            } else {
                s.spending_pattern.clone()
            };
            Dataset::default()
                .name(name)
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(&s.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" Net Income vs {} (m: change metric) ", metric.label())),
        )
        .x_axis(
            Axis::default()
                .title("Net Income (N$)")
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(metric.label())
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    f.render_widget(chart, area);
}

fn render_scorecard(f: &mut Frame, area: Rect, app: &mut App) {
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // Client list
            Constraint::Percentage(70), // Scorecard
        ])
        .split(area);

    let rows = app.filtered.iter().map(|r| {
        let flagged = classify(r).is_flagged;
        Row::new(vec![
            Cell::from(r.client_id.clone()),
            Cell::from(if flagged { "⚑" } else { "" }).style(Style::default().fg(Color::Red)),
        ])
    });

    let list = Table::new(rows, [Constraint::Min(10), Constraint::Length(2)])
        .block(Block::default().borders(Borders::ALL).title(" Select Client "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");
    f.render_stateful_widget(list, content_chunks[0], &mut app.state);

    let Some(record) = app.selected_record() else {
        return;
    };
    let result = classify(record);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("Region"), Span::raw(record.region.clone())]),
        Line::from(vec![label("Gender"), Span::raw(record.gender.clone())]),
        Line::from(vec![label("Financial Personality"), Span::raw(record.financial_personality.clone())]),
        Line::from(vec![label("Spending Pattern"), Span::raw(record.spending_pattern.clone())]),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![label("Net Income"), Span::raw(format_currency(record.net_income))]),
        Line::from(vec![label("Total Expenses"), Span::raw(format_currency(record.total_expenses()))]),
        Line::from(vec![label("Savings-to-Income Ratio"), Span::raw(format!("{:.2}", record.savings_to_income))]),
        Line::from(vec![label("Debt-to-Income Ratio"), Span::raw(format!("{:.2}", record.debt_to_income))]),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![label("Financial Stress Index"), Span::raw(record.financial_stress_index.to_string())]),
        Line::from(vec![label("Happiness Index"), Span::raw(record.happiness_index.to_string())]),
        Line::from(vec![label("Financial Wellness Score"), Span::raw(record.financial_wellness_score.to_string())]),
        Line::from("  ─────────────────────────────────────"),
        Line::from(Span::styled(
            "  SMART FINANCIAL TIPS",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    for finding in &result.findings {
        let color = severity_color(finding.severity);
        content.push(Line::from(vec![
            Span::styled(
                format!("  {}: ", finding.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(finding.message.clone(), Style::default().fg(color)),
        ]));
    }

    if !result.risk_tags.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(vec![
            label("Risk Tags"),
            Span::styled(result.tag_labels(), Style::default().fg(Color::Red)),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press p to export PDF report",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let scorecard = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" Client Scorecard: {} ", record.client_id)),
    );

    f.render_widget(scorecard, content_chunks[1]);
}

fn render_raw_data(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = [
        "Client ID", "Region", "Gender", "Pattern", "Income", "Expenses", "Net Worth", "Debt", "Savings",
        "Stress", "Wellness",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(header_style()));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|r| {
        let worth_color = if r.net_worth < 0.0 { Color::Red } else { Color::Green };
        Row::new(vec![
            Cell::from(r.client_id.clone()),
            Cell::from(r.region.clone()),
            Cell::from(r.gender.clone()),
            Cell::from(r.spending_pattern.clone()),
            Cell::from(format!("{:.0}", r.net_income)),
            Cell::from(format!("{:.0}", r.total_expenses())),
            Cell::from(format!("{:.0}", r.net_worth)).style(Style::default().fg(worth_color)),
            Cell::from(format!("{:.2}", r.debt_to_income)),
            Cell::from(format!("{:.2}", r.savings_to_income)),
            Cell::from(r.financial_stress_index.to_string()),
            Cell::from(r.financial_wellness_score.to_string()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Raw Data "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(format!(" {} ", status), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = match app.role() {
        Role::Coach => &[("r", "Role"), ("g", "Region"), ("1-3", "Risk"), ("e", "Export CSV")],
        Role::Admin => &[("r", "Role"), ("g", "Region"), ("e", "Export CSV")],
        Role::Client => &[("r", "Role"), ("[/]", "Client")],
        Role::Funder => &[("r", "Role"), ("g", "Region")],
    };

    for (key, action) in keys
        .iter()
        .chain([("m", "Metric"), ("p", "PDF"), ("Tab", "Page"), ("c", "Clear")].iter())
    {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {} | ", action)));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
