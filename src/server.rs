// 🌐 FinFit API - read-only JSON views over the loaded dataset
// Router lives in the library so it can be exercised without a socket

use crate::dataset::write_flagged_csv;
use crate::filters::{FilterCriteria, Role};
use crate::metrics::{flagged_report, role_kpis, FlaggedRow, RoleKpis};
use crate::record::ClientRecord;
use crate::report::ClientReport;
use crate::rules::{classify, ClassificationResult, RiskTag};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. The dataset is immutable after load, so a
/// plain `Arc` is enough.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<ClientRecord>>,
}

impl AppState {
    pub fn new(records: Vec<ClientRecord>) -> Self {
        AppState {
            records: Arc::new(records),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err(format!("{} not found", what))),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::err(message))).into_response()
}

// ============================================================================
// Query parsing
// ============================================================================

/// Filter parameters; list values are comma separated
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub role: Option<String>,
    pub region: Option<String>,
    pub gender: Option<String>,
    pub pattern: Option<String>,
    pub risk: Option<String>,
    pub client_id: Option<String>,
}

fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl FilterQuery {
    pub fn to_criteria(&self, default_role: Role) -> Result<FilterCriteria, String> {
        let role = match &self.role {
            Some(name) => Role::from_name(name).ok_or_else(|| format!("unknown role: {}", name))?,
            None => default_role,
        };

        let risk_factors = split_list(&self.risk)
            .iter()
            .map(|label| {
                RiskTag::coach_filter(label).ok_or_else(|| format!("unknown risk factor: {}", label))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterCriteria {
            regions: split_list(&self.region),
            genders: split_list(&self.gender),
            spending_patterns: split_list(&self.pattern),
            risk_factors,
            client_id: self.client_id.clone(),
            ..FilterCriteria::for_role(role)
        })
    }
}

// ============================================================================
// Views
// ============================================================================

/// Client row enriched with its derived total and classification
#[derive(Debug, Serialize)]
pub struct ClientView {
    #[serde(flatten)]
    pub record: ClientRecord,
    #[serde(rename = "Total_Expenses")]
    pub total_expenses: f64,
    pub classification: ClassificationResult,
}

impl From<ClientRecord> for ClientView {
    fn from(record: ClientRecord) -> Self {
        Self {
            total_expenses: record.total_expenses(),
            classification: classify(&record),
            record,
        }
    }
}

/// `id` arrives already percent-decoded by the `Path` extractor
fn find_client<'a>(state: &'a AppState, id: &str) -> Option<&'a ClientRecord> {
    state.records.iter().find(|r| r.client_id == id)
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/clients - filtered clients with classification
async fn get_clients(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    let criteria = match query.to_criteria(Role::Coach) {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let views: Vec<ClientView> = criteria
        .apply(&state.records)
        .into_iter()
        .map(ClientView::from)
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(views))).into_response()
}

/// GET /api/flagged - flagged clients, highest stress first
async fn get_flagged(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    let criteria = match query.to_criteria(Role::Coach) {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let rows: Vec<FlaggedRow> = flagged_report(&criteria.apply(&state.records));
    (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
}

/// GET /api/flagged.csv - same listing as a CSV download
async fn get_flagged_csv(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    let criteria = match query.to_criteria(Role::Coach) {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let rows = flagged_report(&criteria.apply(&state.records));
    let mut body = Vec::new();
    if let Err(e) = write_flagged_csv(&mut body, &rows) {
        tracing::error!(error = %e, "failed to render flagged clients csv");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::err("failed to render csv")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"flagged_clients.csv\"".to_string(),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/kpis/:role - role KPIs over the filtered dataset
async fn get_kpis(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let Some(role) = Role::from_name(&role) else {
        return bad_request(format!("unknown role: {}", role));
    };

    let criteria = match query.to_criteria(role) {
        Ok(c) => FilterCriteria { role, ..c },
        Err(e) => return bad_request(e),
    };

    let kpis: RoleKpis = role_kpis(role, &criteria.apply(&state.records));
    (StatusCode::OK, Json(ApiResponse::ok(kpis))).into_response()
}

/// GET /api/clients/:id/classification
async fn get_classification(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match find_client(&state, &id) {
        Some(record) => (StatusCode::OK, Json(ApiResponse::ok(classify(record)))).into_response(),
        None => not_found("client"),
    }
}

/// GET /api/clients/:id/report.pdf
async fn get_report_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(record) = find_client(&state, &id) else {
        return not_found("client");
    };

    let report = ClientReport::build(record, chrono::Utc::now().date_naive());
    tracing::info!(client_id = %report.client_id, "serving client report");

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name()),
            ),
        ],
        report.to_pdf(),
    )
        .into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/clients", get(get_clients))
        .route("/clients/:id/classification", get(get_classification))
        .route("/clients/:id/report.pdf", get(get_report_pdf))
        .route("/flagged", get(get_flagged))
        .route("/flagged.csv", get(get_flagged_csv))
        .route("/kpis/:role", get(get_kpis))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
