use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calculations::{
    CrashingAnalysis, CrashingScenario, EvmReport, MaterialRequirement, ParetoReport,
    UnitPriceBreakdown, UnitPriceComparison, analyze_unit_price_with, classify_pareto,
    compare_with_standard, material_requirements, roll_up_project, simulate_crashing_with,
};
use crate::{BudgetItem, CatalogIssue, EngineConfig, EstimateSnapshot, audit_catalog};

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<EstimateSnapshot>>,
    config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(snapshot: EstimateSnapshot, config: EngineConfig) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            config: Arc::new(config),
        }
    }

    pub fn with_shared(snapshot: Arc<RwLock<EstimateSnapshot>>, config: EngineConfig) -> Self {
        Self {
            snapshot,
            config: Arc::new(config),
        }
    }

    fn snapshot(&self) -> Arc<RwLock<EstimateSnapshot>> {
        self.snapshot.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct AsOfQuery {
    as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(get_snapshot).put(replace_snapshot))
        .route("/catalog/audit", get(get_catalog_audit))
        .route("/tasks/:id/unit-price", get(get_unit_price))
        .route("/tasks/:id/standard-comparison", get(get_standard_comparison))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item).delete(delete_item))
        .route("/items/:id/crashing", post(simulate_item_crashing))
        .route("/evm", get(get_evm))
        .route("/pareto", get(get_pareto))
        .route("/requirements", get(get_requirements))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    snapshot: EstimateSnapshot,
    config: EngineConfig,
) -> std::io::Result<()> {
    let state = AppState::new(snapshot, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_snapshot(State(state): State<AppState>) -> Json<EstimateSnapshot> {
    let snapshot = state.snapshot();
    let current = snapshot.read().clone();
    Json(current)
}

async fn replace_snapshot(
    State(state): State<AppState>,
    Json(replacement): Json<EstimateSnapshot>,
) -> Result<StatusCode, ApiError> {
    replacement
        .validate()
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let snapshot = state.snapshot();
    *snapshot.write() = replacement;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_catalog_audit(State(state): State<AppState>) -> Json<Vec<CatalogIssue>> {
    let snapshot = state.snapshot();
    let issues = {
        let guard = snapshot.read();
        audit_catalog(&guard.catalog)
    };
    Json(issues)
}

async fn get_unit_price(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<UnitPriceBreakdown>, ApiError> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let indexes = guard.indexes();
    let task = indexes
        .task(&task_id)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))?;
    Ok(Json(analyze_unit_price_with(task, &indexes, &state.config.schedule)))
}

async fn get_standard_comparison(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<UnitPriceComparison>, ApiError> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let indexes = guard.indexes();
    let task = indexes
        .task(&task_id)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))?;
    compare_with_standard(task, &indexes, &state.config.schedule)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} has no standard yields")))
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<BudgetItem>> {
    let snapshot = state.snapshot();
    let items = snapshot.read().items.clone();
    Json(items)
}

async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<BudgetItem>, ApiError> {
    let snapshot = state.snapshot();
    let item = snapshot.read().item(&item_id).cloned();
    item.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("budget item {item_id} not found")))
}

async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<BudgetItem>,
) -> Result<(StatusCode, Json<BudgetItem>), ApiError> {
    let snapshot = state.snapshot();
    let mut guard = snapshot.write();
    if item.project_id != guard.project.id {
        return Err(ApiError::invalid(format!(
            "budget item {} belongs to project {}, not {}",
            item.id, item.project_id, guard.project.id
        )));
    }
    if guard.item(&item.id).is_some() {
        return Err(ApiError::Conflict(format!(
            "budget item {} already exists",
            item.id
        )));
    }
    guard.items.push(item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let snapshot = state.snapshot();
    let removed = {
        let mut guard = snapshot.write();
        let before = guard.items.len();
        guard.items.retain(|item| item.id != item_id);
        guard.items.len() != before
    };
    if !removed {
        return Err(ApiError::not_found(format!("budget item {item_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn simulate_item_crashing(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(scenario): Json<CrashingScenario>,
) -> Result<Json<CrashingAnalysis>, ApiError> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let item = guard
        .item(&item_id)
        .ok_or_else(|| ApiError::not_found(format!("budget item {item_id} not found")))?;
    let indexes = guard.indexes();
    let task = indexes.task(&item.task_id).ok_or_else(|| {
        ApiError::not_found(format!("task {} of item {item_id} not found", item.task_id))
    })?;
    Ok(Json(simulate_crashing_with(
        item,
        task,
        &indexes,
        scenario,
        &state.config.crashing,
        &state.config.schedule,
    )))
}

async fn get_evm(State(state): State<AppState>, Query(query): Query<AsOfQuery>) -> Json<EvmReport> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let indexes = guard.indexes();
    Json(roll_up_project(
        &guard.project,
        &guard.items,
        &indexes,
        &guard.receipts,
        query.date(),
        &state.config.schedule,
    ))
}

async fn get_pareto(State(state): State<AppState>) -> Json<ParetoReport> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let indexes = guard.indexes();
    Json(classify_pareto(
        &guard.project,
        &guard.items,
        &indexes,
        &state.config.schedule,
    ))
}

async fn get_requirements(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Json<Vec<MaterialRequirement>> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let indexes = guard.indexes();
    Json(material_requirements(
        &guard.project,
        &guard.items,
        &indexes,
        &guard.receipts,
        query.date(),
    ))
}
