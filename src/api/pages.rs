//! Page handlers
//!
//! Form-driven pages for managing records and running analyses. Every handler
//! works on the requesting client's store.

use axum::{
    Form, Router,
    extract::{Multipart, Path, State},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use super::client::ClientStore;
use super::templates;
use crate::AppState;
use crate::data::{AccountRecord, Database};
use crate::error::AppError;
use crate::graph::{FilterMode, Layout, Relation};
use crate::service::{AnalysisRequest, AnalysisService, RecordService};
use crate::storage::PlotId;

/// Account lookup form
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub graph: String,
    pub account: String,
}

/// Graph deletion form
#[derive(Debug, Deserialize)]
pub struct GraphForm {
    pub graph: String,
}

/// Account deletion form
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub account: String,
}

/// New record form
#[derive(Debug, Deserialize)]
pub struct NewRecordForm {
    pub graph: String,
    pub account: String,
    #[serde(default)]
    pub followers: String,
    #[serde(default)]
    pub following: String,
}

/// Analysis form
///
/// Selectors arrive as text and are parsed by the handler so that an unknown
/// value is reported as a 400 naming the selector.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    pub graph: String,
    pub relation: String,
    pub mode: String,
    pub layout: String,
}

/// Combined ranking form
#[derive(Debug, Deserialize)]
pub struct SimilarForm {
    pub graph: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

/// Create page router
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home).post(home))
        .route("/home", get(home).post(home))
        .route("/explore", post(explore))
        .route("/account", post(account_details))
        .route("/graphs/delete", post(delete_graph))
        .route("/accounts/delete", post(delete_account))
        .route("/accounts", post(add_account))
        .route("/upload", post(upload))
        .route("/analyze", post(analyze))
        .route("/similar", post(similar))
        .route("/plots/:id", get(plot))
}

async fn landing(db: Arc<Database>) -> Result<Html<String>, AppError> {
    let overview = RecordService::new(db).overview().await?;
    Ok(Html(templates::render_add_page(&overview, None, None)))
}

/// GET|POST /, /home
async fn home(ClientStore { db, .. }: ClientStore) -> Result<Html<String>, AppError> {
    landing(db).await
}

/// POST /explore
async fn explore(
    State(state): State<AppState>,
    ClientStore { db, .. }: ClientStore,
) -> Result<Html<String>, AppError> {
    let overview = RecordService::new(db).overview().await?;
    Ok(Html(templates::render_explore_page(
        &overview,
        state.config.analysis.following_weight,
    )))
}

/// POST /account
///
/// A missing account shows the empty markers rather than an error.
async fn account_details(
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<AccountQuery>,
) -> Result<Html<String>, AppError> {
    let service = RecordService::new(db);
    let overview = service.overview().await?;
    let details = service.account_details(&form.graph, &form.account).await;

    Ok(Html(templates::render_add_page(
        &overview,
        Some((form.graph.as_str(), form.account.as_str())),
        Some(&details),
    )))
}

/// POST /graphs/delete
async fn delete_graph(
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<GraphForm>,
) -> Result<Html<String>, AppError> {
    RecordService::new(Arc::clone(&db))
        .delete_graph(&form.graph)
        .await?;
    landing(db).await
}

/// POST /accounts/delete
async fn delete_account(
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<AccountForm>,
) -> Result<Html<String>, AppError> {
    RecordService::new(Arc::clone(&db))
        .delete_account(&form.account)
        .await?;
    landing(db).await
}

/// POST /accounts
async fn add_account(
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<NewRecordForm>,
) -> Result<Html<String>, AppError> {
    // Stored verbatim so lookups match what was submitted.
    if form.graph.trim().is_empty() || form.account.trim().is_empty() {
        return Err(AppError::Validation(
            "graph and account are required".to_string(),
        ));
    }

    let record = AccountRecord::new(&form.graph, &form.account, &form.followers, &form.following);
    RecordService::new(Arc::clone(&db)).add(&record).await?;
    landing(db).await
}

/// POST /upload
///
/// Expects a `file` field holding a headerless four-column CSV document.
async fn upload(
    ClientStore { client, db }: ClientStore,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
            data = Some(bytes);
            break;
        }
    }

    let data = data.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    let inserted = RecordService::new(Arc::clone(&db))
        .import_csv(&data)
        .await?;
    tracing::info!(client = %client, inserted, bytes = data.len(), "Upload processed");

    landing(db).await
}

/// POST /analyze
async fn analyze(
    State(state): State<AppState>,
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<AnalyzeForm>,
) -> Result<Html<String>, AppError> {
    let request = AnalysisRequest {
        graph: form.graph,
        relation: form.relation.parse::<Relation>()?,
        mode: form.mode.parse::<FilterMode>()?,
        layout: form.layout.parse::<Layout>()?,
    };

    let service = AnalysisService::new(
        db,
        Arc::clone(&state.plots),
        state.config.analysis.threshold,
    );
    let report = service.analyze(&request).await?;
    Ok(Html(templates::render_result_page(&report)))
}

/// POST /similar
///
/// Mode defaults to common; a missing or blank weight uses the configured one.
async fn similar(
    State(state): State<AppState>,
    ClientStore { db, .. }: ClientStore,
    Form(form): Form<SimilarForm>,
) -> Result<Html<String>, AppError> {
    let mode = match form.mode.as_deref() {
        Some(mode) => mode.parse::<FilterMode>()?,
        None => FilterMode::Common,
    };
    let weight = match form.weight.as_deref().map(str::trim) {
        Some(weight) if !weight.is_empty() => weight
            .parse::<f64>()
            .map_err(|_| AppError::Validation(format!("invalid weight: '{}'", weight)))?,
        _ => state.config.analysis.following_weight,
    };

    let service = AnalysisService::new(
        db,
        Arc::clone(&state.plots),
        state.config.analysis.threshold,
    );
    let report = service.similar(&form.graph, mode, weight).await?;
    Ok(Html(templates::render_similar_page(&report)))
}

/// GET /plots/:id
async fn plot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = id.parse::<PlotId>()?;
    let html = state.plots.load(&id).await?;
    Ok(Html(html))
}
