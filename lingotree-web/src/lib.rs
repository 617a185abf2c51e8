//! JSON API behind the browser editor
//!
//! Every route is a thin wrapper over `lingotree` and `lingotree-mt`: parse
//! and flatten a document, compare it against an earlier translation, run a
//! batch, cancel it, and export the rebuilt document. The translation
//! settings live in [`AppState`] and are written through a [`ConfigStore`].

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use lingotree::{
    DocumentFormat, ExportMode, FlatItem, KeyPath, MergedItem, Translatable, TreeError,
    export_filename, flatten, merge, rebuild, reconcile,
};
use lingotree_mt::{
    BatchReport, BatchTranslator, ConfigStore, MachineTranslator, MtError, MtResult,
    TranslationConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Placeholder the config endpoint shows instead of the API key
const MASKED_KEY: &str = "***";

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<BatchTranslator>,
    pub config: Arc<RwLock<TranslationConfig>>,
    pub store: Arc<dyn ConfigStore>,
    /// Backend override; `None` builds a chat-completion client per run
    pub translator: Option<Arc<dyn MachineTranslator>>,
}

impl AppState {
    /// Load the settings from `store`, with environment overrides applied
    pub fn from_store(store: Arc<dyn ConfigStore>) -> MtResult<Self> {
        let config = store.load()?.with_env_overrides();
        Ok(Self {
            runner: Arc::new(BatchTranslator::new()),
            config: Arc::new(RwLock::new(config)),
            store,
            translator: None,
        })
    }

    pub fn with_translator(mut self, translator: Arc<dyn MachineTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/extract", post(extract))
        .route("/api/compare", post(compare))
        .route("/api/translate", post(translate))
        .route("/api/translate/cancel", post(cancel))
        .route("/api/export", post(export))
        .route("/api/config", get(get_config).put(put_config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ========== Wire types ==========

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub format: DocumentFormat,
    pub content: String,
}

#[derive(Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub format: DocumentFormat,
    pub base: String,
    #[serde(default)]
    pub translated: Option<String>,
    /// Items from an earlier compare whose selection and edits should survive
    #[serde(default)]
    pub previous: Option<Vec<MergedItem>>,
}

#[derive(Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// Either item kind; update-mode lists carry `originalValue`
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Merged(Vec<MergedItem>),
    Flat(Vec<FlatItem>),
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub items: ItemList,
}

#[derive(Serialize, Deserialize)]
pub struct TranslatedEntry {
    pub index: usize,
    pub path: KeyPath,
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<TranslatedEntry>,
    pub report: BatchReport,
}

#[derive(Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub format: DocumentFormat,
    pub mode: ExportMode,
    pub document: Value,
    pub items: Value,
}

#[derive(Serialize, Deserialize)]
pub struct ExportResponse {
    pub filename: String,
    pub content: String,
}

// ========== Errors ==========

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<TreeError> for ApiError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Parse { .. } => ApiError::bad_request(err.to_string()),
            TreeError::PathResolution { .. } => {
                error!(error = %err, "Rebuild failed");
                ApiError::internal(err.to_string())
            }
            _ => ApiError::internal(err.to_string()),
        }
    }
}

impl From<MtError> for ApiError {
    fn from(err: MtError) -> Self {
        match err {
            MtError::Config(_) | MtError::EmptySelection => ApiError::bad_request(err.to_string()),
            MtError::AlreadyRunning => ApiError {
                status: StatusCode::CONFLICT,
                message: err.to_string(),
            },
            MtError::Tree(tree) => tree.into(),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

// ========== Handlers ==========

async fn extract(
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ItemsResponse<FlatItem>>, ApiError> {
    let document = request.format.parse(&request.content)?;
    let items = flatten(&document);
    info!(format = %request.format, items = items.len(), "Extracted document");
    Ok(Json(ItemsResponse { items }))
}

async fn compare(
    Json(request): Json<CompareRequest>,
) -> Result<Json<ItemsResponse<MergedItem>>, ApiError> {
    let base = request.format.parse(&request.base)?;
    let translated = match request.translated.as_deref() {
        Some(text) => request.format.parse_optional(text)?,
        None => None,
    };
    let mut items = merge(&base, translated.as_ref());
    if let Some(previous) = &request.previous {
        items = reconcile(previous, items);
    }
    info!(
        items = items.len(),
        new = items.iter().filter(|item| item.is_new).count(),
        updated = items.iter().filter(|item| item.is_updated).count(),
        "Compared documents"
    );
    Ok(Json(ItemsResponse { items }))
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let config = state.config.read().await.clone();
    let response = match request.items {
        ItemList::Merged(items) => run_batch(&state, &config, &items).await?,
        ItemList::Flat(items) => run_batch(&state, &config, &items).await?,
    };
    Ok(Json(response))
}

async fn run_batch<T>(
    state: &AppState,
    config: &TranslationConfig,
    items: &[T],
) -> MtResult<TranslateResponse>
where
    T: Translatable + Sync,
{
    let mut translations = Vec::new();
    let on_item_translated = |index: usize, text: String| {
        translations.push(TranslatedEntry {
            index,
            path: items[index].path().clone(),
            text,
        })
    };

    let report = match &state.translator {
        Some(translator) => {
            state
                .runner
                .run_with(config, translator.as_ref(), items, on_item_translated)
                .await?
        }
        None => state.runner.run(config, items, on_item_translated).await?,
    };
    Ok(TranslateResponse {
        translations,
        report,
    })
}

async fn cancel(State(state): State<AppState>) -> StatusCode {
    state.runner.cancel();
    StatusCode::NO_CONTENT
}

async fn export(Json(request): Json<ExportRequest>) -> Result<Json<ExportResponse>, ApiError> {
    let rebuilt = match request.mode {
        ExportMode::Initial => {
            let items: Vec<FlatItem> = serde_json::from_value(request.items)
                .map_err(|e| ApiError::bad_request(format!("Invalid items: {}", e)))?;
            rebuild(&request.document, &items)?
        }
        ExportMode::Update => {
            let items: Vec<MergedItem> = serde_json::from_value(request.items)
                .map_err(|e| ApiError::bad_request(format!("Invalid items: {}", e)))?;
            rebuild(&request.document, &items)?
        }
    };

    let filename = export_filename(request.mode, request.format, Utc::now());
    let content = request.format.serialize(&rebuilt)?;
    info!(%filename, "Exported document");
    Ok(Json(ExportResponse { filename, content }))
}

async fn get_config(State(state): State<AppState>) -> Json<TranslationConfig> {
    Json(state.config.read().await.masked())
}

async fn put_config(
    State(state): State<AppState>,
    Json(mut incoming): Json<TranslationConfig>,
) -> Result<Json<TranslationConfig>, ApiError> {
    let mut current = state.config.write().await;
    // A masked key echoed back from GET means "unchanged"
    if incoming.api_key == MASKED_KEY {
        incoming.api_key = current.api_key.clone();
    }
    state.store.save(&incoming)?;
    *current = incoming;
    info!(endpoint = %current.endpoint, model = %current.model, "Config updated");
    Ok(Json(current.masked()))
}
