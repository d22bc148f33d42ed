// 🌐 REST API with Axum
//
// Routes (mounted under /api):
//   GET    /health
//   GET    /WolfItems          list
//   POST   /WolfItems          create   → 201 + Location
//   GET    /WolfItems/:id      get
//   PUT    /WolfItems/:id      replace  → 204
//   DELETE /WolfItems/:id      delete   → removed record

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::service::{ServiceError, WolfService};
use crate::store::WolfStore;
use crate::wolf::WolfRecord;

pub const WOLF_ITEMS_PATH: &str = "/api/WolfItems";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<WolfService<Arc<dyn WolfStore>>>,
}

impl AppState {
    pub fn new(service: WolfService<Arc<dyn WolfStore>>) -> Self {
        AppState {
            service: Arc::new(service),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::ValidationFailed(_) | ServiceError::IdMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("store failure: {}", self);
        }

        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

/// Everything a handler can fail with: extractor rejections or service errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => err.status(),
            // JSON that doesn't fit WolfRecord (gender out of i32, null fields) is a bad request
            ApiError::Body(rejection)
                if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                StatusCode::BAD_REQUEST
            }
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Path(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => err.into_response(),
            rejection => {
                let status = rejection.status();
                (status, Json(ApiResponse::<()>::err(rejection.to_string()))).into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/WolfItems - All wolves
async fn list_wolves(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<WolfRecord>>>> {
    let wolves = state.service.list()?;
    Ok(Json(ApiResponse::ok(wolves)))
}

/// GET /api/WolfItems/:id - One wolf or 404
async fn get_wolf(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<WolfRecord>>> {
    let Path(id) = id?;
    let wolf = state.service.get(id)?;
    Ok(Json(ApiResponse::ok(wolf)))
}

/// POST /api/WolfItems - Validate and create
async fn create_wolf(
    State(state): State<AppState>,
    record: Result<Json<WolfRecord>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(record) = record?;
    let created = state.service.create(&record)?;
    let location = format!("{}/{}", WOLF_ITEMS_PATH, created.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::ok(created)),
    )
        .into_response())
}

/// PUT /api/WolfItems/:id - Validate and replace
async fn replace_wolf(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    record: Result<Json<WolfRecord>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Json(record) = record?;
    state.service.replace(id, &record)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/WolfItems/:id - Remove and return the removed wolf
async fn delete_wolf(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<WolfRecord>>> {
    let Path(id) = id?;
    let removed = state.service.delete(id)?;
    Ok(Json(ApiResponse::ok(removed)))
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/WolfItems", get(list_wolves).post(create_wolf))
        .route(
            "/WolfItems/:id",
            get(get_wolf).put(replace_wolf).delete(delete_wolf),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
