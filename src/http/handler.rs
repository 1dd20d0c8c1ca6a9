//! HTTP handlers for the org panel API

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crate::chat::ChatDispatcher;
use crate::org::{
    Directory, EmployeeId, ExpansionResolver, OrgTreeBuilder, PrincipalName, Roster, StoreError,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

/// Shared, read-only services behind every handler
#[derive(Clone)]
pub struct AppState {
    pub directory: Directory,
    pub builder: OrgTreeBuilder,
    pub resolver: ExpansionResolver,
    pub roster: Roster,
    pub chat: ChatDispatcher,
}

impl AppState {
    pub fn new(directory: Directory, max_chain_depth: usize) -> Self {
        let builder = OrgTreeBuilder::new(directory.clone()).with_max_depth(max_chain_depth);
        Self {
            resolver: ExpansionResolver::new(directory.clone()),
            roster: Roster::new(directory.clone()),
            chat: ChatDispatcher::new(directory.clone(), builder.clone()),
            builder,
            directory,
        }
    }
}

/// Error responses with a JSON `{"error": ...}` body
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(&'static str),
    /// Store failure; the message is what the client sees
    Internal(&'static str, String),
}

impl ApiError {
    fn store(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |e| ApiError::Internal(message, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m, cause) => {
                error!("{}: {}", m, cause);
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn status_handler(State(state): State<AppState>) -> ApiResult {
    let users = state
        .directory
        .store()
        .all_users()
        .await
        .map_err(ApiError::store("Failed to fetch status"))?;
    Ok(Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "storage": {
            "users": users.len(),
        }
    }))
    .into_response())
}

pub async fn users_handler(State(state): State<AppState>) -> ApiResult {
    let users = state
        .roster
        .all_users()
        .await
        .map_err(ApiError::store("Failed to fetch users"))?;
    Ok(Json(users).into_response())
}

pub async fn users_with_location_handler(State(state): State<AppState>) -> ApiResult {
    let users = state
        .roster
        .users_with_location()
        .await
        .map_err(ApiError::store("Failed to fetch users with location"))?;
    Ok(Json(users).into_response())
}

pub async fn user_by_principal_handler(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> ApiResult {
    let user = state
        .directory
        .employee_by_principal(&PrincipalName::new(principal))
        .await
        .map_err(ApiError::store("Failed to fetch user"))?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user).into_response())
}

pub async fn photo_handler(State(state): State<AppState>, Path(principal): Path<String>) -> ApiResult {
    let photo = state
        .directory
        .store()
        .photo(&PrincipalName::new(principal))
        .await
        .map_err(ApiError::store("Failed to fetch user photo"))?
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::NotFound("Photo not found"))?;
    Ok(Json(json!({ "photo": photo })).into_response())
}

/// Body is parsed by hand so a non-array `userPrincipalNames` is a 400
pub async fn photos_handler(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> ApiResult {
    let upns: Vec<PrincipalName> = body
        .get("userPrincipalNames")
        .and_then(|v| v.as_array())
        .ok_or(ApiError::BadRequest("userPrincipalNames must be an array"))?
        .iter()
        .filter_map(|v| v.as_str())
        .map(PrincipalName::from)
        .collect();

    let photos = state
        .directory
        .store()
        .photos(&upns)
        .await
        .map_err(ApiError::store("Failed to fetch user photos"))?;
    Ok(Json(photos).into_response())
}

pub async fn user_by_id_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let user = state
        .directory
        .employee_by_id(&EmployeeId::new(id))
        .await
        .map_err(ApiError::store("Failed to fetch user"))?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user).into_response())
}

pub async fn direct_reports_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let reports = state
        .resolver
        .direct_reports(&EmployeeId::new(id))
        .await
        .map_err(ApiError::store("Failed to fetch direct reports"))?;
    Ok(Json(reports).into_response())
}

pub async fn direct_reports_details_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    let reports = state
        .resolver
        .direct_reports_details(&EmployeeId::new(id))
        .await
        .map_err(ApiError::store("Failed to fetch direct reports details"))?;
    Ok(Json(reports).into_response())
}

pub async fn management_chain_handler(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> ApiResult {
    let chain = state
        .builder
        .management_chain(&PrincipalName::new(principal))
        .await;
    Ok(Json(chain).into_response())
}

/// `null` body when the principal has no user record
pub async fn org_tree_handler(State(state): State<AppState>, Path(principal): Path<String>) -> ApiResult {
    let tree = state
        .builder
        .build(&PrincipalName::new(principal))
        .await
        .map_err(ApiError::store("Failed to fetch org tree"))?;
    Ok(Json(tree).into_response())
}

pub async fn search_handler(State(state): State<AppState>, Path(term): Path<String>) -> ApiResult {
    let users = state
        .roster
        .search(&term)
        .await
        .map_err(ApiError::store("Failed to search users"))?;
    Ok(Json(users).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LocationFilter {
    pub city: Option<String>,
    pub country: Option<String>,
}

pub async fn location_filter_handler(
    State(state): State<AppState>,
    Query(filter): Query<LocationFilter>,
) -> ApiResult {
    let users = state
        .roster
        .users_by_location(filter.city.as_deref(), filter.country.as_deref())
        .await
        .map_err(ApiError::store("Failed to fetch users by location"))?;
    Ok(Json(users).into_response())
}

pub async fn location_stats_handler(State(state): State<AppState>) -> ApiResult {
    let stats = state
        .roster
        .location_stats()
        .await
        .map_err(ApiError::store("Failed to fetch location stats"))?;
    Ok(Json(stats).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

pub async fn chat_handler(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> ApiResult {
    let message = payload
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ApiError::BadRequest("Message is required"))?;
    let principal = payload.user_principal_name.map(PrincipalName::new);

    let response = state
        .chat
        .respond(&message, principal.as_ref())
        .await
        .map_err(|e| ApiError::Internal("Failed to process chat message", e.to_string()))?;
    Ok(Json(json!({ "response": response })).into_response())
}
