//! Audit API handlers

use super::audit_dto::{
    AddAuditItemRequest, ApiResponse, AuditEntryResponse, AuditItemResponse, PagedResponse,
    WriteAuditEntryRequest,
};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::config::AuditConfig;
use crate::domain::audit::{AuditItemFilter, AuditService, AuditType, PagedItemsOptions};
use crate::domain::shared::{Direction, DomainError, Paging};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state of the audit API
#[derive(Clone)]
pub struct AppState {
    pub audit_service: Arc<dyn AuditService>,
    pub audit_config: AuditConfig,
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(status: StatusCode, data: T) -> ApiResult<T> {
    (status, Json(ApiResponse::success(data)))
}

fn bad_request<T>(message: String) -> ApiResult<T> {
    warn!("API: Bad request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

fn failure<T>(e: DomainError) -> ApiResult<T> {
    if e.is_validation() {
        return bad_request(e.to_string());
    }
    error!("API: Audit operation failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(e.to_string())),
    )
}

/// Query parameters of the paged item listings
#[derive(Debug, Default, Deserialize)]
pub struct PagedItemsQuery {
    #[serde(default)]
    pub page_index: u64,
    pub page_size: Option<u32>,
    pub direction: Option<String>,
    /// Comma separated audit types
    pub audit_types: Option<String>,
    pub comment_contains: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub user_id: Option<i32>,
    pub entity_id: Option<i32>,
}

impl PagedItemsQuery {
    fn options(&self) -> Result<PagedItemsOptions, String> {
        let mut options = PagedItemsOptions::default();

        if let Some(ref dir) = self.direction {
            options.direction =
                Direction::parse(dir).ok_or_else(|| format!("Unknown direction '{}'", dir))?;
        }

        if let Some(ref types) = self.audit_types {
            let parsed = parse_audit_types(types)?;
            if !parsed.is_empty() {
                options.audit_types = Some(parsed);
            }
        }

        let filter = AuditItemFilter {
            comment_contains: self.comment_contains.clone().filter(|c| !c.is_empty()),
            created_from: self.created_from,
            created_to: self.created_to,
            user_id: self.user_id,
            entity_id: self.entity_id,
        };
        if !filter.is_empty() {
            options.filter = Some(filter);
        }

        Ok(options)
    }
}

fn parse_audit_types(s: &str) -> Result<Vec<AuditType>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| AuditType::from_str(t).ok_or_else(|| format!("Unknown audit type '{}'", t)))
        .collect()
}

/// Query parameters of the entry page listing
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page_index: u64,
    pub page_size: Option<u32>,
}

/// Query parameters of the log listing
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub audit_type: String,
    pub since: Option<DateTime<Utc>>,
    pub user_id: Option<i32>,
}

/// Record an audit item
pub async fn add_item(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddAuditItemRequest>,
) -> ApiResult<()> {
    info!(
        "API: Recording audit item {} on object {} by user {}",
        req.audit_type, req.object_id, req.user_id
    );

    let audit_type = match AuditType::from_str(&req.audit_type) {
        Some(t) => t,
        None => return bad_request(format!("Unknown audit type '{}'", req.audit_type)),
    };

    match state
        .audit_service
        .add(audit_type, &req.comment, req.user_id, req.object_id)
        .await
    {
        Ok(()) => ok(StatusCode::CREATED, ()),
        Err(e) => failure(e),
    }
}

/// Paged audit trail of an entity
pub async fn get_items_by_entity(
    State(state): State<AppState>,
    ApiPath(entity_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PagedItemsQuery>,
) -> ApiResult<PagedResponse<AuditItemResponse>> {
    info!("API: Listing audit items for entity {}", entity_id);

    let options = match query.options() {
        Ok(options) => options,
        Err(message) => return bad_request(message),
    };
    let paging = Paging::new(query.page_index, state.audit_config.page_size(query.page_size));

    match state
        .audit_service
        .get_paged_items_by_entity(entity_id, paging, options)
        .await
    {
        Ok(page) => ok(StatusCode::OK, PagedResponse::from_page(page, paging)),
        Err(e) => failure(e),
    }
}

/// Paged audit trail of a user
pub async fn get_items_by_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PagedItemsQuery>,
) -> ApiResult<PagedResponse<AuditItemResponse>> {
    info!("API: Listing audit items for user {}", user_id);

    let options = match query.options() {
        Ok(options) => options,
        Err(message) => return bad_request(message),
    };
    let paging = Paging::new(query.page_index, state.audit_config.page_size(query.page_size));

    match state
        .audit_service
        .get_paged_items_by_user(user_id, paging, options)
        .await
    {
        Ok(page) => ok(StatusCode::OK, PagedResponse::from_page(page, paging)),
        Err(e) => failure(e),
    }
}

/// Items of one audit type, optionally for one user
pub async fn get_logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> ApiResult<Vec<AuditItemResponse>> {
    info!("API: Listing {} logs", query.audit_type);

    let audit_type = match AuditType::from_str(&query.audit_type) {
        Some(t) => t,
        None => return bad_request(format!("Unknown audit type '{}'", query.audit_type)),
    };

    let result = match query.user_id {
        Some(user_id) => {
            state
                .audit_service
                .get_user_logs(user_id, audit_type, query.since)
                .await
        }
        None => state.audit_service.get_logs(audit_type, query.since).await,
    };

    match result {
        Ok(items) => ok(StatusCode::OK, items.into_iter().map(Into::into).collect()),
        Err(e) => failure(e),
    }
}

/// Write an audit entry
pub async fn write_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WriteAuditEntryRequest>,
) -> ApiResult<AuditEntryResponse> {
    info!("API: Writing audit entry {}", req.event_type);

    match state.audit_service.write(req.into()).await {
        Ok(entry) => ok(StatusCode::CREATED, entry.into()),
        Err(e) => failure(e),
    }
}

/// All audit entries
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Vec<AuditEntryResponse>> {
    info!("API: Listing audit entries");

    match state.audit_service.get().await {
        Ok(entries) => ok(StatusCode::OK, entries.into_iter().map(Into::into).collect()),
        Err(e) => failure(e),
    }
}

/// One page of audit entries
pub async fn get_entries_page(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<PagedResponse<AuditEntryResponse>> {
    let paging = Paging::new(query.page_index, state.audit_config.page_size(query.page_size));
    info!(
        "API: Paging audit entries (index: {}, size: {})",
        paging.page_index, paging.page_size
    );

    match state.audit_service.get_page(paging).await {
        Ok(page) => ok(StatusCode::OK, PagedResponse::from_page(page, paging)),
        Err(e) => failure(e),
    }
}

/// Liveness probe
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}
