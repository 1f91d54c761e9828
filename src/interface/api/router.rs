//! API Router configuration

use super::audit_handler::{
    add_item, get_entries_page, get_items_by_entity, get_items_by_user, get_logs, health_check,
    list_entries, write_entry, AppState,
};
use super::metrics_handler::metrics_handler;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Health check route (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    // Audit item routes
    let item_routes = Router::new()
        .route("/audit/items", post(add_item))
        .route("/audit/items/entity/:entity_id", get(get_items_by_entity))
        .route("/audit/items/user/:user_id", get(get_items_by_user))
        .route("/audit/logs", get(get_logs));

    // Audit entry routes
    let entry_routes = Router::new()
        .route("/audit/entries", get(list_entries).post(write_entry))
        .route("/audit/entries/page", get(get_entries_page));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    // Combine routes with state
    Router::new()
        .merge(health_routes)
        .merge(item_routes)
        .merge(entry_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
