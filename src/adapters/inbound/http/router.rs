use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    add_package_update, create_package, delete_package, get_package, health, list_packages,
};
use crate::ports::services::PackageService;

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub package_service: Arc<dyn PackageService>,
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/packages", create_package_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create a router with just the package operations
pub fn create_package_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route("/{code}", get(get_package).delete(delete_package))
        .route("/{code}/updates", post(add_package_update))
        // Older clients delete through a dedicated sub-resource
        .route("/{code}/deletes", delete(delete_package))
}
