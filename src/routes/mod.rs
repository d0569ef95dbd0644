use axum::{Router, http::Uri, routing::get};

use crate::{error::AppError, state::AppState};

pub mod auth;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod history;
pub mod params;
pub mod products;
pub mod reviews;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/history", history::router())
        .nest("/badges", catalog::badges_router())
        .nest("/health-flags", catalog::health_flags_router())
}

/// The full application without transport layers, shared by `main` and the tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "no route");
    AppError::NotFound("Route")
}
