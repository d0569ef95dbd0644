use axum::{
    Router,
    extract::State,
    routing::{get, patch},
};

use crate::{
    dto::history::{CreateHistoryRequest, HistoryPatch},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::HistoryEntry,
    response::{ApiResponse, Paged},
    routes::params::Pagination,
    services::history_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_history).post(create_history).delete(clear_history),
        )
        .route("/{id}", patch(update_history).delete(delete_history))
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(Pagination),
    responses(
        (status = 200, description = "Scan log, newest first", body = ApiResponse<Paged<HistoryEntry>>)
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<ApiResponse<Paged<HistoryEntry>>> {
    history_service::list_history(&state, &user, pagination).await
}

#[utoipa::path(
    post,
    path = "/api/history",
    request_body = CreateHistoryRequest,
    responses(
        (status = 201, description = "Scan recorded", body = ApiResponse<HistoryEntry>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn create_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateHistoryRequest>,
) -> AppResult<ApiResponse<HistoryEntry>> {
    history_service::create_history(&state, &user, payload).await
}

#[utoipa::path(
    patch,
    path = "/api/history/{id}",
    params(("id" = i32, Path, description = "History entry ID")),
    request_body = HistoryPatch,
    responses(
        (status = 200, description = "Note updated", body = ApiResponse<HistoryEntry>),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "History entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn update_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<HistoryPatch>,
) -> AppResult<ApiResponse<HistoryEntry>> {
    history_service::update_history(&state, &user, id, patch).await
}

#[utoipa::path(
    delete,
    path = "/api/history/{id}",
    params(("id" = i32, Path, description = "History entry ID")),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "History entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn delete_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<()>> {
    history_service::delete_history(&state, &user, id).await
}

#[utoipa::path(
    delete,
    path = "/api/history",
    responses(
        (status = 200, description = "Number of removed entries", body = ApiResponse<u64>)
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn clear_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<u64>> {
    history_service::clear_history(&state, &user).await
}
