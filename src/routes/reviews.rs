use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::reviews::ReviewPatch,
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{Review, ReviewFeedItem},
    response::{ApiResponse, Paged},
    routes::params::Pagination,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route(
            "/{id}",
            get(get_review).patch(update_review).delete(delete_review),
        )
        .route("/{id}/like", post(like_review))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    params(Pagination),
    responses(
        (status = 200, description = "Newest reviews first", body = ApiResponse<Paged<ReviewFeedItem>>)
    ),
    tag = "Reviews"
)]
pub async fn feed(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<ApiResponse<Paged<ReviewFeedItem>>> {
    review_service::list_feed(&state, pagination).await
}

#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Get review", body = ApiResponse<Review>),
        (status = 404, description = "Review not found")
    ),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<Review>> {
    review_service::get_review(&state, id).await
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<ReviewPatch>,
) -> AppResult<ApiResponse<Review>> {
    review_service::update_review(&state, &user, id, patch).await
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<()>> {
    review_service::delete_review(&state, &user, id).await
}

#[utoipa::path(
    post,
    path = "/api/reviews/{id}/like",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Like recorded", body = ApiResponse<Review>),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn like_review(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<Review>> {
    review_service::like_review(&state, id).await
}
