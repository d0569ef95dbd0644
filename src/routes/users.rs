use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::users::{AwardBadgeRequest, HealthFlagsUpdate, RegisterUserRequest, UserPatch},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{EarnedBadge, Review, ScanStatistics, UserProfile},
    response::{ApiResponse, Paged},
    routes::params::Pagination,
    services::{review_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list_users))
        .route("/me", get(me).patch(update_me).delete(delete_me))
        .route(
            "/me/health-flags",
            get(my_health_flags).put(replace_health_flags),
        )
        .route("/me/badges", get(my_badges).post(award_badge))
        .route("/me/scan-statistics", get(scan_statistics))
        .route("/{id}", get(get_user))
        .route("/{id}/reviews", get(user_reviews))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterUserRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    user_service::register_user(&state, payload).await
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(Pagination),
    responses(
        (status = 200, description = "List users", body = ApiResponse<Paged<UserProfile>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<ApiResponse<Paged<UserProfile>>> {
    user_service::list_users(&state, pagination).await
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserProfile>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<UserProfile>> {
    user_service::get_profile(&state, user.user_id).await
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserProfile>),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(patch): AppJson<UserPatch>,
) -> AppResult<ApiResponse<UserProfile>> {
    user_service::update_me(&state, &user, patch).await
}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "User and owned rows deleted")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<()>> {
    user_service::delete_me(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/users/me/health-flags",
    responses(
        (status = 200, description = "Current user's health flags", body = ApiResponse<Vec<String>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn my_health_flags(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Vec<String>>> {
    user_service::get_health_flags(&state, &user).await
}

#[utoipa::path(
    put,
    path = "/api/users/me/health-flags",
    request_body = HealthFlagsUpdate,
    responses(
        (status = 200, description = "Health flags replaced", body = ApiResponse<Vec<String>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn replace_health_flags(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<HealthFlagsUpdate>,
) -> AppResult<ApiResponse<Vec<String>>> {
    user_service::set_health_flags(&state, &user, payload.health_flags).await
}

#[utoipa::path(
    get,
    path = "/api/users/me/badges",
    responses(
        (status = 200, description = "Badges earned by the current user", body = ApiResponse<Vec<EarnedBadge>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn my_badges(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Vec<EarnedBadge>>> {
    user_service::list_my_badges(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/users/me/badges",
    request_body = AwardBadgeRequest,
    responses(
        (status = 200, description = "Badge awarded", body = ApiResponse<EarnedBadge>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn award_badge(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AwardBadgeRequest>,
) -> AppResult<ApiResponse<EarnedBadge>> {
    user_service::award_badge_by_name(&state, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/users/me/scan-statistics",
    responses(
        (status = 200, description = "Scan counters", body = ApiResponse<ScanStatistics>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn scan_statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ScanStatistics>> {
    user_service::scan_statistics(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<UserProfile>> {
    user_service::get_profile(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/reviews",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reviews written by the user", body = ApiResponse<Vec<Review>>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn user_reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<Vec<Review>>> {
    review_service::list_user_reviews(&state, id).await
}
