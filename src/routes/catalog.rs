use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::users::CreateHealthFlagRequest,
    error::AppResult,
    extract::{AppJson, AppPath},
    middleware::auth::AuthUser,
    models::{Badge, EarnedBadge, HealthFlag},
    response::ApiResponse,
    services::{catalog_service, user_service},
    state::AppState,
};

pub fn badges_router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_badges))
        .route("/all", get(all_badges))
        .route("/{id}", post(award_badge))
}

pub fn health_flags_router() -> Router<AppState> {
    Router::new().route("/", get(list_health_flags).post(create_health_flag))
}

#[utoipa::path(
    get,
    path = "/api/badges/all",
    responses(
        (status = 200, description = "Badge catalog", body = ApiResponse<Vec<Badge>>)
    ),
    tag = "Badges"
)]
pub async fn all_badges(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Badge>>> {
    catalog_service::list_badges(&state).await
}

#[utoipa::path(
    get,
    path = "/api/badges",
    responses(
        (status = 200, description = "Badges earned by the current user", body = ApiResponse<Vec<EarnedBadge>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Badges"
)]
pub async fn my_badges(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Vec<EarnedBadge>>> {
    user_service::list_my_badges(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/badges/{id}",
    params(("id" = i32, Path, description = "Badge ID")),
    responses(
        (status = 200, description = "Badge awarded", body = ApiResponse<EarnedBadge>),
        (status = 404, description = "Badge not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Badges"
)]
pub async fn award_badge(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<EarnedBadge>> {
    catalog_service::award_badge(&state, &user, id).await
}

#[utoipa::path(
    get,
    path = "/api/health-flags",
    responses(
        (status = 200, description = "Health flag catalog", body = ApiResponse<Vec<HealthFlag>>)
    ),
    tag = "Health flags"
)]
pub async fn list_health_flags(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<HealthFlag>>> {
    catalog_service::list_health_flags(&state).await
}

#[utoipa::path(
    post,
    path = "/api/health-flags",
    request_body = CreateHealthFlagRequest,
    responses(
        (status = 201, description = "Health flag created", body = ApiResponse<HealthFlag>),
        (status = 409, description = "Health flag already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Health flags"
)]
pub async fn create_health_flag(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateHealthFlagRequest>,
) -> AppResult<ApiResponse<HealthFlag>> {
    catalog_service::create_health_flag(&state, payload).await
}
