use axum::{Router, extract::State, routing::post};

use crate::{
    dto::auth::{LoginRequest, TokenForm, TokenResponse},
    error::AppResult,
    extract::{AppForm, AppJson},
    response::ApiResponse,
    services::auth_service::login_user,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/token", post(token))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    login_user(&state, payload).await
}

/// OAuth2 password flow, so API explorers can obtain a token directly.
#[utoipa::path(
    post,
    path = "/api/auth/token",
    request_body(content = TokenForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "Auth"
)]
pub async fn token(
    State(state): State<AppState>,
    AppForm(form): AppForm<TokenForm>,
) -> AppResult<ApiResponse<TokenResponse>> {
    login_user(&state, form.into()).await
}
