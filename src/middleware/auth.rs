use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::{error::AppError, services::auth_service::resolve_current_user, state::AppState};

/// The authenticated caller, loaded from the bearer token on each request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
}

impl AuthUser {
    pub fn ensure_owner(&self, owner_id: i32) -> Result<(), AppError> {
        if self.user_id != owner_id {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let user = resolve_current_user(state, token).await?;
        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
