use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    config::JwtConfig,
    dto::auth::{Claims, LoginRequest, TokenResponse},
    entity::users::{self, Entity as Users},
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// A stored value that does not parse as a PHC hash never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(jwt: &JwtConfig, user: &users::Model, ttl: Duration) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.email.clone(),
        uid: user.id,
        iat: now.timestamp().max(0) as usize,
        exp: expiration.timestamp().max(0) as usize,
    };

    encode(
        &Header::new(jwt.algorithm),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Verifies signature and expiry. Every failure collapses to `Unauthenticated`.
pub fn decode_token(jwt: &JwtConfig, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(jwt.algorithm);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated)
}

/// Resolves a bearer token to the user row it was issued for. Changing the
/// account email invalidates tokens issued under the old one.
pub async fn resolve_current_user(state: &AppState, token: &str) -> AppResult<users::Model> {
    let claims = decode_token(&state.jwt, token)?;
    let user = Users::find_by_id(claims.uid)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    ensure_subject(&claims, user)
}

fn ensure_subject(claims: &Claims, user: users::Model) -> AppResult<users::Model> {
    if user.email != claims.sub {
        tracing::debug!(user_id = user.id, "token subject no longer matches account");
        return Err(AppError::Unauthenticated);
    }
    Ok(user)
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    // Unknown email and wrong password are reported identically.
    let user = match user {
        Some(u) if verify_password(&password, &u.hashed_password) => u,
        _ => {
            tracing::info!("rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }
    };

    let ttl = Duration::minutes(state.jwt.ttl_minutes);
    let token = issue_token(&state.jwt, &user, ttl)?;
    tracing::debug!(user_id = user.id, "issued access token");

    Ok(ApiResponse::success(
        "Login successful, token generated",
        TokenResponse {
            access_token: token,
            token_type: "bearer".into(),
            expires_in: ttl.num_seconds(),
        },
    ))
}
