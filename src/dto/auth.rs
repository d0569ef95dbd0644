use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-grant form; `username` carries the email.
#[derive(Deserialize, Debug, ToSchema)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

impl From<TokenForm> for LoginRequest {
    fn from(form: TokenForm) -> Self {
        Self {
            email: form.username,
            password: form.password,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub uid: i32,
    pub iat: usize,
    pub exp: usize,
}
