use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata carried next to list payloads.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page,
            per_page,
            total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub meta: Meta,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, meta: Meta) -> Self {
        Self { items, meta }
    }
}

/// Uniform envelope for every body this service returns. `code` always equals
/// the HTTP status of the response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub data: Option<T>,
    pub msg: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(msg: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, msg, Some(data))
    }

    pub fn created(msg: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, msg, Some(data))
    }

    /// Successful outcome without a payload.
    pub fn empty(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, msg, None)
    }

    pub fn with_status(status: StatusCode, msg: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            data,
            msg: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
