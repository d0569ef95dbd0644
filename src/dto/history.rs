use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryRequest {
    pub product_id: i32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryPatch {
    pub note: Option<String>,
}
