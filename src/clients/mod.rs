//! Adapters for the remote collaborators: the AI inference service, the image
//! bucket and the open product catalog. Each is a trait so handlers can be
//! exercised against fakes; the reqwest implementations are built once at
//! startup and shared through [`crate::state::AppState`].

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;

pub mod ai;
pub mod image;
pub mod open_food_facts;
pub mod storage;

pub use ai::HttpAiEngine;
pub use open_food_facts::OpenFoodFactsClient;
pub use storage::SupabaseStorage;

/// Fixed dimension of `products.image_embedding`.
pub const EMBEDDING_DIM: usize = 1536;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{service} returned an unexpected payload: {reason}")]
    Payload {
        service: &'static str,
        reason: String,
    },

    #[error("invalid image: {0}")]
    Image(String),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match &err {
            ClientError::Image(reason) => AppError::Validation(format!("Invalid image: {reason}")),
            ClientError::Transport { service, .. }
            | ClientError::Status { service, .. }
            | ClientError::Payload { service, .. } => AppError::Upstream {
                service: *service,
                detail: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductIdentity {
    pub name: String,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthAssessment {
    /// Short categorical verdict such as `safe`, `unsafe` or `unknown`.
    pub conclusion: String,
    pub rationale: String,
}

/// Product data fetched from an external catalog by barcode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogProduct {
    pub barcode: String,
    pub name: String,
    pub image_url: Option<String>,
    pub generic_name: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Option<String>,
    pub brands: Option<String>,
}

#[async_trait]
pub trait AiEngine: Send + Sync {
    /// Embeds an image into a unit-length vector of [`EMBEDDING_DIM`] entries.
    async fn encode_image(&self, image_base64: &str) -> Result<Vec<f32>, ClientError>;

    async fn identify_product(&self, image_base64: &str) -> Result<ProductIdentity, ClientError>;

    async fn suggest_health_assessment(
        &self,
        image_base64: &str,
        dietary_flags: &[String],
    ) -> Result<HealthAssessment, ClientError>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the decoded image under a fresh object name and returns its public URL.
    async fn upload_image(&self, image_base64: &str) -> Result<String, ClientError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` when the catalog does not know the barcode.
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, ClientError>;
}

/// Scales `vector` to unit length. A zero vector is returned unchanged.
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return vector;
    }
    for v in &mut vector {
        *v = (f64::from(*v) / norm) as f32;
    }
    vector
}

pub(crate) fn http_client(service: &'static str) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .user_agent(concat!("flavorpal-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ClientError::Transport { service, source })
}
