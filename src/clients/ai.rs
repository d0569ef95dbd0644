use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{AiEngine, ClientError, EMBEDDING_DIM, HealthAssessment, ProductIdentity, normalize};

const SERVICE: &str = "AI service";

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthRequest<'a> {
    image: &'a str,
    dietary_pref: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodeResponse {
    text_description_embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    response: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInfo {
    product_name: String,
    product_manufacturer: Option<String>,
    product_description: Option<String>,
}

#[derive(Deserialize)]
struct HealthSuggestion {
    opinion: String,
    reason: String,
}

#[derive(Clone)]
pub struct HttpAiEngine {
    client: Client,
    base_url: String,
}

impl HttpAiEngine {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: super::http_client(SERVICE)?,
            base_url: base_url.into(),
        })
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "calling AI service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: response.status(),
            });
        }

        response.json::<R>().await.map_err(|e| ClientError::Payload {
            service: SERVICE,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl AiEngine for HttpAiEngine {
    async fn encode_image(&self, image_base64: &str) -> Result<Vec<f32>, ClientError> {
        let resp: EncodeResponse = self
            .post("image-encode", &ImageRequest { image: image_base64 })
            .await?;
        check_dimension(&resp.text_description_embedding)?;
        Ok(normalize(resp.text_description_embedding))
    }

    async fn identify_product(&self, image_base64: &str) -> Result<ProductIdentity, ClientError> {
        let resp: Wrapped<ProductInfo> = self
            .post("product-info", &ImageRequest { image: image_base64 })
            .await?;
        let info = resp.response;
        Ok(ProductIdentity {
            name: info.product_name,
            manufacturer: info.product_manufacturer.filter(|m| !m.trim().is_empty()),
            description: info.product_description.filter(|d| !d.trim().is_empty()),
        })
    }

    async fn suggest_health_assessment(
        &self,
        image_base64: &str,
        dietary_flags: &[String],
    ) -> Result<HealthAssessment, ClientError> {
        let body = HealthRequest {
            image: image_base64,
            dietary_pref: dietary_flags.join(","),
        };
        let resp: Wrapped<HealthSuggestion> = self.post("health-suggestion", &body).await?;
        Ok(HealthAssessment {
            conclusion: resp.response.opinion,
            rationale: resp.response.reason,
        })
    }
}

fn check_dimension(vector: &[f32]) -> Result<(), ClientError> {
    if vector.len() != EMBEDDING_DIM {
        return Err(ClientError::Payload {
            service: SERVICE,
            reason: format!(
                "embedding has {} dimensions, expected {EMBEDDING_DIM}",
                vector.len()
            ),
        });
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(ClientError::Payload {
            service: SERVICE,
            reason: "embedding contains non-finite values".into(),
        });
    }
    Ok(())
}
