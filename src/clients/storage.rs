use async_trait::async_trait;
use reqwest::{Client, header};
use uuid::Uuid;

use super::{ClientError, ImageStore, image::decode_image};

const SERVICE: &str = "storage bucket";

/// Supabase storage REST API; objects land in a public bucket.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: super::http_client(SERVICE)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            bucket: bucket.into(),
        })
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }
}

#[async_trait]
impl ImageStore for SupabaseStorage {
    async fn upload_image(&self, image_base64: &str) -> Result<String, ClientError> {
        let image = decode_image(image_base64)?;
        let object_name = format!("{}.{}", Uuid::new_v4().simple(), image.extension());
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        );
        tracing::debug!(%object_name, bytes = image.bytes.len(), "uploading image");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(header::CONTENT_TYPE, image.mime.as_str())
            .body(image.bytes)
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

        Ok(self.public_url(&object_name))
    }
}
