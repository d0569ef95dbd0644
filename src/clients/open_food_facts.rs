use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{CatalogProduct, ClientError, ProductCatalog};

const SERVICE: &str = "Open Food Facts";
const UNKNOWN_NAME: &str = "Unknown Product Name";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    code: Option<String>,
    product_name_en: Option<String>,
    product_name: Option<String>,
    generic_name_en: Option<String>,
    generic_name: Option<String>,
    image_front_url: Option<String>,
    image_url: Option<String>,
    ingredients_text_en: Option<String>,
    ingredients_text: Option<String>,
    categories: Option<String>,
    brands: Option<String>,
}

fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

impl OffProduct {
    fn into_catalog(self, barcode: &str) -> CatalogProduct {
        let name = first_present(&[
            &self.product_name_en,
            &self.product_name,
            &self.generic_name_en,
            &self.generic_name,
        ])
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        CatalogProduct {
            barcode: self
                .code
                .clone()
                .filter(|code| !code.trim().is_empty())
                .unwrap_or_else(|| barcode.to_string()),
            name,
            image_url: first_present(&[&self.image_front_url, &self.image_url]),
            generic_name: first_present(&[&self.generic_name_en, &self.generic_name]),
            ingredients: first_present(&[&self.ingredients_text_en, &self.ingredients_text]),
            categories: first_present(&[&self.categories]),
            brands: first_present(&[&self.brands]),
        }
    }
}

#[derive(Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: super::http_client(SERVICE)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ProductCatalog for OpenFoodFactsClient {
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, ClientError> {
        let url = format!("{}/api/v2/product/{}.json", self.base_url, barcode);
        tracing::debug!(%url, "looking up barcode");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                service: SERVICE,
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: response.status(),
            });
        }

        let body: LookupResponse = response.json().await.map_err(|e| ClientError::Payload {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        Ok(parse_lookup(body, barcode))
    }
}

fn parse_lookup(body: LookupResponse, barcode: &str) -> Option<CatalogProduct> {
    if body.status != 1 {
        return None;
    }
    body.product.map(|p| p.into_catalog(barcode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<CatalogProduct> {
        parse_lookup(serde_json::from_str(raw).unwrap(), "0000000000000")
    }

    #[test]
    fn missing_product_is_none() {
        assert!(parse(r#"{"status":0,"status_verbose":"product not found"}"#).is_none());
    }

    #[test]
    fn name_falls_back_through_variants() {
        let p = parse(
            r#"{"status":1,"product":{"code":"3017620422003","product_name":"","generic_name":"Hazelnut spread","brands":"Ferrero"}}"#,
        )
        .unwrap();
        assert_eq!(p.name, "Hazelnut spread");
        assert_eq!(p.barcode, "3017620422003");
        assert_eq!(p.brands.as_deref(), Some("Ferrero"));
    }

    #[test]
    fn unnamed_product_gets_placeholder() {
        let p = parse(r#"{"status":1,"product":{}}"#).unwrap();
        assert_eq!(p.name, UNKNOWN_NAME);
        assert_eq!(p.barcode, "0000000000000");
    }

    #[test]
    fn front_image_preferred() {
        let p = parse(
            r#"{"status":1,"product":{"image_url":"https://img/a.jpg","image_front_url":"https://img/front.jpg"}}"#,
        )
        .unwrap();
        assert_eq!(p.image_url.as_deref(), Some("https://img/front.jpg"));
    }
}
