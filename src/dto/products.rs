use sea_orm::Set;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    entity::products,
    error::AppResult,
    validation::{validate_barcode, validate_name},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub generic_name: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Option<String>,
    pub brands: Option<String>,
}

/// Explicit partial update: an absent field keeps its value, an empty string
/// clears an optional text field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub generic_name: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub ai_health_summary: Option<String>,
    pub ai_health_conclusion: Option<String>,
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional_barcode(value: Option<String>) -> AppResult<Option<String>> {
    match value.and_then(optional_text) {
        Some(code) => validate_barcode(&code).map(Some),
        None => Ok(None),
    }
}

impl CreateProductRequest {
    pub fn into_active_model(self) -> AppResult<products::ActiveModel> {
        Ok(products::ActiveModel {
            name: Set(validate_name("Name", &self.name)?),
            barcode: Set(optional_barcode(self.barcode)?),
            image_url: Set(self.image_url.and_then(optional_text)),
            generic_name: Set(self.generic_name.and_then(optional_text)),
            ingredients: Set(self.ingredients.and_then(optional_text)),
            categories: Set(self.categories.and_then(optional_text)),
            brands: Set(self.brands.and_then(optional_text)),
            ..Default::default()
        })
    }
}

impl ProductPatch {
    pub fn apply(self, active: &mut products::ActiveModel) -> AppResult<()> {
        if let Some(name) = self.name {
            active.name = Set(validate_name("Name", &name)?);
        }
        if let Some(barcode) = self.barcode {
            active.barcode = Set(optional_barcode(Some(barcode))?);
        }
        if let Some(image_url) = self.image_url {
            active.image_url = Set(optional_text(image_url));
        }
        if let Some(generic_name) = self.generic_name {
            active.generic_name = Set(optional_text(generic_name));
        }
        if let Some(ingredients) = self.ingredients {
            active.ingredients = Set(optional_text(ingredients));
        }
        if let Some(categories) = self.categories {
            active.categories = Set(optional_text(categories));
        }
        if let Some(brands) = self.brands {
            active.brands = Set(optional_text(brands));
        }
        if let Some(summary) = self.ai_health_summary {
            active.ai_health_summary = Set(optional_text(summary));
        }
        if let Some(conclusion) = self.ai_health_conclusion {
            active.ai_health_conclusion = Set(optional_text(conclusion));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BarcodeScanRequest {
    pub barcode: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageScanRequest {
    #[serde(alias = "base64Image")]
    pub base64image: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthSuggestionRequest {
    pub product_id: i32,
    #[serde(alias = "base64Image")]
    pub base64image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut active = products::ActiveModel::default();
        ProductPatch {
            name: Some("  Sparkling Water ".into()),
            brands: Some("".into()),
            ..Default::default()
        }
        .apply(&mut active)
        .unwrap();

        assert_eq!(active.name, ActiveValue::Set("Sparkling Water".to_string()));
        assert_eq!(active.brands, ActiveValue::Set(None));
        assert!(matches!(active.categories, ActiveValue::NotSet));
        assert!(matches!(active.barcode, ActiveValue::NotSet));
    }

    #[test]
    fn patch_rejects_blank_name_and_bad_barcode() {
        let mut active = products::ActiveModel::default();
        assert!(ProductPatch { name: Some(" ".into()), ..Default::default() }
            .apply(&mut active)
            .is_err());
        assert!(ProductPatch { barcode: Some("abc".into()), ..Default::default() }
            .apply(&mut active)
            .is_err());
    }

    #[test]
    fn create_request_trims_optional_text() {
        let active = CreateProductRequest {
            name: "Cola".into(),
            barcode: Some(" ".into()),
            image_url: None,
            generic_name: Some(" soda ".into()),
            ingredients: None,
            categories: None,
            brands: None,
        }
        .into_active_model()
        .unwrap();
        assert_eq!(active.barcode, ActiveValue::Set(None));
        assert_eq!(active.generic_name, ActiveValue::Set(Some("soda".into())));
    }
}
