//! Wire-format output shapes. They never carry the password hash or the image
//! embedding, and flatten join rows into plain name lists.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::{badges, health_flags, history, products, reviews, users};

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub health_flags: Vec<String>,
    pub badges: Vec<String>,
    pub total_taste_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_parts(user: users::Model, health_flags: Vec<String>, badges: Vec<String>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            health_flags,
            badges,
            total_taste_points: user.total_taste_points,
            created_at: user.created_at.with_timezone(&Utc),
            updated_at: user.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub generic_name: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub ai_health_summary: Option<String>,
    pub ai_health_conclusion: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            barcode: model.barcode,
            image_url: model.image_url,
            generic_name: model.generic_name,
            ingredients: model.ingredients,
            categories: model.categories,
            brands: model.brands,
            ai_health_summary: model.ai_health_summary,
            ai_health_conclusion: model.ai_health_conclusion,
            last_updated: model.last_updated.with_timezone(&Utc),
        }
    }
}

/// A product as seen by one user: when they last scanned it and their review.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInteraction {
    #[serde(flatten)]
    pub product: Product,
    pub is_reviewed: bool,
    pub user_rating: Option<i32>,
    pub user_notes: Option<String>,
    pub like_count: Option<i32>,
    pub date_reviewed: Option<DateTime<Utc>>,
    pub date_scanned: Option<DateTime<Utc>>,
}

impl ProductInteraction {
    pub fn new(
        product: products::Model,
        review: Option<&reviews::Model>,
        last_scan: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            product: product.into(),
            is_reviewed: review.is_some(),
            user_rating: review.map(|r| r.rating),
            user_notes: review.and_then(|r| r.note.clone()),
            like_count: review.map(|r| r.likes_count),
            date_reviewed: review.map(|r| r.updated_at.with_timezone(&Utc)),
            date_scanned: last_scan,
        }
    }
}

/// Outcome of a barcode or image scan.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub product: Product,
    /// Cosine distance to the matched product, image matches only.
    pub distance: Option<f64>,
    /// Whether the scan registered a new product.
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub rating: i32,
    pub note: Option<String>,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            note: model.note,
            like_count: model.likes_count,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Review enriched with reviewer and product names for the public feed.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFeedItem {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer_name: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub product_brands: Option<String>,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i32,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub product_image_url: Option<String>,
    pub scanned_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl HistoryEntry {
    pub fn new(model: history::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_name: product.map(|p| p.name.clone()),
            product_image_url: product.and_then(|p| p.image_url.clone()),
            scanned_at: model.scanned_at.with_timezone(&Utc),
            note: model.note,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Badge {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<badges::Model> for Badge {
    fn from(model: badges::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub badge: Badge,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct HealthFlag {
    pub id: i32,
    pub name: String,
}

impl From<health_flags::Model> for HealthFlag {
    fn from(model: health_flags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatistics {
    pub discovered_this_month: i64,
    pub total_scanned: i64,
}
