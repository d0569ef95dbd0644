use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, TokenForm, TokenResponse},
        history::{CreateHistoryRequest, HistoryPatch},
        products::{
            BarcodeScanRequest, CreateProductRequest, HealthSuggestionRequest, ImageScanRequest,
            ProductPatch,
        },
        reviews::{CreateReviewRequest, ReviewPatch},
        users::{
            AwardBadgeRequest, CreateHealthFlagRequest, HealthFlagsUpdate, RegisterUserRequest,
            UserPatch,
        },
    },
    models::{
        Badge, EarnedBadge, HealthFlag, HistoryEntry, Product, ProductInteraction, Review,
        ReviewFeedItem, ScanResult, ScanStatistics, UserProfile,
    },
    response::{ApiResponse, Meta, Paged},
    routes::{auth, catalog, health, history, params, products, reviews, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::token,
        users::register,
        users::list_users,
        users::me,
        users::update_me,
        users::delete_me,
        users::my_health_flags,
        users::replace_health_flags,
        users::my_badges,
        users::award_badge,
        users::scan_statistics,
        users::get_user,
        users::user_reviews,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::get_by_barcode,
        products::scan_barcode,
        products::scan_image,
        products::match_scanned_image,
        products::health_suggestion,
        products::scanned_products,
        products::product_reviews,
        products::create_review,
        products::update_my_review,
        reviews::feed,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::like_review,
        history::list_history,
        history::create_history,
        history::update_history,
        history::delete_history,
        history::clear_history,
        catalog::all_badges,
        catalog::my_badges,
        catalog::award_badge,
        catalog::list_health_flags,
        catalog::create_health_flag
    ),
    components(
        schemas(
            UserProfile,
            Product,
            ProductInteraction,
            ScanResult,
            Review,
            ReviewFeedItem,
            HistoryEntry,
            Badge,
            EarnedBadge,
            HealthFlag,
            ScanStatistics,
            LoginRequest,
            TokenForm,
            TokenResponse,
            RegisterUserRequest,
            UserPatch,
            HealthFlagsUpdate,
            AwardBadgeRequest,
            CreateHealthFlagRequest,
            CreateProductRequest,
            ProductPatch,
            BarcodeScanRequest,
            ImageScanRequest,
            HealthSuggestionRequest,
            CreateReviewRequest,
            ReviewPatch,
            CreateHistoryRequest,
            HistoryPatch,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<UserProfile>,
            ApiResponse<Product>,
            ApiResponse<Paged<Product>>,
            ApiResponse<ScanResult>,
            ApiResponse<Review>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Account, profile and personal data endpoints"),
        (name = "Products", description = "Product catalog and scanning endpoints"),
        (name = "Reviews", description = "Review endpoints"),
        (name = "History", description = "Scan history endpoints"),
        (name = "Badges", description = "Badge endpoints"),
        (name = "Health flags", description = "Dietary health flag endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
