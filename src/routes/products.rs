use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        products::{
            BarcodeScanRequest, CreateProductRequest, HealthSuggestionRequest, ImageScanRequest,
            ProductPatch,
        },
        reviews::{CreateReviewRequest, ReviewPatch},
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{Product, ProductInteraction, Review, ScanResult},
    response::{ApiResponse, Paged},
    routes::params::ProductQuery,
    services::{product_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/scanned", get(scanned_products))
        .route("/barcode", post(scan_barcode))
        .route("/barcode/{barcode}", get(get_by_barcode))
        .route("/image", post(scan_image))
        .route("/image/history", post(match_scanned_image))
        .route("/health-suggestion", post(health_suggestion))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route(
            "/{id}/reviews",
            get(product_reviews)
                .post(create_review)
                .patch(update_my_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List products", body = ApiResponse<Paged<Product>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<ApiResponse<Paged<Product>>> {
    product_service::list_products(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<Product>> {
    product_service::get_product(&state, id).await
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 409, description = "Barcode already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::create_product(&state, &user, payload).await
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<ProductPatch>,
) -> AppResult<ApiResponse<Product>> {
    product_service::update_product(&state, id, patch).await
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<()>> {
    product_service::delete_product(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/products/barcode/{barcode}",
    params(("barcode" = String, Path, description = "EAN/UPC barcode")),
    responses(
        (status = 200, description = "Product with this barcode", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_by_barcode(
    State(state): State<AppState>,
    AppPath(barcode): AppPath<String>,
) -> AppResult<ApiResponse<Product>> {
    product_service::get_by_barcode(&state, &barcode).await
}

#[utoipa::path(
    post,
    path = "/api/products/barcode",
    request_body = BarcodeScanRequest,
    responses(
        (status = 200, description = "Known product scanned", body = ApiResponse<ScanResult>),
        (status = 201, description = "Product imported from the catalog", body = ApiResponse<ScanResult>),
        (status = 404, description = "Barcode unknown locally and upstream"),
        (status = 502, description = "Catalog unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn scan_barcode(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<BarcodeScanRequest>,
) -> AppResult<ApiResponse<ScanResult>> {
    product_service::scan_barcode(&state, &user, payload).await
}

#[utoipa::path(
    post,
    path = "/api/products/image",
    request_body = ImageScanRequest,
    responses(
        (status = 200, description = "Matched an existing product", body = ApiResponse<ScanResult>),
        (status = 201, description = "Registered a new product", body = ApiResponse<ScanResult>),
        (status = 502, description = "AI or storage service unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn scan_image(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ImageScanRequest>,
) -> AppResult<ApiResponse<ScanResult>> {
    product_service::scan_image(&state, &user, payload).await
}

#[utoipa::path(
    post,
    path = "/api/products/image/history",
    request_body = ImageScanRequest,
    responses(
        (status = 200, description = "Matched a previously scanned product", body = ApiResponse<ScanResult>),
        (status = 404, description = "No scanned product is similar enough")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn match_scanned_image(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ImageScanRequest>,
) -> AppResult<ApiResponse<ScanResult>> {
    product_service::match_scanned_image(&state, &user, payload).await
}

#[utoipa::path(
    post,
    path = "/api/products/health-suggestion",
    request_body = HealthSuggestionRequest,
    responses(
        (status = 200, description = "Product with refreshed AI assessment", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn health_suggestion(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<HealthSuggestionRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::suggest_health(&state, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/products/scanned",
    responses(
        (status = 200, description = "Products scanned by the current user", body = ApiResponse<Vec<ProductInteraction>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn scanned_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Vec<ProductInteraction>>> {
    product_service::scanned_products(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Reviews of the product", body = ApiResponse<Vec<Review>>),
        (status = 404, description = "Product not found")
    ),
    tag = "Reviews"
)]
pub async fn product_reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<ApiResponse<Vec<Review>>> {
    review_service::list_product_reviews(&state, id).await
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Rating out of range"),
        (status = 409, description = "Product already reviewed by this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> AppResult<ApiResponse<Review>> {
    review_service::create_review(&state, &user, id, payload).await
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Caller's review updated", body = ApiResponse<Review>),
        (status = 404, description = "Caller has not reviewed this product")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_my_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<ReviewPatch>,
) -> AppResult<ApiResponse<Review>> {
    review_service::update_my_product_review(&state, &user, id, patch).await
}
