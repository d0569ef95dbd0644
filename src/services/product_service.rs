use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    clients::{CatalogProduct, ProductIdentity, image::decode_image},
    dto::products::{
        BarcodeScanRequest, CreateProductRequest, HealthSuggestionRequest, ImageScanRequest,
        ProductPatch,
    },
    entity::{
        history::{self, Entity as History},
        products::{self, Column, Entity as Products},
        reviews::{self, Entity as Reviews},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, ProductInteraction, ScanResult},
    response::{ApiResponse, Meta, Paged},
    routes::params::ProductQuery,
    services::{
        history_service::record_scan,
        similarity::{nearest_product, set_embedding},
        user_service::{find_user, health_flag_names},
    },
    state::AppState,
    validation::{validate_barcode, validate_image},
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Paged<Product>>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Brands).ilike(pattern)),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::LastUpdated)
        .order_by_desc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products fetched successfully",
        Paged::new(items, Meta::new(page, limit, total)),
    ))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Product>> {
    let product = find_product(state, id).await?;
    Ok(ApiResponse::success("Product fetched successfully", product.into()))
}

pub async fn create_product(
    state: &AppState,
    auth: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let active = payload.into_active_model()?;
    let product = active.insert(&state.orm).await?;
    tracing::info!(product_id = product.id, user_id = auth.user_id, "product created");
    Ok(ApiResponse::created("Product created successfully", product.into()))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    patch: ProductPatch,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(state, id).await?;
    let mut active: products::ActiveModel = existing.into();
    patch.apply(&mut active)?;
    active.last_updated = Set(Utc::now().fixed_offset());
    let product = active.update(&state.orm).await?;
    Ok(ApiResponse::success("Product updated successfully", product.into()))
}

/// Reviews and history rows referencing the product are removed with it.
pub async fn delete_product(state: &AppState, id: i32) -> AppResult<ApiResponse<()>> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(ApiResponse::empty("Product deleted successfully"))
}

pub async fn get_by_barcode(state: &AppState, barcode: &str) -> AppResult<ApiResponse<Product>> {
    let barcode = validate_barcode(barcode)?;
    let product = Products::find()
        .filter(Column::Barcode.eq(barcode.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(ApiResponse::success("Product fetched successfully", product.into()))
}

/// Local catalog first, then the external one. An external miss persists nothing.
pub async fn scan_barcode(
    state: &AppState,
    auth: &AuthUser,
    payload: BarcodeScanRequest,
) -> AppResult<ApiResponse<ScanResult>> {
    let barcode = validate_barcode(&payload.barcode)?;

    let local = Products::find()
        .filter(Column::Barcode.eq(barcode.as_str()))
        .one(&state.orm)
        .await?;
    if let Some(product) = local {
        record_scan(&state.orm, auth.user_id, product.id, None).await?;
        return Ok(ApiResponse::success(
            "Product found",
            ScanResult {
                product: product.into(),
                distance: None,
                created: false,
            },
        ));
    }

    let found = state
        .catalog
        .lookup_barcode(&barcode)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let txn = state.orm.begin().await?;
    let product = catalog_active_model(found, &barcode).insert(&txn).await?;
    record_scan(&txn, auth.user_id, product.id, None).await?;
    txn.commit().await?;
    tracing::info!(product_id = product.id, %barcode, "imported product from catalog");

    Ok(ApiResponse::created(
        "Product created from barcode",
        ScanResult {
            product: product.into(),
            distance: None,
            created: true,
        },
    ))
}

/// Matches the photo against every stored embedding. A miss identifies the
/// product, stores the image and registers it with its embedding.
pub async fn scan_image(
    state: &AppState,
    auth: &AuthUser,
    payload: ImageScanRequest,
) -> AppResult<ApiResponse<ScanResult>> {
    let image = validate_image(&payload.base64image)?;
    decode_image(image)?;

    let embedding = state.ai.encode_image(image).await?;

    if let Some((product, distance)) = nearest_product(&state.orm, &embedding, None).await? {
        record_scan(&state.orm, auth.user_id, product.id, None).await?;
        return Ok(ApiResponse::success(
            "Product found",
            ScanResult {
                product: product.into(),
                distance: Some(distance),
                created: false,
            },
        ));
    }

    let image_url = state.storage.upload_image(image).await?;
    let identity = state.ai.identify_product(image).await?;

    let txn = state.orm.begin().await?;
    let product = identity_active_model(identity, image_url).insert(&txn).await?;
    set_embedding(&txn, product.id, &embedding).await?;
    record_scan(&txn, auth.user_id, product.id, None).await?;
    txn.commit().await?;
    tracing::info!(product_id = product.id, "registered product from image");

    Ok(ApiResponse::created(
        "Product created from image",
        ScanResult {
            product: product.into(),
            distance: None,
            created: true,
        },
    ))
}

/// Like [`scan_image`], restricted to products the caller has scanned, and read-only.
pub async fn match_scanned_image(
    state: &AppState,
    auth: &AuthUser,
    payload: ImageScanRequest,
) -> AppResult<ApiResponse<ScanResult>> {
    let image = validate_image(&payload.base64image)?;
    decode_image(image)?;

    let embedding = state.ai.encode_image(image).await?;
    let (product, distance) = nearest_product(&state.orm, &embedding, Some(auth.user_id))
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    Ok(ApiResponse::success(
        "Product found",
        ScanResult {
            product: product.into(),
            distance: Some(distance),
            created: false,
        },
    ))
}

pub async fn suggest_health(
    state: &AppState,
    auth: &AuthUser,
    payload: HealthSuggestionRequest,
) -> AppResult<ApiResponse<Product>> {
    let image = validate_image(&payload.base64image)?;
    decode_image(image)?;

    let product = find_product(state, payload.product_id).await?;
    let user = find_user(&state.orm, auth.user_id).await?;
    let flags = health_flag_names(&state.orm, &user).await?;

    let assessment = state.ai.suggest_health_assessment(image, &flags).await?;

    let mut active: products::ActiveModel = product.into();
    active.ai_health_conclusion = Set(Some(assessment.conclusion));
    active.ai_health_summary = Set(Some(assessment.rationale));
    active.last_updated = Set(Utc::now().fixed_offset());
    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Health suggestion generated successfully",
        product.into(),
    ))
}

/// The caller's scanned products, most recently scanned first.
pub async fn scanned_products(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<Vec<ProductInteraction>>> {
    let scans = History::find()
        .filter(history::Column::UserId.eq(auth.user_id))
        .order_by_desc(history::Column::ScannedAt)
        .all(&state.orm)
        .await?;

    let mut order = Vec::new();
    let mut last_scan: HashMap<i32, DateTime<Utc>> = HashMap::new();
    for scan in scans {
        last_scan.entry(scan.product_id).or_insert_with(|| {
            order.push(scan.product_id);
            scan.scanned_at.with_timezone(&Utc)
        });
    }
    if order.is_empty() {
        return Ok(ApiResponse::success("Scanned products fetched successfully", vec![]));
    }

    let mut products: HashMap<i32, products::Model> = Products::find()
        .filter(Column::Id.is_in(order.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let reviews: HashMap<i32, reviews::Model> = Reviews::find()
        .filter(reviews::Column::UserId.eq(auth.user_id))
        .filter(reviews::Column::ProductId.is_in(order.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| (r.product_id, r))
        .collect();

    let items = order
        .into_iter()
        .filter_map(|id| {
            let product = products.remove(&id)?;
            Some(ProductInteraction::new(
                product,
                reviews.get(&id),
                last_scan.get(&id).copied(),
            ))
        })
        .collect();

    Ok(ApiResponse::success("Scanned products fetched successfully", items))
}

pub(crate) async fn find_product(state: &AppState, id: i32) -> AppResult<products::Model> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))
}

/// Rows are keyed by the barcode the user scanned, so the next local lookup
/// hits even when the catalog reports the code in another form (UPC vs EAN).
fn catalog_active_model(found: CatalogProduct, barcode: &str) -> products::ActiveModel {
    if !found.barcode.is_empty() && found.barcode != barcode {
        tracing::debug!(scanned = %barcode, catalog = %found.barcode, "catalog reported a different code");
    }
    products::ActiveModel {
        name: Set(found.name),
        barcode: Set(Some(barcode.to_string())),
        image_url: Set(found.image_url),
        generic_name: Set(found.generic_name),
        ingredients: Set(found.ingredients),
        categories: Set(found.categories),
        brands: Set(found.brands),
        ..Default::default()
    }
}

fn identity_active_model(identity: ProductIdentity, image_url: String) -> products::ActiveModel {
    products::ActiveModel {
        name: Set(identity.name),
        brands: Set(identity.manufacturer),
        generic_name: Set(identity.description),
        image_url: Set(Some(image_url)),
        ..Default::default()
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("cola"), "cola");
    }

    #[test]
    fn catalog_product_keeps_scanned_barcode_when_missing() {
        let active = catalog_active_model(
            CatalogProduct {
                name: "Oat Milk".into(),
                ..Default::default()
            },
            "7310865004703",
        );
        assert_eq!(active.barcode, ActiveValue::Set(Some("7310865004703".into())));
        assert_eq!(active.name, ActiveValue::Set("Oat Milk".into()));
    }

    #[test]
    fn catalog_product_is_stored_under_the_scanned_barcode() {
        let active = catalog_active_model(
            CatalogProduct {
                barcode: "0012345678905".into(),
                name: "Cola".into(),
                ..Default::default()
            },
            "012345678905",
        );
        assert_eq!(active.barcode, ActiveValue::Set(Some("012345678905".into())));
    }

    #[test]
    fn identified_product_maps_manufacturer_to_brands() {
        let active = identity_active_model(
            ProductIdentity {
                name: "Dark Chocolate".into(),
                manufacturer: Some("Lindt".into()),
                description: None,
            },
            "https://cdn/x.jpg".into(),
        );
        assert_eq!(active.brands, ActiveValue::Set(Some("Lindt".into())));
        assert_eq!(active.image_url, ActiveValue::Set(Some("https://cdn/x.jpg".into())));
        assert!(matches!(active.barcode, ActiveValue::NotSet));
    }
}
