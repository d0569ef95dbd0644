mod common;

use std::sync::{Arc, atomic::Ordering};

use axum::http::StatusCode;
use chrono::Duration;
use flavorpal_api::{
    clients::CatalogProduct,
    dto::{
        auth::LoginRequest,
        history::CreateHistoryRequest,
        products::{
            BarcodeScanRequest, CreateProductRequest, HealthSuggestionRequest, ImageScanRequest,
        },
        reviews::{CreateReviewRequest, ReviewPatch},
        users::{RegisterUserRequest, UserPatch},
    },
    entity::{
        History, Products, Reviews, UserBadges, UserHealthFlags, Users, history, products,
        reviews, user_badges, user_health_flags,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::app,
    services::{
        auth_service, history_service, product_service, review_service,
        similarity::{SIMILARITY_THRESHOLD, nearest_product, set_embedding},
        user_service,
    },
    state::AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::{
    FakeAi, FakeCatalog, FakeStorage, IMAGE, empty_request, json_request, send, state_with,
    test_db, tilted, unique, unique_barcode, unit_vector,
};

async fn register(state: &AppState, name: &str, flags: &[&str]) -> anyhow::Result<AuthUser> {
    register_with_badges(state, name, flags, &[]).await
}

async fn register_with_badges(
    state: &AppState,
    name: &str,
    flags: &[&str],
    badges: &[&str],
) -> anyhow::Result<AuthUser> {
    let email = format!("{}-{}@flavorpal.test", name.to_lowercase(), unique());
    let profile = user_service::register_user(
        state,
        RegisterUserRequest {
            name: name.into(),
            email: email.clone(),
            password: "secret".into(),
            health_flags: flags.iter().map(|f| f.to_string()).collect(),
            badges: badges.iter().map(|b| b.to_string()).collect(),
        },
    )
    .await?
    .data
    .expect("profile");
    Ok(AuthUser {
        user_id: profile.id,
        email,
        name: profile.name,
    })
}

async fn create_product(state: &AppState, auth: &AuthUser, name: &str) -> anyhow::Result<i32> {
    let product = product_service::create_product(
        state,
        auth,
        CreateProductRequest {
            name: name.into(),
            barcode: Some(unique_barcode()),
            image_url: None,
            generic_name: None,
            ingredients: None,
            categories: None,
            brands: Some("Acme".into()),
        },
    )
    .await?
    .data
    .expect("product");
    Ok(product.id)
}

fn default_state(orm: sea_orm::DatabaseConnection) -> AppState {
    state_with(
        orm,
        Arc::new(FakeAi::new(unit_vector(unique()))),
        Arc::new(FakeStorage::default()),
        Arc::new(FakeCatalog::default()),
    )
}

#[tokio::test]
async fn registration_returns_profile_without_password() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let email = format!("ann-{}@x.com", unique());

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/users",
            None,
            json!({ "name": "Ann", "email": email, "password": "secret", "healthFlags": ["peanut"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert!(body["data"]["id"].is_i64());
    assert_eq!(body["data"]["healthFlags"], json!(["peanut"]));
    assert_eq!(body["data"]["totalTastePoints"], 0);
    let raw = body.to_string();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("secret"));

    // Second registration with the same email conflicts.
    let (status, body) = send(
        app(state),
        json_request(
            "POST",
            "/api/users",
            None,
            json!({ "name": "Ann", "email": email.to_uppercase(), "password": "secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
    Ok(())
}

#[tokio::test]
async fn login_issues_token_and_rejects_wrong_password() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Bob", &[]).await?;

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert_eq!(body["data"], serde_json::Value::Null);

    let unknown = auth_service::login_user(
        &state,
        LoginRequest {
            email: format!("ghost-{}@x.com", unique()),
            password: "wrong".into(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": "secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tokenType"], "bearer");
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, body) = send(app(state), empty_request("GET", "/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.user_id);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthenticated() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Cleo", &[]).await?;
    let model = Users::find_by_id(user.user_id).one(&state.orm).await?.unwrap();

    let expired = auth_service::issue_token(&state.jwt, &model, Duration::seconds(-10))?;
    let (status, body) = send(app(state), empty_request("GET", "/api/users/me", Some(&expired))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    Ok(())
}

#[tokio::test]
async fn email_change_revokes_tokens_for_the_old_address() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Mia", &[]).await?;
    let model = Users::find_by_id(user.user_id).one(&state.orm).await?.unwrap();
    let old_token = auth_service::issue_token(&state.jwt, &model, Duration::minutes(5))?;

    let new_email = format!("mia-moved-{}@flavorpal.test", unique());
    user_service::update_me(
        &state,
        &user,
        UserPatch {
            name: None,
            email: Some(new_email.clone()),
            health_flags: None,
        },
    )
    .await?;

    // Someone else takes over the freed address.
    let newcomer = user_service::register_user(
        &state,
        RegisterUserRequest {
            name: "Nia".into(),
            email: user.email.clone(),
            password: "secret".into(),
            health_flags: vec![],
            badges: vec![],
        },
    )
    .await?
    .data
    .unwrap();
    assert_ne!(newcomer.id, user.user_id);

    let (status, body) = send(
        app(state.clone()),
        empty_request("GET", "/api/users/me", Some(&old_token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let model = Users::find_by_id(user.user_id).one(&state.orm).await?.unwrap();
    assert_eq!(model.email, new_email);
    let fresh = auth_service::issue_token(&state.jwt, &model, Duration::minutes(5))?;
    let (status, body) = send(app(state), empty_request("GET", "/api/users/me", Some(&fresh))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.user_id);
    assert_eq!(body["data"]["email"], new_email);
    Ok(())
}

#[tokio::test]
async fn unknown_barcode_persists_nothing() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Dan", &[]).await?;
    let barcode = unique_barcode();

    let result = product_service::scan_barcode(
        &state,
        &user,
        BarcodeScanRequest {
            barcode: barcode.clone(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound("Product"))));

    let rows = Products::find()
        .filter(products::Column::Barcode.eq(barcode.as_str()))
        .count(&state.orm)
        .await?;
    assert_eq!(rows, 0);
    let scans = History::find()
        .filter(history::Column::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(scans, 0);
    Ok(())
}

#[tokio::test]
async fn barcode_scan_imports_then_reuses_catalog_product() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let barcode = unique_barcode();
    let mut catalog = FakeCatalog::default();
    catalog.products.insert(
        barcode.clone(),
        CatalogProduct {
            barcode: barcode.clone(),
            name: "Oat Milk".into(),
            brands: Some("Oatly".into()),
            ..Default::default()
        },
    );
    let state = state_with(
        orm,
        Arc::new(FakeAi::new(unit_vector(unique()))),
        Arc::new(FakeStorage::default()),
        Arc::new(catalog),
    );
    let user = register(&state, "Eve", &[]).await?;

    let first = product_service::scan_barcode(
        &state,
        &user,
        BarcodeScanRequest {
            barcode: barcode.clone(),
        },
    )
    .await?;
    assert_eq!(first.code, 201);
    let first = first.data.unwrap();
    assert!(first.created);
    assert_eq!(first.product.barcode.as_deref(), Some(barcode.as_str()));

    let second = product_service::scan_barcode(&state, &user, BarcodeScanRequest { barcode })
        .await?
        .data
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.product.id, first.product.id);

    let stats = user_service::scan_statistics(&state, &user).await?.data.unwrap();
    assert_eq!(stats.total_scanned, 2);
    assert_eq!(stats.discovered_this_month, 1);
    Ok(())
}

#[tokio::test]
async fn catalog_code_in_another_form_still_rescans_locally() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    // A 12-digit UPC that the catalog reports back as a 13-digit EAN.
    let scanned = unique_barcode()[1..].to_string();
    let mut catalog = FakeCatalog::default();
    catalog.products.insert(
        scanned.clone(),
        CatalogProduct {
            barcode: format!("0{scanned}"),
            name: "Cola".into(),
            ..Default::default()
        },
    );
    let state = state_with(
        orm,
        Arc::new(FakeAi::new(unit_vector(unique()))),
        Arc::new(FakeStorage::default()),
        Arc::new(catalog),
    );
    let user = register(&state, "Oli", &[]).await?;

    let first = product_service::scan_barcode(
        &state,
        &user,
        BarcodeScanRequest {
            barcode: scanned.clone(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(first.created);
    assert_eq!(first.product.barcode.as_deref(), Some(scanned.as_str()));

    let second = product_service::scan_barcode(
        &state,
        &user,
        BarcodeScanRequest {
            barcode: scanned.clone(),
        },
    )
    .await?;
    assert_eq!(second.code, 200);
    let second = second.data.unwrap();
    assert!(!second.created);
    assert_eq!(second.product.id, first.product.id);
    Ok(())
}

#[tokio::test]
async fn invalid_rating_leaves_reviews_untouched() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Fay", &[]).await?;
    let product_id = create_product(&state, &user, "Granola").await?;

    let result = review_service::create_review(
        &state,
        &user,
        product_id,
        CreateReviewRequest {
            rating: 6,
            note: Some("too good".into()),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let count = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn review_lifecycle_awards_points_and_enforces_ownership() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let author = register(&state, "Gus", &[]).await?;
    let other = register(&state, "Hal", &[]).await?;
    let product_id = create_product(&state, &author, "Kombucha").await?;

    let review = review_service::create_review(
        &state,
        &author,
        product_id,
        CreateReviewRequest {
            rating: 4,
            note: Some("Fizzy".into()),
        },
    )
    .await?;
    assert_eq!(review.code, 201);
    let review = review.data.unwrap();

    let profile = user_service::get_profile(&state, author.user_id).await?.data.unwrap();
    assert_eq!(profile.total_taste_points, review_service::REVIEW_TASTE_POINTS);

    let duplicate = review_service::create_review(
        &state,
        &author,
        product_id,
        CreateReviewRequest { rating: 5, note: None },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let forbidden = review_service::update_review(
        &state,
        &other,
        review.id,
        ReviewPatch {
            rating: Some(1),
            note: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    review_service::like_review(&state, review.id).await?;
    let liked = review_service::like_review(&state, review.id).await?.data.unwrap();
    assert_eq!(liked.like_count, 2);

    let updated = review_service::update_my_product_review(
        &state,
        &author,
        product_id,
        ReviewPatch {
            rating: None,
            note: Some(String::new()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.note, None);

    assert!(matches!(
        review_service::delete_review(&state, &other, review.id).await,
        Err(AppError::Forbidden)
    ));
    review_service::delete_review(&state, &author, review.id).await?;
    assert!(matches!(
        review_service::get_review(&state, review.id).await,
        Err(AppError::NotFound("Review"))
    ));
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_cascades_to_owned_rows() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register_with_badges(&state, "Ivy", &["gluten"], &["First Scan"]).await?;
    let product_id = create_product(&state, &user, "Crackers").await?;

    review_service::create_review(
        &state,
        &user,
        product_id,
        CreateReviewRequest { rating: 3, note: None },
    )
    .await?;
    history_service::create_history(
        &state,
        &user,
        CreateHistoryRequest {
            product_id,
            note: Some("lunch".into()),
        },
    )
    .await?;

    assert_eq!(link_counts(&state, user.user_id).await?, (1, 1));

    user_service::delete_me(&state, &user).await?;

    assert!(Users::find_by_id(user.user_id).one(&state.orm).await?.is_none());
    let reviews = Reviews::find()
        .filter(reviews::Column::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let scans = History::find()
        .filter(history::Column::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!((reviews, scans), (0, 0));
    assert_eq!(link_counts(&state, user.user_id).await?, (0, 0));
    assert!(Products::find_by_id(product_id).one(&state.orm).await?.is_some());
    Ok(())
}

/// `(health flag links, badge links)` held by `user_id`.
async fn link_counts(state: &AppState, user_id: i32) -> anyhow::Result<(u64, u64)> {
    let flags = UserHealthFlags::find()
        .filter(user_health_flags::Column::UserId.eq(user_id))
        .count(&state.orm)
        .await?;
    let badges = UserBadges::find()
        .filter(user_badges::Column::UserId.eq(user_id))
        .count(&state.orm)
        .await?;
    Ok((flags, badges))
}

#[tokio::test]
async fn deleting_a_product_cascades_to_reviews_and_history() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Pia", &[]).await?;
    let product_id = create_product(&state, &user, "Rice Cakes").await?;

    review_service::create_review(
        &state,
        &user,
        product_id,
        CreateReviewRequest { rating: 2, note: None },
    )
    .await?;
    history_service::create_history(
        &state,
        &user,
        CreateHistoryRequest {
            product_id,
            note: None,
        },
    )
    .await?;

    product_service::delete_product(&state, product_id).await?;

    let reviews = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .count(&state.orm)
        .await?;
    let scans = History::find()
        .filter(history::Column::ProductId.eq(product_id))
        .count(&state.orm)
        .await?;
    assert_eq!((reviews, scans), (0, 0));
    assert!(Users::find_by_id(user.user_id).one(&state.orm).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn nearest_match_respects_threshold() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let state = default_state(orm);
    let user = register(&state, "Jo", &[]).await?;
    let product_id = create_product(&state, &user, "Seaweed Chips").await?;
    let embedding = unit_vector(unique());
    set_embedding(&state.orm, product_id, &embedding).await?;

    let (found, distance) = nearest_product(&state.orm, &embedding, None).await?.unwrap();
    assert_eq!(found.id, product_id);
    assert!(distance.abs() < 1e-4);
    assert!(distance < SIMILARITY_THRESHOLD);

    // Cosine similarity 0.85 is distance 0.15, inside the threshold.
    let near = tilted(&embedding, unique(), 0.85);
    let (found, distance) = nearest_product(&state.orm, &near, None).await?.unwrap();
    assert_eq!(found.id, product_id);
    assert!((distance - 0.15).abs() < 1e-3, "distance {distance}");

    // Distance 0.25 and 1.0 both fall outside it. Other rows in the shared
    // database may still match, but never this product.
    for cos in [0.75, 0.0] {
        let far = tilted(&embedding, unique(), cos);
        if let Some((other, distance)) = nearest_product(&state.orm, &far, None).await? {
            assert_ne!(other.id, product_id, "matched at cosine {cos}");
            assert!(distance < SIMILARITY_THRESHOLD);
        }
    }

    // Not in the user's history yet.
    assert!(nearest_product(&state.orm, &embedding, Some(user.user_id)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn image_scan_registers_then_matches() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let ai = Arc::new(FakeAi::new(unit_vector(unique())));
    let storage = Arc::new(FakeStorage::default());
    let state = state_with(orm, ai.clone(), storage.clone(), Arc::new(FakeCatalog::default()));
    let user = register(&state, "Kim", &["peanut"]).await?;

    let first = product_service::scan_image(
        &state,
        &user,
        ImageScanRequest {
            base64image: IMAGE.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(first.created);
    assert_eq!(first.product.name, "Mystery Snack");
    assert_eq!(first.product.brands.as_deref(), Some("Acme"));
    assert_eq!(storage.uploads.load(Ordering::SeqCst), 1);

    let second = product_service::scan_image(
        &state,
        &user,
        ImageScanRequest {
            base64image: IMAGE.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!second.created);
    assert_eq!(second.product.id, first.product.id);
    assert_eq!(storage.uploads.load(Ordering::SeqCst), 1);

    let from_history = product_service::match_scanned_image(
        &state,
        &user,
        ImageScanRequest {
            base64image: IMAGE.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(from_history.product.id, first.product.id);

    let assessed = product_service::suggest_health(
        &state,
        &user,
        HealthSuggestionRequest {
            product_id: first.product.id,
            base64image: IMAGE.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(assessed.ai_health_conclusion.as_deref(), Some("unsafe"));
    assert_eq!(assessed.ai_health_summary.as_deref(), Some("Contains peanuts"));

    let scanned = product_service::scanned_products(&state, &user).await?.data.unwrap();
    assert_eq!(scanned.len(), 1);
    assert!(!scanned[0].is_reviewed);
    assert!(scanned[0].date_scanned.is_some());
    Ok(())
}

#[tokio::test]
async fn undecodable_image_is_rejected_without_calling_the_ai() -> anyhow::Result<()> {
    let Some(orm) = test_db().await? else {
        return Ok(());
    };
    let ai = Arc::new(FakeAi::new(unit_vector(unique())));
    let state = state_with(
        orm,
        ai.clone(),
        Arc::new(FakeStorage::default()),
        Arc::new(FakeCatalog::default()),
    );
    let user = register(&state, "Lee", &[]).await?;

    let result = product_service::scan_image(
        &state,
        &user,
        ImageScanRequest {
            base64image: "%%% not base64 %%%".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
    Ok(())
}
