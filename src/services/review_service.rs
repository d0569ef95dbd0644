use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewPatch},
    entity::{
        products::Entity as Products,
        reviews::{self, Column, Entity as Reviews},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Review, ReviewFeedItem},
    response::{ApiResponse, Meta, Paged},
    routes::params::Pagination,
    services::{product_service::find_product, user_service::find_user},
    state::AppState,
};

/// Taste points credited to the author of a new review.
pub const REVIEW_TASTE_POINTS: i32 = 10;

pub async fn list_product_reviews(
    state: &AppState,
    product_id: i32,
) -> AppResult<ApiResponse<Vec<Review>>> {
    find_product(state, product_id).await?;
    let items = Reviews::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(ApiResponse::success("Reviews fetched successfully", items))
}

pub async fn list_user_reviews(
    state: &AppState,
    user_id: i32,
) -> AppResult<ApiResponse<Vec<Review>>> {
    find_user(&state.orm, user_id).await?;
    let items = Reviews::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(ApiResponse::success("Reviews fetched successfully", items))
}

pub async fn create_review(
    state: &AppState,
    auth: &AuthUser,
    product_id: i32,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let (rating, note) = payload.validate()?;
    find_product(state, product_id).await?;

    let txn = state.orm.begin().await?;
    let existing = Reviews::find()
        .filter(Column::UserId.eq(auth.user_id))
        .filter(Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already reviewed this product".into(),
        ));
    }

    let review = reviews::ActiveModel {
        user_id: Set(auth.user_id),
        product_id: Set(product_id),
        rating: Set(rating),
        note: Set(note),
        likes_count: Set(0),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    Users::update_many()
        .col_expr(
            users::Column::TotalTastePoints,
            Expr::col(users::Column::TotalTastePoints).add(REVIEW_TASTE_POINTS),
        )
        .filter(users::Column::Id.eq(auth.user_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(review_id = review.id, product_id, user_id = auth.user_id, "review created");
    Ok(ApiResponse::created("Review created successfully", review.into()))
}

/// Updates the caller's review of `product_id`.
pub async fn update_my_product_review(
    state: &AppState,
    auth: &AuthUser,
    product_id: i32,
    patch: ReviewPatch,
) -> AppResult<ApiResponse<Review>> {
    let review = Reviews::find()
        .filter(Column::UserId.eq(auth.user_id))
        .filter(Column::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Review"))?;
    apply_patch(state, review, patch).await
}

/// Public feed, newest first.
pub async fn list_feed(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Paged<ReviewFeedItem>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Reviews::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Products)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let user_ids: Vec<i32> = rows.iter().map(|(r, _)| r.user_id).collect();
    let names: HashMap<i32, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let items = rows
        .into_iter()
        .map(|(review, product)| ReviewFeedItem {
            reviewer_name: names.get(&review.user_id).cloned().unwrap_or_default(),
            product_name: product.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            product_image_url: product.as_ref().and_then(|p| p.image_url.clone()),
            product_brands: product.and_then(|p| p.brands),
            review: review.into(),
        })
        .collect();

    Ok(ApiResponse::success(
        "Reviews fetched successfully",
        Paged::new(items, Meta::new(page, limit, total)),
    ))
}

pub async fn get_review(state: &AppState, id: i32) -> AppResult<ApiResponse<Review>> {
    let review = find_review(state, id).await?;
    Ok(ApiResponse::success("Review fetched successfully", review.into()))
}

pub async fn update_review(
    state: &AppState,
    auth: &AuthUser,
    id: i32,
    patch: ReviewPatch,
) -> AppResult<ApiResponse<Review>> {
    let review = find_review(state, id).await?;
    auth.ensure_owner(review.user_id)?;
    apply_patch(state, review, patch).await
}

pub async fn delete_review(
    state: &AppState,
    auth: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    let review = find_review(state, id).await?;
    auth.ensure_owner(review.user_id)?;
    Reviews::delete_by_id(review.id).exec(&state.orm).await?;
    Ok(ApiResponse::empty("Review deleted successfully"))
}

/// Increments the like counter in a single statement so concurrent likes are not lost.
pub async fn like_review(state: &AppState, id: i32) -> AppResult<ApiResponse<Review>> {
    let result = Reviews::update_many()
        .col_expr(Column::LikesCount, Expr::col(Column::LikesCount).add(1))
        .filter(Column::Id.eq(id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Review"));
    }
    let review = find_review(state, id).await?;
    Ok(ApiResponse::success("Review liked successfully", review.into()))
}

async fn find_review(state: &AppState, id: i32) -> AppResult<reviews::Model> {
    Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Review"))
}

async fn apply_patch(
    state: &AppState,
    review: reviews::Model,
    patch: ReviewPatch,
) -> AppResult<ApiResponse<Review>> {
    let mut active: reviews::ActiveModel = review.into();
    patch.apply(&mut active)?;
    active.updated_at = Set(Utc::now().fixed_offset());
    let review = active.update(&state.orm).await?;
    Ok(ApiResponse::success("Review updated successfully", review.into()))
}
