use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    dto::history::{CreateHistoryRequest, HistoryPatch},
    entity::{
        history::{self, Entity as History},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::HistoryEntry,
    response::{ApiResponse, Meta, Paged},
    routes::params::Pagination,
    state::AppState,
    validation::clean_note,
};

/// Appends a scan of `product_id` to the user's log.
pub(crate) async fn record_scan<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
    note: Option<String>,
) -> AppResult<history::Model> {
    let entry = history::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        note: Set(note),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::debug!(user_id, product_id, "recorded scan");
    Ok(entry)
}

pub async fn list_history(
    state: &AppState,
    auth: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Paged<HistoryEntry>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = History::find()
        .filter(history::Column::UserId.eq(auth.user_id))
        .order_by_desc(history::Column::ScannedAt)
        .order_by_desc(history::Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Products)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(entry, product)| HistoryEntry::new(entry, product.as_ref()))
        .collect();

    Ok(ApiResponse::success(
        "History fetched successfully",
        Paged::new(items, Meta::new(page, limit, total)),
    ))
}

pub async fn create_history(
    state: &AppState,
    auth: &AuthUser,
    payload: CreateHistoryRequest,
) -> AppResult<ApiResponse<HistoryEntry>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let entry = record_scan(&state.orm, auth.user_id, product.id, clean_note(payload.note)).await?;
    Ok(ApiResponse::created(
        "History entry created successfully",
        HistoryEntry::new(entry, Some(&product)),
    ))
}

pub async fn update_history(
    state: &AppState,
    auth: &AuthUser,
    id: i32,
    patch: HistoryPatch,
) -> AppResult<ApiResponse<HistoryEntry>> {
    let entry = find_owned(state, auth, id).await?;

    let mut active: history::ActiveModel = entry.into();
    active.note = Set(clean_note(patch.note));
    let entry = active.update(&state.orm).await?;

    let product = Products::find_by_id(entry.product_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "History entry updated successfully",
        HistoryEntry::new(entry, product.as_ref()),
    ))
}

pub async fn delete_history(
    state: &AppState,
    auth: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    let entry = find_owned(state, auth, id).await?;
    History::delete_by_id(entry.id).exec(&state.orm).await?;
    Ok(ApiResponse::empty("History entry deleted successfully"))
}

pub async fn clear_history(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<u64>> {
    let result = History::delete_many()
        .filter(history::Column::UserId.eq(auth.user_id))
        .exec(&state.orm)
        .await?;
    tracing::info!(user_id = auth.user_id, removed = result.rows_affected, "history cleared");
    Ok(ApiResponse::success(
        "History cleared successfully",
        result.rows_affected,
    ))
}

async fn find_owned(state: &AppState, auth: &AuthUser, id: i32) -> AppResult<history::Model> {
    let entry = History::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("History entry"))?;
    auth.ensure_owner(entry.user_id)?;
    Ok(entry)
}
