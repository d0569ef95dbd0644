//! Badge and health-flag catalogs.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::users::CreateHealthFlagRequest,
    entity::{
        badges::{self, Entity as Badges},
        health_flags::{self, Entity as HealthFlags},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Badge, EarnedBadge, HealthFlag},
    response::ApiResponse,
    services::user_service::link_badge,
    state::AppState,
    validation::validate_tag,
};

pub async fn list_badges(state: &AppState) -> AppResult<ApiResponse<Vec<Badge>>> {
    let items = Badges::find()
        .order_by_asc(badges::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Badge::from)
        .collect();
    Ok(ApiResponse::success("Badges fetched successfully", items))
}

/// Awards an existing catalog badge to the caller. Repeating it is a no-op.
pub async fn award_badge(
    state: &AppState,
    auth: &AuthUser,
    badge_id: i32,
) -> AppResult<ApiResponse<EarnedBadge>> {
    let badge = Badges::find_by_id(badge_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Badge"))?;
    let link = link_badge(&state.orm, auth.user_id, badge.id).await?;
    Ok(ApiResponse::success(
        "Badge awarded successfully",
        EarnedBadge {
            badge: badge.into(),
            earned_at: link.earned_at.with_timezone(&Utc),
        },
    ))
}

pub async fn list_health_flags(state: &AppState) -> AppResult<ApiResponse<Vec<HealthFlag>>> {
    let items = HealthFlags::find()
        .order_by_asc(health_flags::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(HealthFlag::from)
        .collect();
    Ok(ApiResponse::success("Health flags fetched successfully", items))
}

pub async fn create_health_flag(
    state: &AppState,
    payload: CreateHealthFlagRequest,
) -> AppResult<ApiResponse<HealthFlag>> {
    let name = validate_tag("Health flag", &payload.name)?;

    let exists = HealthFlags::find()
        .filter(health_flags::Column::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Health flag already exists".into()));
    }

    let flag = health_flags::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::created("Health flag created successfully", flag.into()))
}
