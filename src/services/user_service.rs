use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::users::{AwardBadgeRequest, NewUser, RegisterUserRequest, UserPatch},
    entity::{
        badges::{self, Entity as Badges},
        health_flags::{self, Entity as HealthFlags},
        history::{self, Entity as History},
        user_badges::{self, Entity as UserBadges},
        user_health_flags::{self, Entity as UserHealthFlags},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Badge, EarnedBadge, ScanStatistics, UserProfile},
    response::{ApiResponse, Meta, Paged},
    routes::params::Pagination,
    services::auth_service::hash_password,
    state::AppState,
    validation::{normalize_tags, validate_name},
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterUserRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let NewUser {
        name,
        email,
        password,
        health_flags,
        badges,
    } = payload.validate()?;

    let hashed_password = hash_password(&password)?;

    let txn = state.orm.begin().await?;

    let exists = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let user = users::ActiveModel {
        name: Set(name),
        email: Set(email),
        hashed_password: Set(hashed_password),
        total_taste_points: Set(0),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_health_flags(&txn, user.id, &health_flags).await?;
    for badge_name in &badges {
        let badge = find_or_create_badge(&txn, badge_name, None).await?;
        link_badge(&txn, user.id, badge.id).await?;
    }

    txn.commit().await?;
    tracing::info!(user_id = user.id, "user registered");

    let profile = load_profile(&state.orm, user).await?;
    Ok(ApiResponse::created("User created successfully", profile))
}

pub async fn list_users(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Paged<UserProfile>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Users::find().order_by_asc(users::Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for user in rows {
        items.push(load_profile(&state.orm, user).await?);
    }

    Ok(ApiResponse::success(
        "Users fetched successfully",
        Paged::new(items, Meta::new(page, limit, total)),
    ))
}

pub async fn get_profile(state: &AppState, user_id: i32) -> AppResult<ApiResponse<UserProfile>> {
    let user = find_user(&state.orm, user_id).await?;
    let profile = load_profile(&state.orm, user).await?;
    Ok(ApiResponse::success("User fetched successfully", profile))
}

pub async fn update_me(
    state: &AppState,
    auth: &AuthUser,
    patch: UserPatch,
) -> AppResult<ApiResponse<UserProfile>> {
    let txn = state.orm.begin().await?;
    let existing = find_user(&txn, auth.user_id).await?;
    let current_email = existing.email.clone();

    let mut active: users::ActiveModel = existing.into();
    let health_flags = patch.apply(&mut active)?;

    if let sea_orm::ActiveValue::Set(ref email) = active.email {
        if *email != current_email {
            let taken = Users::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&txn)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email is already registered".into()));
            }
        }
    }

    active.updated_at = Set(Utc::now().fixed_offset());
    let user = active.update(&txn).await?;

    if let Some(flags) = health_flags {
        replace_health_flags(&txn, user.id, &flags).await?;
    }
    txn.commit().await?;

    let profile = load_profile(&state.orm, user).await?;
    Ok(ApiResponse::success("User updated successfully", profile))
}

/// Removes the caller. Reviews, history and link rows go with it via `ON DELETE CASCADE`.
pub async fn delete_me(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<()>> {
    let result = Users::delete_by_id(auth.user_id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User"));
    }
    tracing::info!(user_id = auth.user_id, "user deleted");
    Ok(ApiResponse::empty("User deleted successfully"))
}

pub async fn get_health_flags(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<Vec<String>>> {
    let user = find_user(&state.orm, auth.user_id).await?;
    let names = health_flag_names(&state.orm, &user).await?;
    Ok(ApiResponse::success("Health flags fetched successfully", names))
}

pub async fn set_health_flags(
    state: &AppState,
    auth: &AuthUser,
    names: Vec<String>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let names = normalize_tags("Health flag", &names)?;

    let txn = state.orm.begin().await?;
    let user = find_user(&txn, auth.user_id).await?;
    replace_health_flags(&txn, user.id, &names).await?;
    let stored = health_flag_names(&txn, &user).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Health flags updated successfully", stored))
}

pub async fn list_my_badges(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<Vec<EarnedBadge>>> {
    let badges = earned_badges(&state.orm, auth.user_id).await?;
    Ok(ApiResponse::success("User badges fetched successfully", badges))
}

/// Links the named badge to the caller, creating the catalog entry on first use.
pub async fn award_badge_by_name(
    state: &AppState,
    auth: &AuthUser,
    payload: AwardBadgeRequest,
) -> AppResult<ApiResponse<EarnedBadge>> {
    let name = validate_name("Badge name", &payload.name)?;
    let description = payload.description.filter(|d| !d.trim().is_empty());

    let txn = state.orm.begin().await?;
    let badge = find_or_create_badge(&txn, &name, description).await?;
    let link = link_badge(&txn, auth.user_id, badge.id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Badge awarded successfully",
        EarnedBadge {
            badge: badge.into(),
            earned_at: link.earned_at.with_timezone(&Utc),
        },
    ))
}

pub async fn scan_statistics(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<ScanStatistics>> {
    let total_scanned = History::find()
        .filter(history::Column::UserId.eq(auth.user_id))
        .count(&state.orm)
        .await? as i64;

    let discovered_this_month = History::find()
        .select_only()
        .column(history::Column::ProductId)
        .distinct()
        .filter(history::Column::UserId.eq(auth.user_id))
        .filter(history::Column::ScannedAt.gte(month_start(Utc::now()).fixed_offset()))
        .count(&state.orm)
        .await? as i64;

    Ok(ApiResponse::success(
        "Scan statistics fetched successfully",
        ScanStatistics {
            discovered_this_month,
            total_scanned,
        },
    ))
}

pub(crate) fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<users::Model> {
    Users::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User"))
}

pub(crate) async fn load_profile<C: ConnectionTrait>(
    db: &C,
    user: users::Model,
) -> AppResult<UserProfile> {
    let flags = health_flag_names(db, &user).await?;
    let badges = earned_badges(db, user.id)
        .await?
        .into_iter()
        .map(|b| b.badge.name)
        .collect();
    Ok(UserProfile::from_parts(user, flags, badges))
}

pub(crate) async fn health_flag_names<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
) -> AppResult<Vec<String>> {
    let flags = user
        .find_related(HealthFlags)
        .order_by_asc(health_flags::Column::Id)
        .all(db)
        .await?;
    Ok(flags.into_iter().map(|f| f.name).collect())
}

async fn earned_badges<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<Vec<EarnedBadge>> {
    let rows = UserBadges::find()
        .filter(user_badges::Column::UserId.eq(user_id))
        .find_also_related(Badges)
        .order_by_asc(user_badges::Column::EarnedAt)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(link, badge)| {
            badge.map(|b| EarnedBadge {
                badge: Badge::from(b),
                earned_at: link.earned_at.with_timezone(&Utc),
            })
        })
        .collect())
}

async fn find_or_create_health_flag<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> AppResult<health_flags::Model> {
    let existing = HealthFlags::find()
        .filter(health_flags::Column::Name.eq(name))
        .one(db)
        .await?;
    if let Some(flag) = existing {
        return Ok(flag);
    }
    let flag = health_flags::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::debug!(flag = %flag.name, "created health flag");
    Ok(flag)
}

pub(crate) async fn find_or_create_badge<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<String>,
) -> AppResult<badges::Model> {
    let existing = Badges::find()
        .filter(badges::Column::Name.eq(name))
        .one(db)
        .await?;
    if let Some(badge) = existing {
        return Ok(badge);
    }
    let badge = badges::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::debug!(badge = %badge.name, "created badge");
    Ok(badge)
}

/// Idempotent: an existing link is returned unchanged.
pub(crate) async fn link_badge<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    badge_id: i32,
) -> AppResult<user_badges::Model> {
    if let Some(link) = UserBadges::find_by_id((user_id, badge_id)).one(db).await? {
        return Ok(link);
    }
    let link = user_badges::ActiveModel {
        user_id: Set(user_id),
        badge_id: Set(badge_id),
        earned_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await?;
    Ok(link)
}

async fn link_health_flags<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    names: &[String],
) -> AppResult<()> {
    for name in names {
        let flag = find_or_create_health_flag(db, name).await?;
        user_health_flags::ActiveModel {
            user_id: Set(user_id),
            health_flag_id: Set(flag.id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn replace_health_flags<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    names: &[String],
) -> AppResult<()> {
    UserHealthFlags::delete_many()
        .filter(user_health_flags::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    link_health_flags(db, user_id, names).await
}
