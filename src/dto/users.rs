use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    entity::users,
    error::AppResult,
    validation::{normalize_email, normalize_tags, validate_name, validate_password},
};
use sea_orm::Set;

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub health_flags: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Registration input after validation.
#[derive(Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub health_flags: Vec<String>,
    pub badges: Vec<String>,
}

impl RegisterUserRequest {
    pub fn validate(self) -> AppResult<NewUser> {
        Ok(NewUser {
            name: validate_name("Name", &self.name)?,
            email: normalize_email(&self.email)?,
            password: validate_password(&self.password)?.to_string(),
            health_flags: normalize_tags("Health flag", &self.health_flags)?,
            badges: normalize_tags("Badge", &self.badges)?,
        })
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Replaces the whole set when present.
    pub health_flags: Option<Vec<String>>,
}

impl UserPatch {
    /// Validates every provided field and writes the scalar ones into `active`.
    /// Returns the normalized health flag list, if one was supplied.
    pub fn apply(self, active: &mut users::ActiveModel) -> AppResult<Option<Vec<String>>> {
        if let Some(name) = self.name {
            active.name = Set(validate_name("Name", &name)?);
        }
        if let Some(email) = self.email {
            active.email = Set(normalize_email(&email)?);
        }
        self.health_flags
            .map(|flags| normalize_tags("Health flag", &flags))
            .transpose()
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthFlagsUpdate {
    pub health_flags: Vec<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AwardBadgeRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateHealthFlagRequest {
    pub name: String,
}
