use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub hashed_password: String,
    pub total_taste_points: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::history::Entity")]
    History,
    #[sea_orm(has_many = "super::user_badges::Entity")]
    UserBadges,
    #[sea_orm(has_many = "super::user_health_flags::Entity")]
    UserHealthFlags,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl Related<super::user_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBadges.def()
    }
}

impl Related<super::user_health_flags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserHealthFlags.def()
    }
}

impl Related<super::badges::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_badges::Relation::Badges.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_badges::Relation::Users.def().rev())
    }
}

impl Related<super::health_flags::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_health_flags::Relation::HealthFlags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_health_flags::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
