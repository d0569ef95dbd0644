use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "health_flags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_health_flags::Entity")]
    UserHealthFlags,
}

impl Related<super::user_health_flags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserHealthFlags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
