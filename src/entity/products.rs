use sea_orm::entity::prelude::*;

/// `image_embedding vector(1536)` also lives on this table. It is not mapped
/// here; `services::similarity` reads and writes it with raw statements.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub generic_name: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub ai_health_summary: Option<String>,
    pub ai_health_conclusion: Option<String>,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::history::Entity")]
    History,
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

impl ActiveModelBehavior for ActiveModel {}
