use flavorpal_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        badges, health_flags, products, user_health_flags, users, Badges, HealthFlags, Products,
        UserHealthFlags, Users,
    },
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

const HEALTH_FLAGS: &[&str] = &["peanut", "gluten", "lactose", "vegan", "vegetarian", "low sugar"];

const BADGES: &[(&str, &str)] = &[
    ("First Scan", "Scanned your first product"),
    ("First Review", "Wrote your first review"),
    ("Explorer", "Scanned ten different products"),
];

const PRODUCTS: &[(&str, &str, &str)] = &[
    ("Oat Drink Barista", "7394376616037", "Oatly"),
    ("Dark Chocolate 70%", "3046920022651", "Lindt"),
    ("Sparkling Water", "5449000131805", "Bonaqua"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let flag_ids = seed_health_flags(&orm).await?;
    seed_badges(&orm).await?;
    seed_products(&orm).await?;
    let user_id = ensure_user(&orm, "demo@flavorpal.app", "demo123", flag_ids.first().copied())
        .await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn seed_health_flags(orm: &DatabaseConnection) -> anyhow::Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(HEALTH_FLAGS.len());
    for name in HEALTH_FLAGS {
        let existing = HealthFlags::find()
            .filter(health_flags::Column::Name.eq(*name))
            .one(orm)
            .await?;
        let flag = match existing {
            Some(flag) => flag,
            None => {
                health_flags::ActiveModel {
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .insert(orm)
                .await?
            }
        };
        ids.push(flag.id);
    }
    println!("Seeded health flags");
    Ok(ids)
}

async fn seed_badges(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for (name, description) in BADGES {
        let existing = Badges::find()
            .filter(badges::Column::Name.eq(*name))
            .one(orm)
            .await?;
        if existing.is_none() {
            badges::ActiveModel {
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                ..Default::default()
            }
            .insert(orm)
            .await?;
        }
    }
    println!("Seeded badges");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for (name, barcode, brands) in PRODUCTS {
        let existing = Products::find()
            .filter(products::Column::Barcode.eq(*barcode))
            .one(orm)
            .await?;
        if existing.is_none() {
            products::ActiveModel {
                name: Set(name.to_string()),
                barcode: Set(Some(barcode.to_string())),
                brands: Set(Some(brands.to_string())),
                ..Default::default()
            }
            .insert(orm)
            .await?;
        }
    }
    println!("Seeded products");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    flag_id: Option<i32>,
) -> anyhow::Result<i32> {
    if let Some(user) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(user.id);
    }

    let hashed_password = hash_password(password)?;
    let user = users::ActiveModel {
        name: Set("Demo".to_string()),
        email: Set(email.to_string()),
        hashed_password: Set(hashed_password),
        total_taste_points: Set(0),
        ..Default::default()
    }
    .insert(orm)
    .await?;

    if let Some(flag_id) = flag_id {
        UserHealthFlags::insert(user_health_flags::ActiveModel {
            user_id: Set(user.id),
            health_flag_id: Set(flag_id),
        })
        .exec_without_returning(orm)
        .await?;
    }

    println!("Ensured user {email}");
    Ok(user.id)
}
