pub mod badges;
pub mod health_flags;
pub mod history;
pub mod products;
pub mod reviews;
pub mod user_badges;
pub mod user_health_flags;
pub mod users;

pub use badges::Entity as Badges;
pub use health_flags::Entity as HealthFlags;
pub use history::Entity as History;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use user_badges::Entity as UserBadges;
pub use user_health_flags::Entity as UserHealthFlags;
pub use users::Entity as Users;
