pub mod auth;
pub mod history;
pub mod products;
pub mod reviews;
pub mod users;
