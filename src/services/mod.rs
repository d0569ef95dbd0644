pub mod auth_service;
pub mod catalog_service;
pub mod history_service;
pub mod product_service;
pub mod review_service;
pub mod similarity;
pub mod user_service;
