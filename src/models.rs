pub mod auth;
pub mod batch;
pub mod dashboard;
pub mod expense;
pub mod ingredient;
pub mod license;
pub mod notification;
pub mod product;
pub mod vendor;
