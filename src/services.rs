pub mod auth;
pub mod batch_service;
pub mod dashboard_service;
pub mod expense_service;
pub mod ingredient_service;
pub mod license_service;
pub mod notification_service;
pub mod stage_tracker;
pub mod vendor_service;
