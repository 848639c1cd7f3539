pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::{PgProductStore, ProductStore};
pub mod batch_repo;
pub use batch_repo::BatchRepository;
pub mod ingredient_repo;
pub use ingredient_repo::IngredientRepository;
pub mod license_repo;
pub use license_repo::LicenseRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod vendor_repo;
pub use vendor_repo::VendorRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
