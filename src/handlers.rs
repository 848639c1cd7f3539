pub mod batches;
pub mod dashboard;
pub mod expenses;
pub mod ingredients;
pub mod licenses;
pub mod notifications;
pub mod products;
pub mod system;
pub mod users;
pub mod vendors;
