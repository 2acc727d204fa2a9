// Inventory management
pub mod supplies;

// Analytics and reporting
pub mod analytics;
pub mod reports;
