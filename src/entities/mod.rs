pub mod supplies;
pub mod usage_history;
pub mod users;
