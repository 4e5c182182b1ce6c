pub mod assistant;
pub mod dashboard;
pub mod health;
pub mod query;
