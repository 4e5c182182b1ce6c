pub mod assistant;
pub mod dashboard;
pub mod query;
pub mod revenue;
