pub mod revenue_repo;
pub use revenue_repo::RevenueRepository;
