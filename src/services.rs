pub mod analytics;
pub mod assistant_service;
pub mod dashboard_service;
pub mod query_service;

pub use assistant_service::AssistantService;
pub use dashboard_service::DashboardService;
pub use query_service::QueryService;
