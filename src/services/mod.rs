pub mod admin_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod error;
pub mod investment_service;
pub mod policy_service;
pub mod session_service;

pub use admin_service::AdminService;
pub use auth_service::{AuthOutcome, AuthService, Principal};
pub use dashboard_service::{DashboardAnalytics, DashboardService, DashboardStats};
pub use error::{ServiceError, ServiceResult};
pub use investment_service::InvestmentService;
pub use policy_service::{PolicyService, Upload};
pub use session_service::{IssuedSession, SessionManager};
