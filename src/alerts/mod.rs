pub mod filter;
pub mod summary;
pub mod types;

pub use filter::{AlertFilter, RiskFilter};
pub use types::{Alert, DashboardStats};
