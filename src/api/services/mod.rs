pub mod ads;
pub mod error_code;
pub mod health;
pub mod helpers;

pub use ads::{AdHandlers, ad_routes};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
