pub mod ad_service;
pub mod query;

pub use ad_service::{AdService, QuotaStatus};
pub use query::{AdQuery, PageLimits, QueryEngine};
