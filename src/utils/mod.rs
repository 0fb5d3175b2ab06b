pub mod country;
pub mod uptime;

pub use country::{CountryCatalog, Iso3166Catalog};
pub use uptime::format_uptime;
