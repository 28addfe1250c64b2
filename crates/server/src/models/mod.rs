//! Domain models for the declared API catalog and call log.

pub mod api_log;
pub mod catalog;
pub mod declared_api;

pub use api_log::{ApiLogEntry, NewApiLogEntry};
pub use catalog::{ApiAccount, ApiName, NewApiAccount, NewApiName};
pub use declared_api::{ConnectOptions, DeclaredApi, NewDeclaredApi, declares_date_range};
