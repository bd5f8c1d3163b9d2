pub use errors::{ServiceError, ServiceResult};

pub mod audit_export;
pub mod bootstrap;
pub mod errors;
pub mod runner;
pub mod scrape_bot;
pub mod sync;
