pub mod category;
pub mod config;
pub mod scrape_log;
pub mod sub_category;
pub mod visa_type;
