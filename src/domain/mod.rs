pub mod category;
pub mod scrape_log;
pub mod sub_category;
pub mod types;
pub mod visa_type;
