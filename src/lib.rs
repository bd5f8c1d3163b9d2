//! Core library exports for the visa taxonomy synchronizer.
//!
//! The `data` feature exposes the persistence layer (`domain`, `models`,
//! `schema`, `repository`). The default `worker` feature adds the knowledge
//! oracle, the scrape source and the services that reconcile the catalog.

pub mod db;
pub mod domain;
pub mod error_conversions;
pub mod models;
pub mod repository;
pub mod schema;

#[cfg(feature = "worker")]
pub mod oracle;
#[cfg(feature = "worker")]
pub mod scrape;
#[cfg(feature = "worker")]
pub mod services;
