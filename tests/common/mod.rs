//! Helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use tempfile::NamedTempFile;
use visa_sync::db::{DbPool, establish_connection_pool, run_migrations};
use visa_sync::domain::types::{CategoryName, SubCategoryName};
use visa_sync::oracle::{KnowledgeOracle, OracleResult};

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// Scripted oracle: fixed sub-category and visa type lists per category,
/// explicit rejections, everything else validates.
#[derive(Default)]
pub struct ScriptedOracle {
    sub_categories: Mutex<HashMap<String, Vec<String>>>,
    visa_types: Mutex<HashMap<String, Vec<String>>>,
    rejected: Mutex<Vec<(String, String)>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sub_categories(&self, category: &str, names: &[&str]) {
        self.sub_categories.lock().unwrap().insert(
            category.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }

    pub fn set_visa_types(&self, category: &str, names: &[&str]) {
        self.visa_types.lock().unwrap().insert(
            category.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }

    pub fn reject(&self, category: &str, sub_category: &str) {
        self.rejected
            .lock()
            .unwrap()
            .push((category.to_string(), sub_category.to_string()));
    }
}

impl KnowledgeOracle for ScriptedOracle {
    fn sub_categories(&self, category: &CategoryName) -> OracleResult<Vec<String>> {
        Ok(self
            .sub_categories
            .lock()
            .unwrap()
            .get(category.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn validate_sub_category(
        &self,
        category: &CategoryName,
        sub_category: &SubCategoryName,
    ) -> OracleResult<bool> {
        let key = (category.to_string(), sub_category.to_string());
        Ok(!self.rejected.lock().unwrap().contains(&key))
    }

    fn visa_types(
        &self,
        category: &CategoryName,
        _sub_categories: &[SubCategoryName],
    ) -> OracleResult<Vec<String>> {
        Ok(self
            .visa_types
            .lock()
            .unwrap()
            .get(category.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
