use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{CategoryId, VisaTypeId, VisaTypeName, fold_name};

/// Visa type names attached to a category.
///
/// Persisted as a JSON array of strings. Two lists are equal when they hold
/// the same names ignoring case, order and duplicates.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VisaTypeList(Vec<String>);

impl VisaTypeList {
    /// Build a list from raw names, trimming each entry, dropping blanks and
    /// collapsing case-insensitive duplicates (the first spelling wins).
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref().trim();
                if name.is_empty() || !seen.insert(fold_name(name)) {
                    None
                } else {
                    Some(name.to_string())
                }
            })
            .collect();
        Self(names)
    }

    /// Parse the persisted column. `NULL` and blank values read as empty.
    pub fn from_json(raw: Option<&str>) -> Result<Self, serde_json::Error> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(raw) => {
                let names: Vec<String> = serde_json::from_str(raw)?;
                Ok(Self::new(names))
            }
        }
    }

    /// Serialize for the persisted column.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names joined for audit notes.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    fn keys(&self) -> BTreeSet<String> {
        self.0.iter().map(|name| fold_name(name)).collect()
    }
}

impl PartialEq for VisaTypeList {
    fn eq(&self, other: &Self) -> bool {
        self.keys() == other.keys()
    }
}

impl Eq for VisaTypeList {}

/// Visa type row created by the scrape bot.
#[derive(Debug, Clone, Serialize)]
pub struct VisaType {
    pub id: VisaTypeId,
    pub category_id: CategoryId,
    pub name: VisaTypeName,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// Data required to insert a new [`VisaType`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisaType {
    pub category_id: CategoryId,
    pub name: VisaTypeName,
    pub description: String,
    pub created_at: NaiveDateTime,
}
