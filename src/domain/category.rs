use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{CategoryId, CategoryName, TypeConstraintError};
use crate::domain::visa_type::VisaTypeList;

/// Top-level visa category together with its stored visa type list.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    /// Persisted JSON array, parsed on demand by [`Category::visa_types`].
    pub visa_types_json: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Category {
    /// Parse the stored visa type list. `NULL` reads as empty.
    pub fn visa_types(&self) -> Result<VisaTypeList, TypeConstraintError> {
        VisaTypeList::from_json(self.visa_types_json.as_deref()).map_err(|e| {
            TypeConstraintError::InvalidValue(format!("visa types of {}: {e}", self.name))
        })
    }
}

/// Data required to insert a new [`Category`].
///
/// Categories start without visa types; the first synchronization pass fills
/// them in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub updated_at: NaiveDateTime,
}
