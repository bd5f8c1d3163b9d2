use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, VisaTypeName};
use crate::domain::visa_type::{NewVisaType as DomainNewVisaType, VisaType as DomainVisaType};

/// Diesel model representing the `visa_types` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::visa_types)]
pub struct VisaType {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`VisaType`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::visa_types)]
pub struct NewVisaType {
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<VisaType> for DomainVisaType {
    type Error = TypeConstraintError;

    fn try_from(visa_type: VisaType) -> Result<Self, Self::Error> {
        Ok(Self {
            id: visa_type.id.try_into()?,
            category_id: visa_type.category_id.try_into()?,
            name: VisaTypeName::new(visa_type.name)?,
            description: visa_type.description,
            created_at: visa_type.created_at,
        })
    }
}

impl From<&DomainNewVisaType> for NewVisaType {
    fn from(visa_type: &DomainNewVisaType) -> Self {
        Self {
            category_id: visa_type.category_id.get(),
            name: visa_type.name.as_str().to_string(),
            description: visa_type.description.clone(),
            created_at: visa_type.created_at,
        }
    }
}
