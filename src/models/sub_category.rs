use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::sub_category::{
    NewSubCategory as DomainNewSubCategory, SubCategory as DomainSubCategory,
};
use crate::domain::types::{SubCategoryName, SubCategoryStatus, TypeConstraintError};

/// Diesel model representing the `sub_categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::sub_categories)]
pub struct SubCategory {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`SubCategory`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::sub_categories)]
pub struct NewSubCategory {
    pub category_id: i32,
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SubCategory> for DomainSubCategory {
    type Error = TypeConstraintError;

    fn try_from(sub_category: SubCategory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: sub_category.id.try_into()?,
            category_id: sub_category.category_id.try_into()?,
            name: SubCategoryName::new(sub_category.name)?,
            status: SubCategoryStatus::try_from(sub_category.status)?,
            created_at: sub_category.created_at,
            updated_at: sub_category.updated_at,
        })
    }
}

impl From<&DomainNewSubCategory> for NewSubCategory {
    fn from(sub_category: &DomainNewSubCategory) -> Self {
        Self {
            category_id: sub_category.category_id.get(),
            name: sub_category.name.as_str().to_string(),
            status: sub_category.status.as_str().to_string(),
            created_at: sub_category.created_at,
            updated_at: sub_category.updated_at,
        }
    }
}
