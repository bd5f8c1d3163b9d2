use diesel::prelude::*;

use crate::domain::types::VisaTypeName;
use crate::domain::visa_type::{NewVisaType, VisaType};
use crate::models::visa_type::{NewVisaType as DbNewVisaType, VisaType as DbVisaType};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, VisaTypeReader, VisaTypeWriter};

impl VisaTypeReader for DieselRepository {
    fn get_visa_type_by_name(&self, name: &VisaTypeName) -> RepositoryResult<Option<VisaType>> {
        use crate::schema::visa_types;

        let mut conn = self.conn()?;

        let result = visa_types::table
            .filter(visa_types::name.eq(name.as_str()))
            .first::<DbVisaType>(&mut conn)
            .optional()?;

        let result = result.map(TryInto::try_into).transpose()?;
        Ok(result)
    }
}

impl VisaTypeWriter for DieselRepository {
    fn create_visa_type(&self, visa_type: &NewVisaType) -> RepositoryResult<usize> {
        use crate::schema::visa_types;

        let mut conn = self.conn()?;
        let db_visa_type: DbNewVisaType = visa_type.into();

        let affected = diesel::insert_into(visa_types::table)
            .values(db_visa_type)
            .execute(&mut conn)?;

        Ok(affected)
    }
}
