use chrono::Utc;

use crate::domain::category::NewCategory;
use crate::domain::types::CategoryName;
use crate::repository::{CategoryReader, CategoryWriter};

use super::ServiceResult;

/// Categories every installation starts with.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Visit",
    "Immigrate",
    "Investment",
    "Work",
    "Asylum",
    "Study",
    "Family",
];

/// Create any default category missing from the store.
///
/// Returns how many categories were created. Existing categories, including
/// their visa type lists, are left untouched.
pub fn bootstrap_categories<R>(repo: &R) -> ServiceResult<usize>
where
    R: CategoryReader + CategoryWriter,
{
    let existing: Vec<String> = repo
        .list_categories()?
        .iter()
        .map(|category| category.name.folded())
        .collect();

    let mut created = 0;
    for name in DEFAULT_CATEGORIES {
        let name = CategoryName::new(name)?;
        if existing.contains(&name.folded()) {
            continue;
        }
        repo.create_category(&NewCategory {
            name: name.clone(),
            updated_at: Utc::now().naive_utc(),
        })?;
        log::info!("Created category {name}");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;

    #[test]
    fn creates_every_default_category_once() {
        let repo = TestRepository::new();

        assert_eq!(bootstrap_categories(&repo).unwrap(), 7);
        assert_eq!(bootstrap_categories(&repo).unwrap(), 0);
        assert_eq!(repo.list_categories().unwrap().len(), 7);
    }

    #[test]
    fn keeps_existing_categories_and_their_visa_types() {
        let repo = TestRepository::new();
        repo.add_category("work", &["H-1B"]);

        assert_eq!(bootstrap_categories(&repo).unwrap(), 6);
        assert_eq!(repo.category("work").visa_types().unwrap().as_slice(), ["H-1B"]);
    }
}
