//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, names and status tags are checked once at the boundary
//! (database rows, oracle answers, scraped cells).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Case folding used wherever taxonomy names are compared.
///
/// Names coming from the oracle and from the store are matched ignoring case
/// and surrounding whitespace.
pub fn fold_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Case-insensitive comparison key.
            pub fn folded(&self) -> String {
                fold_name(&self.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

id_newtype!(CategoryId, "Identifier of a visa category.", "category_id");
id_newtype!(
    SubCategoryId,
    "Identifier of a sub-category row.",
    "sub_category_id"
);
id_newtype!(VisaTypeId, "Identifier of a scraped visa type.", "visa_type_id");
id_newtype!(ScrapeLogId, "Identifier of an audit log entry.", "scrape_log_id");

non_empty_string_newtype!(
    CategoryName,
    "Category name such as `Work` or `Family`.",
    "category name"
);
non_empty_string_newtype!(
    SubCategoryName,
    "Sub-category name reported by the knowledge oracle.",
    "sub-category name"
);
non_empty_string_newtype!(
    VisaTypeName,
    "Visa type name such as `H-1B`.",
    "visa type name"
);

url_string_newtype!(SourceUrl, "Page scraped by the visa type bot.", "source url");
url_string_newtype!(
    EndpointUrl,
    "Base URL of the chat-completions endpoint.",
    "endpoint url"
);

/// Lifecycle state of a sub-category. Rows are never deleted, only flipped
/// to [`SubCategoryStatus::Removed`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubCategoryStatus {
    Validated,
    Removed,
}

impl SubCategoryStatus {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validated => "Validated",
            Self::Removed => "Removed",
        }
    }
}

impl Display for SubCategoryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SubCategoryStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Validated" => Ok(Self::Validated),
            "Removed" => Ok(Self::Removed),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "sub-category status: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for SubCategoryStatus {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Action tag recorded in the scrape log.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScrapeAction {
    SubCategoryAdded,
    SubCategoryRemoved,
    VisaTypesUpdated,
    VisaTypesSkipped,
    Created,
    Skipped,
    Error,
}

impl ScrapeAction {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubCategoryAdded => "SubCategory Added",
            Self::SubCategoryRemoved => "SubCategory Removed",
            Self::VisaTypesUpdated => "VisaTypes Updated",
            Self::VisaTypesSkipped => "VisaTypes Skipped",
            Self::Created => "Created",
            Self::Skipped => "Skipped",
            Self::Error => "Error",
        }
    }
}

impl Display for ScrapeAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ScrapeAction {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, TypeConstraintError> {
        match value.trim() {
            "SubCategory Added" => Ok(Self::SubCategoryAdded),
            "SubCategory Removed" => Ok(Self::SubCategoryRemoved),
            "VisaTypes Updated" => Ok(Self::VisaTypesUpdated),
            "VisaTypes Skipped" => Ok(Self::VisaTypesSkipped),
            "Created" => Ok(Self::Created),
            "Skipped" => Ok(Self::Skipped),
            "Error" => Ok(Self::Error),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "scrape action: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for ScrapeAction {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, TypeConstraintError> {
        Self::try_from(value.as_str())
    }
}
