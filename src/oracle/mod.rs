//! Knowledge oracle answering taxonomy questions about visa categories.
//!
//! The synchronizer only sees [`KnowledgeOracle`]. Prompt construction and
//! answer parsing live in [`bruce`], the HTTP transport in [`openai`].

use thiserror::Error;

use crate::domain::types::{CategoryName, SubCategoryName};

pub mod bruce;
pub mod openai;

pub use bruce::BruceOracle;
pub use openai::OpenAiClient;

/// Errors from the oracle and its transport.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(String),
    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("oracle returned an empty answer")]
    EmptyResponse,
    #[error("failed to parse oracle answer: {0}")]
    Parse(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Source of category taxonomy facts.
///
/// Answers may be non-monotonic: a name can be missing from one call and
/// present in the next.
pub trait KnowledgeOracle {
    /// Current sub-categories of `category`.
    fn sub_categories(&self, category: &CategoryName) -> OracleResult<Vec<String>>;
    /// Whether `sub_category` is a legitimate sub-category of `category`.
    fn validate_sub_category(
        &self,
        category: &CategoryName,
        sub_category: &SubCategoryName,
    ) -> OracleResult<bool>;
    /// Visa types of `category` given its validated sub-categories.
    fn visa_types(
        &self,
        category: &CategoryName,
        sub_categories: &[SubCategoryName],
    ) -> OracleResult<Vec<String>>;
}

/// Single-shot text completion.
pub trait CompletionClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> OracleResult<String>;
}
