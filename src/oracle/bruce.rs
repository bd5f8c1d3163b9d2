//! "Bruce", the immigration-law persona that answers taxonomy questions.
//!
//! Every prompt asks for strict JSON. List answers must be a JSON array of
//! strings and verdicts a `{"valid": bool}` object; anything else is a
//! [`OracleError::Parse`], never an empty result.

use serde::Deserialize;

use crate::domain::types::{CategoryName, SubCategoryName};
use crate::oracle::{CompletionClient, KnowledgeOracle, OracleError, OracleResult};

const SYSTEM_PROMPT: &str = "You are Bruce, a U.S. immigration law expert. \
Answer only with strict JSON and no commentary.";

/// [`KnowledgeOracle`] backed by an LLM completion client.
pub struct BruceOracle<C> {
    client: C,
}

impl<C: CompletionClient> BruceOracle<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    fn ask(&self, prompt: &str) -> OracleResult<String> {
        let answer = self.client.complete(SYSTEM_PROMPT, prompt)?;
        if answer.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(answer)
    }
}

impl<C: CompletionClient> KnowledgeOracle for BruceOracle<C> {
    fn sub_categories(&self, category: &CategoryName) -> OracleResult<Vec<String>> {
        let prompt = format!(
            "List the current sub-categories of the U.S. visa category \"{category}\". \
             Respond with a JSON array of strings."
        );
        parse_string_list(&self.ask(&prompt)?)
    }

    fn validate_sub_category(
        &self,
        category: &CategoryName,
        sub_category: &SubCategoryName,
    ) -> OracleResult<bool> {
        let prompt = format!(
            "Is \"{sub_category}\" a currently valid sub-category of the U.S. visa category \
             \"{category}\"? Respond with a JSON object {{\"valid\": true}} or \
             {{\"valid\": false}}, optionally with a \"reason\" string."
        );
        parse_verdict(&self.ask(&prompt)?)
    }

    fn visa_types(
        &self,
        category: &CategoryName,
        sub_categories: &[SubCategoryName],
    ) -> OracleResult<Vec<String>> {
        let subs = sub_categories
            .iter()
            .map(SubCategoryName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "List the U.S. visa types (for example \"H-1B\") that belong to the category \
             \"{category}\" with sub-categories [{subs}]. Respond with a JSON array of strings."
        );
        parse_string_list(&self.ask(&prompt)?)
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    valid: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Models often wrap JSON in a markdown code fence.
fn strip_code_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a JSON array of strings.
pub fn parse_string_list(answer: &str) -> OracleResult<Vec<String>> {
    serde_json::from_str::<Vec<String>>(strip_code_fence(answer))
        .map_err(|e| OracleError::Parse(format!("expected a JSON array of strings: {e}")))
}

/// Parse a `{"valid": bool}` verdict.
pub fn parse_verdict(answer: &str) -> OracleResult<bool> {
    let verdict = serde_json::from_str::<Verdict>(strip_code_fence(answer))
        .map_err(|e| OracleError::Parse(format!("expected a {{\"valid\": bool}} object: {e}")))?;
    if let Some(reason) = &verdict.reason {
        log::debug!("Bruce verdict {}: {reason}", verdict.valid);
    }
    Ok(verdict.valid)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Replays canned answers and records the prompts it received.
    struct ScriptedClient {
        answers: RefCell<Vec<String>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().rev().map(|a| a.to_string()).collect()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for &ScriptedClient {
        fn complete(&self, _system_prompt: &str, user_prompt: &str) -> OracleResult<String> {
            self.prompts.borrow_mut().push(user_prompt.to_string());
            self.answers
                .borrow_mut()
                .pop()
                .ok_or_else(|| OracleError::Transport("no scripted answer".into()))
        }
    }

    fn work() -> CategoryName {
        CategoryName::new("Work").unwrap()
    }

    #[test]
    fn parses_sub_category_array() {
        let client = ScriptedClient::new(&[r#"["Specialty Occupation", "Intracompany Transfer"]"#]);
        let oracle = BruceOracle::new(&client);

        let subs = oracle.sub_categories(&work()).unwrap();

        assert_eq!(subs, vec!["Specialty Occupation", "Intracompany Transfer"]);
        assert!(client.prompts.borrow()[0].contains("\"Work\""));
    }

    #[test]
    fn malformed_list_is_a_parse_error_not_an_empty_list() {
        let client = ScriptedClient::new(&[r#"{"subCategories": "none"}"#]);
        let oracle = BruceOracle::new(&client);

        let err = oracle.sub_categories(&work()).unwrap_err();

        assert!(matches!(err, OracleError::Parse(_)));
    }

    #[test]
    fn prose_answer_is_a_parse_error() {
        assert!(matches!(
            parse_string_list("Sure! Here are the visa types: H-1B, L-1A"),
            Err(OracleError::Parse(_))
        ));
    }

    #[test]
    fn unwraps_fenced_json() {
        let list = parse_string_list("```json\n[\"H-1B\", \"O-1\"]\n```").unwrap();
        assert_eq!(list, vec!["H-1B", "O-1"]);
    }

    #[test]
    fn parses_verdicts() {
        assert!(parse_verdict(r#"{"valid": true}"#).unwrap());
        assert!(!parse_verdict(r#"{"valid": false, "reason": "program ended"}"#).unwrap());
    }

    #[test]
    fn verdict_without_boolean_is_a_parse_error() {
        assert!(matches!(parse_verdict("yes"), Err(OracleError::Parse(_))));
        assert!(matches!(
            parse_verdict(r#"{"valid": "maybe"}"#),
            Err(OracleError::Parse(_))
        ));
    }

    #[test]
    fn blank_answer_is_reported_as_empty() {
        let client = ScriptedClient::new(&["   "]);
        let oracle = BruceOracle::new(&client);

        let err = oracle.visa_types(&work(), &[]).unwrap_err();

        assert!(matches!(err, OracleError::EmptyResponse));
    }

    #[test]
    fn visa_type_prompt_lists_sub_categories() {
        let client = ScriptedClient::new(&[r#"["H-1B"]"#]);
        let oracle = BruceOracle::new(&client);
        let subs = [SubCategoryName::new("Specialty Occupation").unwrap()];

        oracle.visa_types(&work(), &subs).unwrap();

        assert!(client.prompts.borrow()[0].contains("[Specialty Occupation]"));
    }
}
