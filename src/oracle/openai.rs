//! Blocking client for OpenAI-compatible `/chat/completions` endpoints.

use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::domain::types::EndpointUrl;
use crate::models::config::OracleConfig;
use crate::oracle::{CompletionClient, OracleError, OracleResult};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions client with bounded retries on transient failures.
pub struct OpenAiClient {
    agent: ureq::Agent,
    base_url: EndpointUrl,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    retry_backoff: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: EndpointUrl, config: &OracleConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
        })
    }

    fn send_once(&self, body: &serde_json::Value) -> OracleResult<String> {
        let response = self
            .agent
            .post(&self.endpoint())
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(body);

        match response {
            Ok(response) => {
                let parsed: ChatCompletionResponse = response
                    .into_json()
                    .map_err(|e| OracleError::Parse(format!("invalid completion envelope: {e}")))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or(OracleError::EmptyResponse)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(OracleError::Status { status, body })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(OracleError::Transport(transport.to_string()))
            }
        }
    }
}

/// Transport failures, rate limits and server errors are worth another try.
fn is_retryable(error: &OracleError) -> bool {
    match error {
        OracleError::Transport(_) => true,
        OracleError::Status { status, .. } => *status == 429 || *status >= 500,
        OracleError::EmptyResponse | OracleError::Parse(_) => false,
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> OracleResult<String> {
        let body = self.request_body(system_prompt, user_prompt);
        let mut attempt = 0;
        loop {
            match self.send_once(&body) {
                Ok(answer) => return Ok(answer),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    log::warn!(
                        "Oracle call failed ({e}); retry {attempt}/{}",
                        self.max_retries
                    );
                    thread::sleep(self.retry_backoff * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OpenAiClient {
        let config = OracleConfig {
            base_url: base_url.into(),
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            timeout_secs: 5,
            max_retries: 2,
            retry_backoff_ms: 10,
        };
        OpenAiClient::new(EndpointUrl::new(base_url).unwrap(), &config)
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        assert_eq!(
            client("https://api.openai.com/v1/").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_carries_both_prompts() {
        let body = client("https://api.openai.com/v1").request_body("system", "user");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn retries_only_transient_failures() {
        assert!(is_retryable(&OracleError::Transport("reset".into())));
        assert!(is_retryable(&OracleError::Status {
            status: 429,
            body: String::new()
        }));
        assert!(is_retryable(&OracleError::Status {
            status: 503,
            body: String::new()
        }));
        assert!(!is_retryable(&OracleError::Status {
            status: 401,
            body: String::new()
        }));
        assert!(!is_retryable(&OracleError::Parse("bad".into())));
    }

    #[test]
    fn parses_completion_envelope() {
        let envelope: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"[\"H-1B\"]"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            envelope.choices[0].message.content.as_deref(),
            Some("[\"H-1B\"]")
        );
    }
}
