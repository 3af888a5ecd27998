//! Chat-completions transport.
//!
//! Both remote variants talk to an OpenAI-compatible chat completions
//! endpoint over HTTP via `reqwest`. The backend does not care which model
//! is behind the API: it sends a rendered prompt and returns whatever text
//! comes back in `choices[0].message.content`.

use crate::config::RemoteConfig;
use crate::error::MindError;
use crate::prompt::RenderedPrompt;

/// Sampling settings sent with every request of one variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Softmax temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Posts to the configured endpoint verbatim (the full
/// `.../chat/completions` URL) with a bearer credential.
pub struct CompletionBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl CompletionBackend {
    /// Create a backend for a configured variant.
    ///
    /// Returns `None` when the variant has no credential.
    pub fn new(config: &RemoteConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Model identifier, for logging.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the response text.
    ///
    /// # Errors
    ///
    /// [`MindError::LlmBackend`] when the request fails, the status is not
    /// 2xx, or the body has no message content; [`MindError::EmptyResponse`]
    /// when the content is blank.
    pub async fn complete(
        &self,
        prompt: &RenderedPrompt,
        sampling: SamplingParams,
    ) -> Result<String, MindError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": sampling.temperature,
            "max_tokens": sampling.max_tokens,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MindError::LlmBackend(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(MindError::LlmBackend(format!(
                "endpoint returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MindError::LlmBackend(format!("response decode failed: {e}")))?;

        extract_content(&json)
    }
}

/// Extract the text content from a chat completions response.
fn extract_content(json: &serde_json::Value) -> Result<String, MindError> {
    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            MindError::LlmBackend("response missing choices[0].message.content".to_owned())
        })?;

    if content.trim().is_empty() {
        return Err(MindError::EmptyResponse);
    }
    Ok(content.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"action\": \"WORK\", \"target\": \"forge\"}"
                }
            }]
        });
        let result = extract_content(&json);
        assert!(result.is_ok());
        assert!(result.unwrap_or_default().contains("WORK"));
    }

    #[test]
    fn extract_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(matches!(
            extract_content(&json),
            Err(MindError::LlmBackend(_))
        ));
    }

    #[test]
    fn extract_content_empty_choices() {
        let json = serde_json::json!({"choices": []});
        assert!(extract_content(&json).is_err());
    }

    #[test]
    fn blank_content_is_empty_response() {
        let json = serde_json::json!({
            "choices": [{"message": {"content": "  \n"}}]
        });
        assert!(matches!(
            extract_content(&json),
            Err(MindError::EmptyResponse)
        ));
    }

    #[test]
    fn backend_requires_credential() {
        assert!(CompletionBackend::new(&RemoteConfig::disabled()).is_none());

        let config = RemoteConfig {
            api_key: Some("sk-test".to_owned()),
            ..RemoteConfig::disabled()
        };
        let backend = CompletionBackend::new(&config);
        assert_eq!(
            backend.as_ref().map(CompletionBackend::model),
            Some(crate::config::DEFAULT_MODEL)
        );
    }
}
