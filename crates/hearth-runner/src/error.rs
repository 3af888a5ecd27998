//! Error types for the decision runtime.
//!
//! These never escape the public decision or dialogue operations: every
//! failure below is logged and converted into a fallback result. Only
//! configuration loading returns them to the caller.

/// Errors that can occur inside the runtime.
#[derive(Debug, thiserror::Error)]
pub enum MindError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to load or render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// The LLM backend returned an error status or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM answered with an empty message body.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The response text did not contain a usable payload.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
