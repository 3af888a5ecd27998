//! Remote reasoning clients for behavior decisions and dialogue.
//!
//! Each client wraps one chat-completions backend and the shared prompt
//! engine. A request always yields a usable payload: when the variant has no
//! credential, or anything on the remote path fails (transport, status,
//! empty body, template, parse), the caller-supplied fallback is invoked
//! instead and the failure is logged at `warn`.
//!
//! Budget gating is not done here. Callers reserve a call on the shared
//! [`RateBudget`](crate::budget::RateBudget) before invoking `request`.

use std::sync::Arc;

use hearth_types::{
    BehaviorDecision, DecisionContext, DecisionSource, DialogueContext, DialogueResponse,
};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::MindError;
use crate::llm::{CompletionBackend, SamplingParams};
use crate::parse::{parse_reply, try_parse_decision};
use crate::prompt::PromptEngine;

/// Sampling used for behavior decisions.
pub const DECISION_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.7,
    max_tokens: 200,
};

/// Sampling used for dialogue replies.
pub const DIALOGUE_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.9,
    max_tokens: 150,
};

/// A payload together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    /// The decision or reply.
    pub value: T,
    /// Which path produced it.
    pub source: DecisionSource,
}

impl<T> Resolution<T> {
    /// A payload produced by the remote service.
    pub const fn remote(value: T) -> Self {
        Self {
            value,
            source: DecisionSource::Remote,
        }
    }

    /// A payload produced locally for the given reason.
    pub const fn local(value: T, source: DecisionSource) -> Self {
        Self { value, source }
    }
}

// ---------------------------------------------------------------------------
// Behavior decisions
// ---------------------------------------------------------------------------

/// Client for the behavior-decision variant.
pub struct DecisionClient {
    backend: Option<CompletionBackend>,
    prompts: Arc<PromptEngine>,
}

impl DecisionClient {
    /// Create a client. Without a credential the client is permanently
    /// unavailable and every request resolves to its fallback.
    pub fn new(config: &RemoteConfig, prompts: Arc<PromptEngine>) -> Self {
        Self {
            backend: CompletionBackend::new(config),
            prompts,
        }
    }

    /// True when a credential is configured.
    pub const fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Ask the remote service for a decision.
    ///
    /// Never fails: `fallback` supplies the decision whenever the remote
    /// path cannot.
    pub async fn request<F>(
        &self,
        context: &DecisionContext,
        fallback: F,
    ) -> Resolution<BehaviorDecision>
    where
        F: FnOnce() -> BehaviorDecision,
    {
        let Some(backend) = &self.backend else {
            return Resolution::local(fallback(), DecisionSource::Disabled);
        };

        match self.attempt(backend, context).await {
            Ok(decision) => {
                debug!(
                    agent_id = %context.agent_id,
                    action = %decision.action,
                    model = backend.model(),
                    "remote decision parsed"
                );
                Resolution::remote(decision)
            }
            Err(e) => {
                warn!(
                    agent_id = %context.agent_id,
                    error = %e,
                    "remote decision failed, using local engine"
                );
                Resolution::local(fallback(), DecisionSource::RemoteFallback)
            }
        }
    }

    async fn attempt(
        &self,
        backend: &CompletionBackend,
        context: &DecisionContext,
    ) -> Result<BehaviorDecision, MindError> {
        let prompt = self.prompts.render_decision(context)?;
        let raw = backend.complete(&prompt, DECISION_SAMPLING).await?;
        try_parse_decision(&raw)
    }
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// Client for the dialogue-generation variant.
pub struct DialogueClient {
    backend: Option<CompletionBackend>,
    prompts: Arc<PromptEngine>,
}

impl DialogueClient {
    /// Create a client. Without a credential the client is permanently
    /// unavailable and every request resolves to its fallback.
    pub fn new(config: &RemoteConfig, prompts: Arc<PromptEngine>) -> Self {
        Self {
            backend: CompletionBackend::new(config),
            prompts,
        }
    }

    /// True when a credential is configured.
    pub const fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Ask the remote service for an in-character reply.
    ///
    /// The speaker and emotion are taken from the context; only the text
    /// comes from the service.
    pub async fn request<F>(
        &self,
        context: &DialogueContext,
        fallback: F,
    ) -> Resolution<DialogueResponse>
    where
        F: FnOnce() -> DialogueResponse,
    {
        let Some(backend) = &self.backend else {
            return Resolution::local(fallback(), DecisionSource::Disabled);
        };

        match self.attempt(backend, context).await {
            Ok(text) => Resolution::remote(DialogueResponse {
                speaker: context.agent_name.clone(),
                text,
                emotion: context.mood,
            }),
            Err(e) => {
                warn!(
                    agent_name = context.agent_name,
                    error = %e,
                    "remote dialogue failed, using template reply"
                );
                Resolution::local(fallback(), DecisionSource::RemoteFallback)
            }
        }
    }

    async fn attempt(
        &self,
        backend: &CompletionBackend,
        context: &DialogueContext,
    ) -> Result<String, MindError> {
        let prompt = self.prompts.render_dialogue(context)?;
        let raw = backend.complete(&prompt, DIALOGUE_SAMPLING).await?;
        parse_reply(&raw).ok_or(MindError::EmptyResponse)
    }
}
