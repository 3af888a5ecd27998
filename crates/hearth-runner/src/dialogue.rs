//! The active player conversation.
//!
//! At most one conversation is open at a time. Talking to a different agent
//! replaces the session and forgets everything said before; talking to the
//! same agent again appends to its history.
//!
//! [`DialogueSessions::open`] never suspends. Gating and budget reservation
//! happen before it returns; a remote reply runs as a spawned task and is
//! written into the history when it lands, in the order the lines were
//! spoken. A reply that lands after its session was replaced or closed is
//! handed to the caller but not recorded.

use std::collections::BTreeMap;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use hearth_types::{AgentId, DecisionSource, DialogueContext, DialogueResponse};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::budget::RateBudget;
use crate::client::{DialogueClient, Resolution};
use crate::fallback::fallback_reply;

/// One conversation with one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    /// Agent the player is talking to.
    pub agent_id: AgentId,
    /// Replies in the order the player's lines were spoken.
    pub history: Vec<DialogueResponse>,
}

/// Where a reply lands once it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplySlot {
    generation: u64,
    seq: u64,
}

#[derive(Debug)]
struct ActiveSession {
    agent_id: AgentId,
    generation: u64,
    next_seq: u64,
    replies: BTreeMap<u64, DialogueResponse>,
}

impl ActiveSession {
    fn into_session(self) -> DialogueSession {
        DialogueSession {
            agent_id: self.agent_id,
            history: self.replies.into_values().collect(),
        }
    }
}

/// Session state shared with in-flight reply tasks.
#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveSession>,
    generations: u64,
}

impl SessionState {
    /// Claim the next history slot for `agent_id`, starting a new session
    /// when none is open or it belongs to someone else.
    fn claim(&mut self, agent_id: AgentId) -> ReplySlot {
        let switching = self.active.as_ref().is_none_or(|s| s.agent_id != agent_id);
        if switching {
            if let Some(previous) = &self.active {
                info!(
                    previous_agent = %previous.agent_id,
                    agent_id = %agent_id,
                    discarded = previous.replies.len(),
                    "switching dialogue partner"
                );
            }
            self.generations = self.generations.wrapping_add(1);
            self.active = Some(ActiveSession {
                agent_id,
                generation: self.generations,
                next_seq: 0,
                replies: BTreeMap::new(),
            });
        }

        match &mut self.active {
            Some(session) => {
                let seq = session.next_seq;
                session.next_seq = seq.wrapping_add(1);
                ReplySlot {
                    generation: session.generation,
                    seq,
                }
            }
            None => ReplySlot {
                generation: self.generations,
                seq: 0,
            },
        }
    }

    /// Store a reply in its slot. Returns `false` when the session it was
    /// meant for is gone.
    fn record(&mut self, slot: ReplySlot, reply: DialogueResponse) -> bool {
        match &mut self.active {
            Some(session) if session.generation == slot.generation => {
                session.replies.insert(slot.seq, reply);
                true
            }
            _ => false,
        }
    }
}

/// An agent's reply to the player, possibly still on its way.
///
/// Await it to get the [`DialogueResponse`]. Dropping it does not cancel
/// the request; the reply is still recorded in the session.
#[derive(Debug)]
pub struct DialogueReply {
    state: ReplyState,
}

#[derive(Debug)]
enum ReplyState {
    Ready(DialogueResponse),
    Waiting {
        rx: oneshot::Receiver<DialogueResponse>,
        fallback: DialogueResponse,
    },
}

impl DialogueReply {
    /// A reply that is already known.
    pub(crate) const fn ready(reply: DialogueResponse) -> Self {
        Self {
            state: ReplyState::Ready(reply),
        }
    }

    /// Whether the reply is waiting on the remote service.
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, ReplyState::Waiting { .. })
    }
}

impl IntoFuture for DialogueReply {
    type Output = DialogueResponse;
    type IntoFuture = Pin<Box<dyn Future<Output = DialogueResponse> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            match self.state {
                ReplyState::Ready(reply) => reply,
                ReplyState::Waiting { rx, fallback } => rx.await.unwrap_or(fallback),
            }
        })
    }
}

/// Owns the single active [`DialogueSession`] and produces its replies.
pub struct DialogueSessions {
    client: Arc<DialogueClient>,
    budget: Arc<RateBudget>,
    state: Arc<Mutex<SessionState>>,
    pending: JoinSet<()>,
}

impl DialogueSessions {
    /// Create a manager with no open conversation.
    pub fn new(client: Arc<DialogueClient>, budget: Arc<RateBudget>) -> Self {
        Self {
            client,
            budget,
            state: Arc::new(Mutex::new(SessionState::default())),
            pending: JoinSet::new(),
        }
    }

    /// Ask the agent for a reply to the player and record it.
    ///
    /// Switching to a new agent discards the previous conversation first.
    /// Without a configured service or with the shared budget spent, the
    /// reply comes from the fallback templates and is ready immediately.
    /// Otherwise one budget call is reserved and the remote request is
    /// spawned; the returned [`DialogueReply`] resolves when it completes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, agent_id: AgentId, context: DialogueContext) -> DialogueReply {
        let Some(slot) = self.lock().map(|mut state| state.claim(agent_id)) else {
            return DialogueReply::ready(fallback_reply(&context));
        };

        let source = if !self.client.is_available() {
            Some(DecisionSource::Disabled)
        } else if !self.budget.try_consume() {
            Some(DecisionSource::BudgetExhausted)
        } else {
            None
        };

        if let Some(source) = source {
            let reply = fallback_reply(&context);
            store(&self.state, agent_id, slot, Resolution::local(reply.clone(), source));
            return DialogueReply::ready(reply);
        }

        let (tx, rx) = oneshot::channel();
        let fallback = fallback_reply(&context);
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        self.pending.spawn(async move {
            let resolution = client.request(&context, || fallback_reply(&context)).await;
            let reply = resolution.value.clone();
            store(&state, agent_id, slot, resolution);
            // The caller may have dropped its handle.
            let _ = tx.send(reply);
        });

        DialogueReply {
            state: ReplyState::Waiting { rx, fallback },
        }
    }

    /// Replies in the active conversation, in the order the player's lines
    /// were spoken. Replies still in flight are not included. Empty when no
    /// conversation is open.
    pub fn history(&self) -> Vec<DialogueResponse> {
        self.lock()
            .and_then(|state| {
                state
                    .active
                    .as_ref()
                    .map(|s| s.replies.values().cloned().collect())
            })
            .unwrap_or_default()
    }

    /// Agent of the active conversation.
    pub fn active_agent(&self) -> Option<AgentId> {
        self.lock()
            .and_then(|state| state.active.as_ref().map(|s| s.agent_id))
    }

    /// End the active conversation, returning it. Replies still in flight
    /// for it are dropped when they land.
    pub fn close(&mut self) -> Option<DialogueSession> {
        self.lock()
            .and_then(|mut state| state.active.take())
            .map(ActiveSession::into_session)
    }

    /// Remote replies not yet reaped.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Collect reply tasks that have already completed.
    pub fn reap_finished(&mut self) {
        while let Some(result) = self.pending.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "remote dialogue task did not complete");
            }
        }
    }

    /// Wait for every remote reply in flight to land.
    pub async fn settle(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "remote dialogue task did not complete");
            }
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, SessionState>> {
        self.state.lock().ok()
    }
}

/// Write a resolved reply into its session slot.
fn store(
    state: &Mutex<SessionState>,
    agent_id: AgentId,
    slot: ReplySlot,
    resolution: Resolution<DialogueResponse>,
) {
    let recorded = state
        .lock()
        .is_ok_and(|mut state| state.record(slot, resolution.value));
    if recorded {
        debug!(
            agent_id = %agent_id,
            decision_source = resolution.source.as_str(),
            "dialogue reply resolved"
        );
    } else {
        debug!(
            agent_id = %agent_id,
            decision_source = resolution.source.as_str(),
            "dialogue reply arrived after its session ended"
        );
    }
}
