//! Collaborator interfaces: what the runtime reads from the world and where
//! it sends its results.
//!
//! The runtime owns no world state beyond agent vitals. Time of day,
//! weather and positions come from a [`WorldView`]; resolved decisions go
//! out through an [`EventNotifier`].

use hearth_types::{AgentId, DecisionRecord, Position, WorldSnapshot};
use tokio::sync::mpsc;
use tracing::info;

/// Read-only access to the simulated world.
pub trait WorldView {
    /// Time of day and weather for this tick.
    fn snapshot(&self) -> WorldSnapshot;

    /// Position of the reference actor (the player).
    fn reference_position(&self) -> Position;

    /// Position of an agent, or `None` if the world does not know it.
    fn agent_position(&self, agent_id: AgentId) -> Option<Position>;
}

/// One-way sink for resolved decisions.
///
/// Implementations must not block: `publish` is called from spawned remote
/// attempts as well as from the tick itself.
pub trait EventNotifier: Send + Sync {
    /// Deliver one resolved decision.
    fn publish(&self, record: &DecisionRecord);
}

/// Forwards records into an unbounded channel.
///
/// Records published after the receiver is dropped are discarded.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<DecisionRecord>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DecisionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventNotifier for ChannelNotifier {
    fn publish(&self, record: &DecisionRecord) {
        // A closed channel means nobody is listening any more.
        let _ = self.tx.send(record.clone());
    }
}

/// Writes each record as a structured `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl EventNotifier for TracingNotifier {
    fn publish(&self, record: &DecisionRecord) {
        info!(
            agent_id = %record.agent_id,
            action = %record.decision.action,
            target = record.decision.target,
            priority = record.decision.priority,
            duration_secs = record.decision.duration,
            decision_source = record.source.as_str(),
            reasoning = record.decision.reasoning,
            "decision published"
        );
    }
}
