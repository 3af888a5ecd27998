//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Identifiers are never minted from a process-wide counter. Whoever owns a
//! world or session holds an [`IdGenerator`] and hands out ids from it, so
//! two worlds in the same process (or two tests running in parallel) never
//! share a sequence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent (autonomous or player-controlled).
    AgentId
}

/// A source of fresh [`AgentId`]s, owned by a single world or session.
pub trait IdGenerator {
    /// Produce the next identifier. Never returns the same id twice for
    /// the lifetime of the generator.
    fn next_agent_id(&mut self) -> AgentId;
}

/// Deterministic generator: `1, 2, 3, ...` encoded as UUIDs.
///
/// Used by tests and replays where stable ids matter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    /// Start a new sequence at 1.
    pub const fn new() -> Self {
        Self { next: 0 }
    }
}

impl IdGenerator for SequentialIds {
    fn next_agent_id(&mut self) -> AgentId {
        self.next = self.next.saturating_add(1);
        AgentId(Uuid::from_u128(self.next))
    }
}

/// Generator backed by UUID v7 (time-ordered).
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn next_agent_id(&mut self) -> AgentId {
        AgentId(Uuid::now_v7())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_stable_and_scoped() {
        let mut a = SequentialIds::new();
        let mut b = SequentialIds::new();
        let first = a.next_agent_id();
        let second = a.next_agent_id();
        assert_ne!(first, second);
        // A fresh generator starts over; nothing is shared between instances.
        assert_eq!(b.next_agent_id(), first);
        assert_eq!(first.into_inner(), Uuid::from_u128(1));
    }

    #[test]
    fn time_ordered_ids_are_distinct() {
        let mut ids = TimeOrderedIds;
        assert_ne!(ids.next_agent_id(), ids.next_agent_id());
    }

    #[test]
    fn id_serializes_as_plain_uuid() {
        let id = AgentId(Uuid::from_u128(7));
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = TimeOrderedIds.next_agent_id();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
