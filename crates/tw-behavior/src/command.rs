//! Commands: the only effects the core has on the host simulation.

use tw_core::{AgentId, EntityId};

/// A request for the host, collected during a tick and handed back when the
/// tick ends.  The core never learns whether the host honored it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<P> {
    /// Direct `agent` to `position`.
    MoveTo {
        agent:    AgentId,
        position: P,
    },

    /// Hand `entity` to `agent`.
    Assign {
        entity: EntityId,
        agent:  AgentId,
    },
}
