//! The host-facing type bundle.

use std::fmt;
use std::hash::Hash;

use tw_core::{AgentId, EntityId};

/// A read-only, host-owned view of one object at the current tick.
///
/// The core only ever reads identity and state.
pub trait Snapshot {
    type Id: Copy + Ord + Hash + fmt::Debug + fmt::Display;
    type State: Copy + Eq + Hash + fmt::Debug + 'static;

    fn id(&self) -> Self::Id;

    fn state(&self) -> Self::State;
}

/// A closed set of behaviors, typically a field-less enum.
pub trait BehaviorKind: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    /// Stable name used for configuration and logs.
    fn name(self) -> &'static str;
}

/// Binds the framework to one host simulation.
pub trait Domain: Sized + 'static {
    /// Snapshot of an agent (controlled).
    type Agent: Snapshot<Id = AgentId>;
    /// Snapshot of an entity (observed).
    type Entity: Snapshot<Id = EntityId>;
    /// Target of [`Command::MoveTo`][crate::Command::MoveTo].
    type Position: Copy + PartialEq + fmt::Debug + 'static;
    type Behavior: BehaviorKind;
    /// Cross-controller state kept in the [`World`][crate::World].
    type Shared: Default + 'static;
}

/// State type of `D`'s agents.
pub type AgentState<D> = <<D as Domain>::Agent as Snapshot>::State;

/// State type of `D`'s entities.
pub type EntityState<D> = <<D as Domain>::Entity as Snapshot>::State;
