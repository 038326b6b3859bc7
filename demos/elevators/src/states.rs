//! Ancestry of passenger states, used to classify observed transitions.

use tw_graph::{GraphResult, StateGraph, StateGraphBuilder, StatePath};

use crate::domain::PassengerState;

/// How one observed transition relates to the passenger state tree.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Step {
    /// Parent to child.
    Advance,
    /// Descendant further down, skipping states in between.
    Skip,
    /// Back to an ancestor, e.g. a failed boarding.
    Retry,
    /// Into another branch.
    Sideways,
}

/// ```text
/// waiting_for_elevator
/// ├── moving_to_elevator
/// │   ├── using_elevator
/// │   │   └── exiting
/// │   └── returning
/// └── moving_to_floor
/// ```
pub fn passenger_graph() -> GraphResult<StateGraph<PassengerState, &'static str>> {
    use PassengerState::*;

    let mut b = StateGraphBuilder::new();
    b.add(WaitingForElevator, "waiting for an elevator", [MovingToElevator, MovingToFloor])?
        .add(MovingToElevator, "walking to an elevator", [UsingElevator, Returning])?
        .add(UsingElevator, "riding", [Exiting])?
        .add(Exiting, "leaving the elevator", [])?
        .add(Returning, "walking back", [])?
        .add(MovingToFloor, "taking the stairs", [])?;
    b.build(Some(WaitingForElevator))
}

pub fn classify(
    graph: &StateGraph<PassengerState, &'static str>,
    from:  PassengerState,
    to:    PassengerState,
) -> Step {
    match graph.find_path(&to, Some(&from)) {
        StatePath::Found(nodes) if nodes.len() == 2 => Step::Advance,
        StatePath::Found(_) => Step::Skip,
        StatePath::NoPath if graph.is_ancestor(&to, &from) => Step::Retry,
        StatePath::NoPath => Step::Sideways,
    }
}
