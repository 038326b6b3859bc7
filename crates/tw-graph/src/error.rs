//! Tree construction errors.  All of them are raised before a `StateGraph`
//! exists, so a malformed tree can never be queried.

use thiserror::Error;

/// Errors produced by `tw-graph`.  States are rendered with `{:?}`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("state {state} declared twice")]
    DuplicateState { state: String },

    #[error("state {state} is a child of both {first} and {second}")]
    MultipleParents { state: String, first: String, second: String },

    #[error("root state {state} was never declared")]
    UnknownRoot { state: String },

    #[error("root state {state} is declared as a child of {parent}")]
    RootHasParent { state: String, parent: String },

    #[error("state {state} is not reachable from root {root}")]
    Unreachable { state: String, root: String },

    #[error("no states declared")]
    Empty,
}

pub type GraphResult<T> = Result<T, GraphError>;
