//! `tw-graph` — an immutable tree of declared states.
//!
//! # Crate layout
//!
//! | Module      | Contents                                         |
//! |-------------|--------------------------------------------------|
//! | [`builder`] | `StateGraphBuilder` (declare, then `build`)      |
//! | [`graph`]   | `StateGraph`, `Node`, `StatePath`                |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                   |
//!
//! The tree records which coarse states sit above which others.  Walking
//! parent links from a state up to one of its ancestors yields the ordered
//! list of intermediate steps between the two:
//!
//! ```text
//!        a
//!       / \          find_path(d)          = [a, c, d]
//!      b   c         find_path(d, from: c) = [c, d]
//!          |         find_path(d, from: b) = NoPath
//!          d         find_path(a, from: a) = []
//! ```
//!
//! It is a single-parent tree, not a general graph: `build` rejects anything
//! that is not exactly one rooted tree.

pub mod builder;
pub mod error;
pub mod graph;


pub use builder::StateGraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Node, StateGraph, StatePath};
