//! `tw-behavior` — pluggable controllers and the world they act on.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`domain`]   | `Domain`, `Snapshot`, `BehaviorKind` — what the host plugs in     |
//! | [`command`]  | `Command` enum (`MoveTo`, `Assign`)                               |
//! | [`context`]  | `Frame` (one tick's snapshots), `TickContext` (what `run` sees)   |
//! | [`controller`] | `Controller` trait                                              |
//! | [`noop`]     | `NoopController` — never does anything                            |
//! | [`registry`] | `ControllerRegistry` — behavior kind → constructor                |
//! | [`world`]    | `World` — scheduler, sentries, bindings, ranks, command outbox    |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                              |
//!
//! # Design notes
//!
//! Everything a controller may change lives in one [`World`]: the tick
//! scheduler, the sentry tables, the binding table, the rank side table and
//! the outgoing commands.  Scheduled actions and sentry callbacks are
//! closures over `&mut World`, so a deferred rebind and an immediate one go
//! through the same code.
//!
//! Behaviors are a closed enum chosen by the host ([`Domain::Behavior`]);
//! strings only appear where a name comes from configuration
//! ([`ControllerRegistry::create_by_name`]).

pub mod command;
pub mod context;
pub mod controller;
pub mod domain;
pub mod error;
pub mod noop;
pub mod registry;
pub mod world;


pub use command::Command;
pub use context::{Frame, TickContext};
pub use controller::Controller;
pub use domain::{AgentState, BehaviorKind, Domain, EntityState, Snapshot};
pub use error::{BehaviorError, BehaviorResult};
pub use noop::NoopController;
pub use registry::ControllerRegistry;
pub use world::{Rank, Rebind, World};

pub use tw_sentry::{CallbackId, Transition};
