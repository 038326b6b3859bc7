//! `tw-core` — foundational types for the `tickwork` behavior framework.
//!
//! This crate is a dependency of every other `tw-*` crate.  It intentionally
//! has no `tw-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                          |
//! |------------|---------------------------------------------------|
//! | [`ids`]    | `AgentId`, `EntityId`                             |
//! | [`time`]   | `Tick`                                            |
//! | [`config`] | `EngineConfig`, `DrainPolicy`, `RunOrder`         |
//! | [`error`]  | `TwError`, `TwResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DrainPolicy, EngineConfig, RunOrder};
pub use error::{TwError, TwResult};
pub use ids::{AgentId, EntityId};
pub use time::Tick;
