//! `tw-sentry` — state transition detection for observed objects.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`sentry`] | `StateSentry`, `Transition`, `Entered`, `CallbackId`, `Callback` |
//! | [`table`]  | `SentryTable` — lazily populated `BTreeMap<K, StateSentry>`    |
//! | [`error`]  | `SentryError`, `SentryResult<T>`                               |
//!
//! # Contract
//!
//! A sentry is fed a fresh state every tick.  Whenever the state differs from
//! the last one seen (the very first observation always does), the sentry
//! records the tick and hands back every callback registered for the state
//! just entered.  Callbacks are one-shot: once handed back they are gone, and
//! must be registered again to fire on a later re-entry.
//!
//! Remaining in a state never fires anything.

pub mod error;
pub mod sentry;
pub mod table;


pub use error::{SentryError, SentryResult};
pub use sentry::{Callback, CallbackId, Entered, StateSentry, Transition};
pub use table::SentryTable;
