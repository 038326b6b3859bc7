//! `tw-schedule` — the tick scheduler.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `TickScheduler` (`BTreeMap<Tick, Vec<Action>>`), `Action` |
//! | [`ext`]       | `HasScheduler`, `SchedulerExt` (`schedule_*`, `advance`)  |
//!
//! # Model (summary)
//!
//! ```text
//! schedule_at(t, a)    t <  now → run a immediately
//!                      t >= now → append a to bucket[t]
//! schedule_after(d, a) = schedule_at(now + d, a)
//! schedule_next(a)     = schedule_at(now, a)      (runs in this tick's advance)
//! advance()            drain bucket[now] in order, then now += 1
//! ```
//!
//! The scheduler lives inside a context type `C`.  Actions receive `&mut C`,
//! so they can touch whatever the context owns, including the scheduler
//! itself (an action may schedule further actions).

pub mod ext;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use ext::{HasScheduler, SchedulerExt};
pub use scheduler::{Action, TickScheduler};
