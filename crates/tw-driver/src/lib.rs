//! `tw-driver` — per-tick orchestrator for the tickwork behavior framework.
//!
//! # Tick pass
//!
//! ```text
//! on_tick(frame):
//!   ① Bind     — owned agents seen for the first time get the initial behavior.
//!   ② Refresh  — synchronize every sentry; on-enter callbacks fire.
//!   ③ Run      — Controller::run once per owned agent, by rank
//!                (RunOrder; ties keep host order).
//!   ④ Advance  — drain actions due this tick, now += 1.
//!   ⑤ Flush    — return this tick's commands; report rebinds to the observer.
//! ```
//!
//! The host must call once per tick, in order.  With
//! [`Driver::on_tick_at`] the host's tick number is checked against the
//! driver's; any mismatch is fatal.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tw_behavior::{ControllerRegistry, Frame};
//! use tw_driver::DriverBuilder;
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register_default::<Loading>(Strategy::Loading)?;
//! let mut driver = DriverBuilder::new(registry, Strategy::Loading).build()?;
//! for tick in 1..=ticks {
//!     let frame = host.frame();
//!     for command in driver.on_tick_at(Tick(tick), &frame)? {
//!         host.apply(command);
//!     }
//! }
//! ```

pub mod builder;
pub mod driver;
pub mod error;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::DriverBuilder;
pub use driver::Driver;
pub use error::{DriverError, DriverResult};
pub use observer::{DriverObserver, NoopObserver, TickSummary};
