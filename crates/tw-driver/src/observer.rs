//! Driver observer trait for progress reporting and tracing.

use tw_behavior::{Domain, Rebind};
use tw_core::Tick;

/// What happened during one driver pass.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickSummary {
    pub tick:     Tick,
    /// Controllers run.
    pub ran:      usize,
    /// Scheduled actions executed by the advance.
    pub actions:  usize,
    pub rebinds:  usize,
    pub commands: usize,
}

/// Callbacks invoked by [`Driver::on_tick_observed`][crate::Driver::on_tick_observed]
/// at key points of a tick.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — rebind printer
///
/// ```rust,ignore
/// struct RebindPrinter;
///
/// impl DriverObserver<Building> for RebindPrinter {
///     fn on_rebind(&mut self, rebind: &Rebind<Strategy>) {
///         println!("{}: {} -> {}", rebind.tick, rebind.agent, rebind.to.name());
///     }
/// }
/// ```
pub trait DriverObserver<D: Domain> {
    /// Called before anything else happens in the tick.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per binding change made during the tick, in order,
    /// after the advance.
    fn on_rebind(&mut self, _rebind: &Rebind<D::Behavior>) {}

    /// Called after a tick completed successfully.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}
}

/// A [`DriverObserver`] that does nothing.
pub struct NoopObserver;

impl<D: Domain> DriverObserver<D> for NoopObserver {}
