//! Scheduling operations on a context that owns a [`TickScheduler`].
//!
//! Running an action needs `&mut C`, and the scheduler is a field of `C`, so
//! the operations are written against the context rather than the scheduler:
//! the scheduler borrow is released before an action is invoked.

use tracing::trace;
use tw_core::Tick;

use crate::TickScheduler;

/// A context that embeds a [`TickScheduler`] whose actions operate on it.
pub trait HasScheduler: Sized {
    /// Error type actions may fail with.  It aborts the current advance.
    type Error;

    fn scheduler(&self) -> &TickScheduler<Self, Self::Error>;

    fn scheduler_mut(&mut self) -> &mut TickScheduler<Self, Self::Error>;
}

/// Scheduling operations, available on every [`HasScheduler`] context.
pub trait SchedulerExt: HasScheduler {
    /// The current tick.
    #[inline]
    fn now(&self) -> Tick {
        self.scheduler().now()
    }

    /// Run `action` at `tick`.
    ///
    /// A tick already in the past runs `action` right here, before this call
    /// returns, and never touches the pending table.  `now()` itself is not in
    /// the past: the action waits for this tick's [`advance`][Self::advance].
    fn schedule_at<F>(&mut self, tick: Tick, action: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error> + 'static,
    {
        if tick < self.now() {
            trace!(tick = tick.0, now = self.now().0, "past-tick action runs immediately");
            return action(self);
        }
        self.scheduler_mut().enqueue(tick, Box::new(action));
        Ok(())
    }

    /// Run `action` `delta` ticks from now.  `delta == 0` is the same as
    /// [`schedule_next`][Self::schedule_next].
    fn schedule_after<F>(&mut self, delta: u64, action: F)
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error> + 'static,
    {
        let tick = self.now().offset(delta);
        self.scheduler_mut().enqueue(tick, Box::new(action));
    }

    /// Run `action` during the current tick's advance.
    fn schedule_next<F>(&mut self, action: F)
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error> + 'static,
    {
        let tick = self.now();
        self.scheduler_mut().enqueue(tick, Box::new(action));
    }

    /// Execute every action due at `now()` in registration order, then move
    /// to the next tick.  Returns the number of actions executed.
    ///
    /// Actions queued for `now()` by the actions being drained follow the
    /// scheduler's [`DrainPolicy`][tw_core::DrainPolicy]: with `UntilEmpty`
    /// they run in this same call (an action that keeps re-queueing itself
    /// for `now()` never lets the tick end); with `DeferToNext` they wait one
    /// tick.
    ///
    /// If an action fails, the rest of the bucket is dropped, the tick is not
    /// incremented, and the error is returned.
    fn advance(&mut self) -> Result<usize, Self::Error> {
        let tick = self.now();
        self.scheduler_mut().begin_drain();
        let mut executed = 0;
        while let Some(due) = self.scheduler_mut().take_due() {
            for action in due {
                if let Err(e) = action(self) {
                    self.scheduler_mut().end_drain(false);
                    return Err(e);
                }
                executed += 1;
            }
        }
        self.scheduler_mut().end_drain(true);
        trace!(tick = tick.0, executed, "tick advanced");
        Ok(executed)
    }
}

impl<T: HasScheduler> SchedulerExt for T {}
