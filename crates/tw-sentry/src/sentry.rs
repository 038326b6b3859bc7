//! The `StateSentry` itself.

use std::fmt;
use std::hash::Hash;

use tracing::trace;
use tw_core::Tick;

use crate::{SentryError, SentryResult};

#[cfg(feature = "fx-hash")]
type HookMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type HookMap<K, V> = std::collections::HashMap<K, V>;

/// A one-shot on-enter callback.  Receives the caller's context and the
/// transition that triggered it.
pub type Callback<S, C, E> = Box<dyn FnOnce(&mut C, Transition<S>) -> Result<(), E>>;

/// Handle returned by [`StateSentry::on_enter`], used to cancel a single
/// callback.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CallbackId(u64);

/// A detected change of state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Transition<S> {
    /// The previous state; `None` on the first observation.
    pub from: Option<S>,
    /// The state just entered.
    pub to:   S,
    /// Tick at which the change was observed.
    pub tick: Tick,
}

/// The result of a synchronization that changed state: the transition plus
/// the callbacks that were waiting for it, already detached from the sentry.
#[must_use = "callbacks only run when the batch is fired"]
pub struct Entered<S, C, E> {
    transition: Transition<S>,
    callbacks:  Vec<Callback<S, C, E>>,
}

impl<S: Copy, C, E> Entered<S, C, E> {
    pub fn transition(&self) -> Transition<S> {
        self.transition
    }

    /// Number of callbacks in the batch.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke the callbacks in registration order.  Stops at the first error;
    /// callbacks after it are dropped.
    pub fn fire(self, ctx: &mut C) -> Result<usize, E> {
        let mut fired = 0;
        for callback in self.callbacks {
            callback(ctx, self.transition)?;
            fired += 1;
        }
        Ok(fired)
    }
}

impl<S: fmt::Debug, C, E> fmt::Debug for Entered<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entered")
            .field("transition", &self.transition)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Tracks the state of one observed object across ticks.
///
/// Time is supplied by the caller (`now`) on every call that needs it; the
/// sentry never owns a clock.
pub struct StateSentry<S, C, E> {
    state:      Option<S>,
    entered_at: Option<Tick>,
    hooks:      HookMap<S, Vec<(CallbackId, Callback<S, C, E>)>>,
    next_id:    u64,
}

impl<S, C, E> Default for StateSentry<S, C, E>
where
    S: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, E> StateSentry<S, C, E>
where
    S: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            state:      None,
            entered_at: None,
            hooks:      HookMap::default(),
            next_id:    0,
        }
    }

    /// Last observed state, or `None` before the first synchronization.
    pub fn state(&self) -> Option<S> {
        self.state
    }

    /// Tick at which the current state was entered.
    pub fn entered_at(&self) -> Option<Tick> {
        self.entered_at
    }

    /// Compare `state` against the last observation.
    ///
    /// On a change the new state and `now` are recorded, and the callbacks
    /// registered for `state` are detached and returned; fire them with
    /// [`Entered::fire`].  Returns `None` when the state is unchanged.
    pub fn synchronize(&mut self, state: S, now: Tick) -> Option<Entered<S, C, E>> {
        if self.state == Some(state) {
            return None;
        }
        let from = self.state.replace(state);
        self.entered_at = Some(now);
        let callbacks: Vec<_> = self
            .hooks
            .remove(&state)
            .map(|hooks| hooks.into_iter().map(|(_, cb)| cb).collect())
            .unwrap_or_default();
        trace!(?from, to = ?state, tick = now.0, callbacks = callbacks.len(), "state entered");
        Some(Entered {
            transition: Transition { from, to: state, tick: now },
            callbacks,
        })
    }

    /// [`synchronize`][Self::synchronize] and fire in one step.  Returns
    /// whether the state changed.
    ///
    /// Only usable when `ctx` does not own this sentry; the driver instead
    /// detaches the batch first and fires it once the sentry borrow ends.
    pub fn synchronize_with(&mut self, state: S, now: Tick, ctx: &mut C) -> Result<bool, E> {
        match self.synchronize(state, now) {
            Some(entered) => entered.fire(ctx).map(|_| true),
            None => Ok(false),
        }
    }

    /// Ticks spent in the current state as of `now`.
    pub fn ticks_passed(&self, now: Tick) -> SentryResult<u64> {
        let entered = self.entered_at.ok_or(SentryError::NoTransition)?;
        now.since(entered).ok_or(SentryError::ClockBehind { entered, now })
    }

    /// Queue `callback` to run the next time `state` is entered.  Several
    /// callbacks for one state all fire, in registration order.
    pub fn on_enter<F>(&mut self, state: S, callback: F) -> CallbackId
    where
        F: FnOnce(&mut C, Transition<S>) -> Result<(), E> + 'static,
    {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.hooks.entry(state).or_default().push((id, Box::new(callback)));
        id
    }

    /// Remove the callback `id` registered for `state`, or every callback
    /// for `state` when `id` is `None`.  Returns how many were removed.
    pub fn cancel_on_enter(&mut self, state: S, id: Option<CallbackId>) -> usize {
        let Some(hooks) = self.hooks.get_mut(&state) else {
            return 0;
        };
        let before = hooks.len();
        match id {
            Some(id) => hooks.retain(|(hook, _)| *hook != id),
            None => hooks.clear(),
        }
        let removed = before - hooks.len();
        if hooks.is_empty() {
            self.hooks.remove(&state);
        }
        removed
    }

    /// Number of callbacks waiting for `state`.
    pub fn pending(&self, state: S) -> usize {
        self.hooks.get(&state).map_or(0, Vec::len)
    }
}

impl<S: fmt::Debug, C, E> fmt::Debug for StateSentry<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSentry")
            .field("state", &self.state)
            .field("entered_at", &self.entered_at)
            .field("hooked_states", &self.hooks.len())
            .finish()
    }
}
