//! `TickScheduler` — sparse per-tick action queue.
//!
//! Each tick the driver drains only the bucket for the tick that is ending,
//! so a behavior that wants to resume "in 40 ticks" costs nothing until then.
//!
//! `BTreeMap` gives O(log W) insert and pop where W is the number of distinct
//! future ticks with pending work, a handful in practice.

use std::collections::BTreeMap;

use tw_core::{DrainPolicy, Tick};

/// A deferred unit of work.  Runs at most once, with exclusive access to the
/// context that owns the scheduler.
pub type Action<C, E> = Box<dyn FnOnce(&mut C) -> Result<(), E>>;

/// The pending-action table plus the current tick.
///
/// Operations that may execute an action need the surrounding context and
/// live on [`SchedulerExt`][crate::SchedulerExt]; this type only stores.
pub struct TickScheduler<C, E> {
    now:      Tick,
    inner:    BTreeMap<Tick, Vec<Action<C, E>>>,
    /// Cached total action count for O(1) `len()`.
    total:    usize,
    policy:   DrainPolicy,
    /// Set while `advance` is draining the bucket for `now`.
    draining: bool,
}

impl<C, E> Default for TickScheduler<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> TickScheduler<C, E> {
    /// A scheduler at [`Tick::FIRST`] with the default drain policy.
    pub fn new() -> Self {
        Self::with_policy(DrainPolicy::default())
    }

    pub fn with_policy(policy: DrainPolicy) -> Self {
        Self {
            now:      Tick::FIRST,
            inner:    BTreeMap::new(),
            total:    0,
            policy,
            draining: false,
        }
    }

    /// The current tick.
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn policy(&self) -> DrainPolicy {
        self.policy
    }

    /// `true` while the bucket for `now()` is being executed.
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Append `action` to the bucket for `tick`.
    ///
    /// Callers guarantee `tick >= now()`.  Under
    /// [`DrainPolicy::DeferToNext`] an insertion for `now()` made while that
    /// bucket is draining lands on `now() + 1` instead.
    pub(crate) fn enqueue(&mut self, tick: Tick, action: Action<C, E>) {
        debug_assert!(tick >= self.now, "enqueue into the past: {tick} < {}", self.now);
        let tick = if self.draining && tick == self.now && self.policy == DrainPolicy::DeferToNext {
            self.now.next()
        } else {
            tick
        };
        self.inner.entry(tick).or_default().push(action);
        self.total += 1;
    }

    /// Remove and return every action queued for exactly `now()`.
    pub(crate) fn take_due(&mut self) -> Option<Vec<Action<C, E>>> {
        let actions = self.inner.remove(&self.now)?;
        self.total -= actions.len();
        Some(actions)
    }

    pub(crate) fn begin_drain(&mut self) {
        self.draining = true;
    }

    /// Close the drain.  The counter only moves on when every due action ran.
    pub(crate) fn end_drain(&mut self, completed: bool) {
        self.draining = false;
        if completed {
            self.now = self.now.next();
        }
    }

    /// The earliest tick with at least one queued action, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Number of actions queued for exactly `tick`.
    pub fn pending_at(&self, tick: Tick) -> usize {
        self.inner.get(&tick).map_or(0, Vec::len)
    }

    /// Total number of queued actions across all future ticks.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future ticks that have at least one queued action.
    pub fn tick_count(&self) -> usize {
        self.inner.len()
    }
}

impl<C, E> std::fmt::Debug for TickScheduler<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("now", &self.now)
            .field("pending", &self.total)
            .field("ticks", &self.inner.len())
            .field("policy", &self.policy)
            .finish()
    }
}
