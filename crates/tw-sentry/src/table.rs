//! `SentryTable` — one sentry per observed identity.
//!
//! Sentries are created the first time an identity is synchronized (or when
//! a callback is registered for an identity not seen yet) and live for the
//! rest of the run.  Identities the host stops reporting simply stop being
//! synchronized.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use tw_core::Tick;

use crate::{Entered, SentryError, SentryResult, StateSentry};

pub struct SentryTable<K, S, C, E> {
    sentries: BTreeMap<K, StateSentry<S, C, E>>,
}

impl<K, S, C, E> Default for SentryTable<K, S, C, E> {
    fn default() -> Self {
        Self { sentries: BTreeMap::new() }
    }
}

impl<K, S, C, E> SentryTable<K, S, C, E>
where
    K: Copy + Ord,
    S: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronize the sentry for `id`, creating it on first sight.
    pub fn synchronize(&mut self, id: K, state: S, now: Tick) -> Option<Entered<S, C, E>> {
        self.entry(id).synchronize(state, now)
    }

    /// The sentry for `id`, created empty if it does not exist yet.
    pub fn entry(&mut self, id: K) -> &mut StateSentry<S, C, E> {
        self.sentries.entry(id).or_default()
    }

    pub fn get(&self, id: K) -> Option<&StateSentry<S, C, E>> {
        self.sentries.get(&id)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut StateSentry<S, C, E>> {
        self.sentries.get_mut(&id)
    }

    /// Last observed state of `id`.
    pub fn state(&self, id: K) -> Option<S> {
        self.sentries.get(&id).and_then(StateSentry::state)
    }

    /// Ticks `id` has spent in its current state.  An identity never
    /// synchronized reports [`SentryError::NoTransition`].
    pub fn ticks_passed(&self, id: K, now: Tick) -> SentryResult<u64> {
        self.sentries
            .get(&id)
            .ok_or(SentryError::NoTransition)?
            .ticks_passed(now)
    }

    pub fn contains(&self, id: K) -> bool {
        self.sentries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sentries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentries.is_empty()
    }

    /// Tracked identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.sentries.keys().copied()
    }
}

impl<K: fmt::Debug, S: fmt::Debug, C, E> fmt::Debug for SentryTable<K, S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sentries.iter()).finish()
    }
}
