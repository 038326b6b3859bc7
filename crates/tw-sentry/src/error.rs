use thiserror::Error;
use tw_core::Tick;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SentryError {
    /// The sentry has never been synchronized, so there is no state whose
    /// age could be reported.
    #[error("no transition recorded yet")]
    NoTransition,

    #[error("state entered at {entered}, which is after the current tick {now}")]
    ClockBehind { entered: Tick, now: Tick },
}

pub type SentryResult<T> = Result<T, SentryError>;
