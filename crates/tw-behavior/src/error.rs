use thiserror::Error;
use tw_core::AgentId;
use tw_sentry::SentryError;

#[derive(Debug, Error)]
pub enum BehaviorError {
    /// A behavior kind or name with no registered constructor.  This is a
    /// wiring mistake, not a runtime condition.
    #[error("unknown behavior {0:?}")]
    UnknownBehavior(String),

    #[error("behavior {0:?} registered twice")]
    DuplicateBehavior(String),

    #[error("{0} has no controller bound")]
    Unbound(AgentId),

    #[error(transparent)]
    Sentry(#[from] SentryError),

    /// Raised by controller code itself.
    #[error("behavior fault: {0}")]
    Fault(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
