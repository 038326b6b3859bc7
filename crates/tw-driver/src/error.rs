use thiserror::Error;
use tw_behavior::BehaviorError;
use tw_core::Tick;

#[derive(Debug, Error)]
pub enum DriverError {
    /// The host reported a tick other than the one the driver is at.
    #[error("host reported tick {got}, expected {expected}")]
    Protocol { expected: Tick, got: Tick },

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    /// An earlier tick failed; the driver state is no longer trustworthy.
    #[error("driver refused the tick after an earlier fault")]
    Poisoned,
}

pub type DriverResult<T> = Result<T, DriverError>;
