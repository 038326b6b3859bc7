//! Framework error type.
//!
//! Sub-crates define their own error enums (`SentryError`, `GraphError`,
//! `BehaviorError`, …).  `TwError` covers the few failures that belong to the
//! shared core: malformed configuration values.

use thiserror::Error;

/// The error type for `tw-core`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TwError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `tw-core`.
pub type TwResult<T> = Result<T, TwError>;
