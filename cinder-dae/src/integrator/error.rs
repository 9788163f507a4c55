use thiserror::Error;

use crate::engine::{EngineError, IcPolicy};

/// Errors produced by the DAE integration adapter.
///
/// Nothing is retried above the engine's own recoverable-residual
/// mechanism; every failure aborts the in-progress operation and
/// propagates to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// An option value was rejected before reaching the engine.
    #[error("invalid {option}: {reason}")]
    InvalidConfig { option: &'static str, reason: String },

    /// The operation requires a prior call to `init`.
    #[error("{operation} requires init() to be called first")]
    NotInitialized { operation: &'static str },

    /// The engine refused an applied option or setup call.
    #[error("engine rejected {operation} (code {code})")]
    Engine { operation: &'static str, code: i32 },

    /// The engine reported an unrecoverable failure while advancing.
    /// The integration state is left at the last successfully reached
    /// point.
    #[error("integration failed at t = {time} (engine code {code})")]
    StepFailed { time: f64, code: i32 },

    /// `step` or `solve` was called with a target not ahead of the
    /// current time.
    #[error("target time {target} is not ahead of current time {current}")]
    TargetNotAhead { target: f64, current: f64 },

    /// An accessor index was out of range.
    #[error("{what} index {index} out of range (limit {limit})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    /// The engine could not produce a consistent initial condition pair
    /// under the named correction policy.
    #[error("consistent initial condition correction ({policy:?}) failed (engine code {code})")]
    InconsistentInitialConditions { policy: IcPolicy, code: i32 },
}

impl Error {
    pub(crate) fn engine(operation: &'static str, err: EngineError) -> Self {
        Self::Engine {
            operation,
            code: err.code,
        }
    }

    pub(crate) fn config(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            reason: reason.into(),
        }
    }
}
