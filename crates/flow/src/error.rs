//! Error taxonomy for the interaction controller.
//!
//! Only bridge failures are ever user-visible; invalid transitions are
//! defensive no-ops reported to the caller, and timeline cancellation is a
//! normal outcome, never an error.

use bridge::BridgeError;
use thiserror::Error;

use crate::phase::PhaseId;

/// Errors surfaced by the interaction controller.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A transition was requested to a phase not reachable from the current
    /// phase. Ignored at runtime; surfaced only by config validation.
    #[error("invalid transition from `{from}` to `{to}`")]
    InvalidTransition {
        /// The phase the request arrived in.
        from: PhaseId,
        /// The requested target.
        to: PhaseId,
    },

    /// A flow definition referenced a phase that does not exist.
    #[error("unknown phase `{0}`")]
    UnknownPhase(PhaseId),

    /// A flow definition is structurally invalid.
    #[error("invalid flow definition: {0}")]
    InvalidDefinition(String),

    /// An injected bridge call failed. Non-fatal: the session falls back and
    /// remains usable.
    #[error("bridge failure in `{phase}`: {source}")]
    Bridge {
        /// The phase that was current while the call was pending.
        phase: PhaseId,
        /// The underlying failure.
        #[source]
        source: BridgeError,
    },
}

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;
