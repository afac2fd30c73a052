use crate::location::SourceLocation;
use thiserror::Error;

/// Error kinds surfaced by the core. Only `StackCorruption` is fatal to a
/// session; everything else is reported to the operator and leaves state
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error("command issued while not suspended")]
    NotSuspended,

    #[error("pop from an empty call stack")]
    EmptyStack,

    #[error("call stack corrupted: {0}")]
    StackCorruption(String),

    #[error("location {0} is outside any known buffer")]
    InvalidLocation(SourceLocation),

    #[error("viewport rejected: {0}")]
    ViewportUnderflow(String),
}
