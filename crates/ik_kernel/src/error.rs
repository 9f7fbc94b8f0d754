use thiserror::Error;

/// Convenience alias for fallible chain and solver operations.
pub type KinematicsResult<T> = Result<T, KinematicsError>;

/// Configuration errors raised before any chain state is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("a kinematic chain needs at least one link")]
    EmptyChain,
    #[error("link {index} has invalid length {length} (must be finite and positive)")]
    InvalidLinkLength { index: usize, length: f32 },
    #[error("expected {expected} joint angles, got {actual}")]
    AngleCountMismatch { expected: usize, actual: usize },
    #[error("invalid solver configuration: {0}")]
    InvalidSolverConfig(String),
}
