//! Error types for u-pso.

use thiserror::Error;

/// Errors raised while configuring or running a swarm.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PsoError {
    /// `run` was called before the search dimensions were set.
    #[error("search dimensions have not been specified")]
    DimensionsNotSet,

    /// Particles could not be instantiated without a fitness function.
    #[error("no fitness function defined")]
    FitnessFnNotSet,

    /// The search space description is unusable.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A declared policy has no working implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The run ended without a single assessment that could become the
    /// best: every particle frozen, or every fitness NaN.
    #[error("no particle was assessed with a usable fitness during the run")]
    NoFitnessEvaluated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PsoError::DimensionsNotSet.to_string(),
            "search dimensions have not been specified"
        );
        assert_eq!(
            PsoError::InvalidConfig("swarm_size must be at least 1".into()).to_string(),
            "invalid configuration: swarm_size must be at least 1"
        );
        assert_eq!(
            PsoError::NotImplemented("bounce boundary policy").to_string(),
            "not implemented: bounce boundary policy"
        );
    }
}
