//! PSO configuration, boundary and termination policies.
//!
//! [`PsoConfig`] holds every parameter that shapes a run.

use super::types::Bound;
use crate::error::PsoError;
use std::collections::BTreeSet;
use std::time::Duration;

/// What to do with a dimension whose proposed position leaves its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryPolicy {
    /// Re-sample the dimension uniformly inside its bound. Velocity is kept.
    #[default]
    RandomReinit,

    /// Keep the current coordinate; no movement on that axis this iteration.
    Refuse,

    /// Reflect off the violated bound.
    ///
    /// Not implemented: applying it returns [`PsoError::NotImplemented`].
    Bounce,
}

/// Rules that may end a run.
///
/// Only `Iterations` stops a run today. `Convergence` and `Duration` are
/// accepted and recorded but have no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationPolicy {
    /// Stop once `max_iter` iterations have run.
    Iterations,

    /// Stop when the best-fitness delta stays below `min_fitness_delta`.
    Convergence,

    /// Stop after `time_delta` of wall-clock time.
    Duration,
}

/// Arguments consumed by the termination controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminationArgs {
    /// Iteration budget. Always enforced.
    pub max_iter: usize,

    /// Wall-clock budget for `TerminationPolicy::Duration`.
    pub time_delta: Duration,

    /// Threshold for `TerminationPolicy::Convergence`.
    pub min_fitness_delta: f64,
}

impl Default for TerminationArgs {
    fn default() -> Self {
        Self {
            max_iter: 1_000_000,
            time_delta: Duration::from_secs(4 * 60),
            min_fitness_delta: 0.0,
        }
    }
}

/// Configuration for a particle swarm run.
///
/// # Defaults
///
/// ```
/// use u_pso::pso::PsoConfig;
///
/// let config = PsoConfig::default();
/// assert_eq!(config.swarm_size, 10);
/// assert_eq!(config.num_informants, 6);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_pso::pso::{BoundaryPolicy, PsoConfig};
///
/// let config = PsoConfig::default()
///     .with_swarm_size(40)
///     .with_num_informants(5)
///     .with_coefficients(0.7, 1.5, 1.5, 0.5)
///     .with_boundary_policy(BoundaryPolicy::Refuse)
///     .with_max_iter(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoConfig {
    /// Number of particles, fixed for a run.
    pub swarm_size: usize,

    /// Informants per particle. Must be less than `swarm_size`.
    pub num_informants: usize,

    /// Bound used for every dimension when the search space is given as a
    /// plain dimension count.
    pub bound: Bound,

    /// Share of the previous velocity retained.
    pub alpha: f64,

    /// Upper limit of the random pull toward the personal best.
    pub beta: f64,

    /// Upper limit of the random pull toward the informants' best.
    pub gamma: f64,

    /// Upper limit of the random pull toward the swarm best.
    pub delta: f64,

    /// Step size applied to the velocity when moving.
    pub epsilon: f64,

    /// Policy for out-of-bound moves.
    pub boundary_policy: BoundaryPolicy,

    /// Termination policies. The iteration budget applies regardless.
    pub termination_policy: BTreeSet<TerminationPolicy>,

    /// Termination thresholds.
    pub termination_args: TerminationArgs,

    /// Run each phase across particles with rayon.
    ///
    /// Only honored when the `parallel` feature is enabled.
    pub parallel: bool,

    /// Keep every particle's pre-update velocities for diagnostics.
    pub track_velocity_history: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 10,
            num_informants: 6,
            bound: Bound::new(-1.0, 1.0),
            alpha: 0.1,
            beta: 1.3,
            gamma: 1.4,
            delta: 1.3,
            epsilon: 0.1,
            boundary_policy: BoundaryPolicy::default(),
            termination_policy: BTreeSet::from([TerminationPolicy::Iterations]),
            termination_args: TerminationArgs::default(),
            parallel: false,
            track_velocity_history: false,
            seed: None,
        }
    }
}

impl PsoConfig {
    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    pub fn with_num_informants(mut self, n: usize) -> Self {
        self.num_informants = n;
        self
    }

    pub fn with_bound(mut self, low: f64, high: f64) -> Self {
        self.bound = Bound::new(low, high);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets `alpha`, `beta`, `gamma` and `delta` at once.
    pub fn with_coefficients(mut self, alpha: f64, beta: f64, gamma: f64, delta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self.delta = delta;
        self
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    /// Replaces the termination policy set.
    pub fn with_termination_policy<I>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = TerminationPolicy>,
    {
        self.termination_policy = policies.into_iter().collect();
        self
    }

    pub fn with_termination_args(mut self, args: TerminationArgs) -> Self {
        self.termination_args = args;
        self
    }

    pub fn with_max_iter(mut self, n: usize) -> Self {
        self.termination_args.max_iter = n;
        self
    }

    pub fn with_time_delta(mut self, d: Duration) -> Self {
        self.termination_args.time_delta = d;
        self
    }

    pub fn with_min_fitness_delta(mut self, d: f64) -> Self {
        self.termination_args.min_fitness_delta = d;
        self
    }

    /// Enables or disables parallel phases.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_velocity_history(mut self, track: bool) -> Self {
        self.track_velocity_history = track;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// The boundary policy is not checked here: `Bounce` fails only when a
    /// move actually needs it.
    pub fn validate(&self) -> Result<(), PsoError> {
        if self.swarm_size == 0 {
            return Err(PsoError::InvalidConfig(
                "swarm_size must be at least 1".into(),
            ));
        }
        if self.num_informants >= self.swarm_size {
            return Err(PsoError::InvalidConfig(format!(
                "num_informants ({}) must be less than swarm_size ({})",
                self.num_informants, self.swarm_size
            )));
        }
        self.bound
            .validate()
            .map_err(|e| PsoError::InvalidConfig(format!("default {e}")))?;
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("delta", self.delta),
            ("epsilon", self.epsilon),
        ] {
            if !value.is_finite() {
                return Err(PsoError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("delta", self.delta),
        ] {
            if value < 0.0 {
                return Err(PsoError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.termination_args.max_iter == 0 {
            return Err(PsoError::InvalidConfig(
                "max_iter must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
