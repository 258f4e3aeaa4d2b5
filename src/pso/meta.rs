//! Meta-optimization: tuning PSO hyperparameters with PSO.
//!
//! [`HyperParams`] maps between a [`PsoConfig`] and a flat real vector, and
//! [`MetaObjective`] scores such a vector by running the inner optimizer,
//! so an outer [`PsoRunner`] can search over the inner one's settings.

use super::config::PsoConfig;
use super::runner::PsoRunner;
use super::types::{Bound, Objective, SearchSpace};
use crate::error::PsoError;

/// Number of entries in an encoded hyperparameter vector.
pub const HYPERPARAM_COUNT: usize = 7;

/// The tunable subset of [`PsoConfig`].
///
/// Vector layout: `[swarm_size, num_informants, alpha, beta, gamma, delta,
/// epsilon]`. The two counts are rounded to the nearest integer on decode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HyperParams {
    pub swarm_size: usize,
    pub num_informants: usize,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub epsilon: f64,
}

impl HyperParams {
    /// Decodes a hyperparameter vector.
    pub fn decode_vec(vec: &[f64]) -> Result<Self, PsoError> {
        if vec.len() != HYPERPARAM_COUNT {
            return Err(PsoError::InvalidDimensions(format!(
                "expected {HYPERPARAM_COUNT} hyperparameters, got {}",
                vec.len()
            )));
        }
        Ok(Self {
            swarm_size: vec[0].round() as usize,
            num_informants: vec[1].round() as usize,
            alpha: vec[2],
            beta: vec[3],
            gamma: vec[4],
            delta: vec[5],
            epsilon: vec[6],
        })
    }

    pub fn encode_vec(&self) -> Vec<f64> {
        vec![
            self.swarm_size as f64,
            self.num_informants as f64,
            self.alpha,
            self.beta,
            self.gamma,
            self.delta,
            self.epsilon,
        ]
    }

    /// Search range of each hyperparameter, in vector order.
    pub fn dimension_vec() -> Vec<Bound> {
        let coefficient = Bound::new(0.01, 2.0);
        vec![
            Bound::new(10.0, 100.0),
            Bound::new(4.0, 8.0),
            coefficient,
            coefficient,
            coefficient,
            coefficient,
            coefficient,
        ]
    }

    pub fn from_config(config: &PsoConfig) -> Self {
        Self {
            swarm_size: config.swarm_size,
            num_informants: config.num_informants,
            alpha: config.alpha,
            beta: config.beta,
            gamma: config.gamma,
            delta: config.delta,
            epsilon: config.epsilon,
        }
    }

    /// Writes these values into `config`, leaving everything else alone.
    pub fn apply_to(&self, config: &mut PsoConfig) {
        config.swarm_size = self.swarm_size;
        config.num_informants = self.num_informants;
        config.alpha = self.alpha;
        config.beta = self.beta;
        config.gamma = self.gamma;
        config.delta = self.delta;
        config.epsilon = self.epsilon;
    }
}

/// Runs `config` on `objective` `num_runs` times and averages the best
/// fitness. Run `r` is seeded with `seed + r` when the config is seeded.
pub fn mean_best_fitness<O: Objective + ?Sized>(
    objective: &O,
    space: &SearchSpace,
    config: &PsoConfig,
    num_runs: usize,
) -> Result<f64, PsoError> {
    if num_runs == 0 {
        return Err(PsoError::InvalidConfig("num_runs must be at least 1".into()));
    }
    let mut total = 0.0;
    for r in 0..num_runs {
        let mut run_config = config.clone();
        run_config.seed = config.seed.map(|s| s.wrapping_add(r as u64));
        total += PsoRunner::run(objective, space, &run_config)?.best.fitness;
    }
    Ok(total / num_runs as f64)
}

/// Scores a hyperparameter vector by the mean best fitness the inner
/// optimizer reaches with it.
///
/// # Examples
///
/// ```
/// use u_pso::pso::{HyperParams, MetaObjective, PsoConfig, PsoRunner, SearchSpace};
///
/// let inner = PsoConfig::default().with_max_iter(10).with_seed(1);
/// let meta = MetaObjective::new(|x: &[f64]| -x[0] * x[0], SearchSpace::from(1), inner);
///
/// let outer = PsoConfig::default()
///     .with_swarm_size(5)
///     .with_num_informants(2)
///     .with_max_iter(3)
///     .with_seed(2);
/// let space = SearchSpace::from(HyperParams::dimension_vec());
/// let result = PsoRunner::run(&meta, &space, &outer).unwrap();
/// let tuned = HyperParams::decode_vec(&result.best.location).unwrap();
/// assert!((10..=100).contains(&tuned.swarm_size));
/// ```
pub struct MetaObjective<O> {
    objective: O,
    space: SearchSpace,
    base: PsoConfig,
    num_runs: usize,
}

impl<O: Objective> MetaObjective<O> {
    /// Wraps `objective`; decoded vectors override the tunable fields of
    /// `base`.
    pub fn new(objective: O, space: SearchSpace, base: PsoConfig) -> Self {
        Self {
            objective,
            space,
            base,
            num_runs: 1,
        }
    }

    /// Number of inner runs averaged per evaluation (at least 1).
    pub fn with_num_runs(mut self, n: usize) -> Self {
        self.num_runs = n.max(1);
        self
    }

    /// The inner configuration a hyperparameter vector stands for.
    pub fn config_for(&self, vec: &[f64]) -> Result<PsoConfig, PsoError> {
        let mut config = self.base.clone();
        HyperParams::decode_vec(vec)?.apply_to(&mut config);
        Ok(config)
    }
}

impl<O: Objective> Objective for MetaObjective<O> {
    /// Invalid hyperparameter combinations score negative infinity.
    fn fitness(&self, vec: &[f64]) -> f64 {
        let result = self.config_for(vec).and_then(|config| {
            mean_best_fitness(&self.objective, &self.space, &config, self.num_runs)
        });
        match result {
            Ok(fitness) => fitness,
            Err(err) => {
                tracing::warn!(%err, "inner optimizer run failed");
                f64::NEG_INFINITY
            }
        }
    }
}
