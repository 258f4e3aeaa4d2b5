//! Stateful optimizer facade.
//!
//! [`Optimizer`] holds a configuration, a search space and a fitness
//! function set up piecemeal, and checks that all of them are present
//! before running. Each `run` builds a fresh swarm; only configuration
//! and the last result survive between runs.

use super::config::PsoConfig;
use super::meta::{mean_best_fitness, HyperParams};
use super::runner::{PsoResult, PsoRunner};
use super::types::{Bound, FitnessLoc, Objective, SearchSpace};
use crate::error::PsoError;

/// Particle swarm optimizer configured step by step.
///
/// # Examples
///
/// ```
/// use u_pso::pso::{Optimizer, PsoConfig};
///
/// let mut optimizer = Optimizer::new(
///     PsoConfig::default().with_swarm_size(20).with_max_iter(50).with_seed(1),
/// );
/// optimizer.set_search_dimensions(1).unwrap();
/// optimizer.set_fitness_fn(|x: &[f64]| -x[0] * x[0]);
///
/// let best = optimizer.run().unwrap();
/// assert!(best.fitness <= 0.0);
/// ```
pub struct Optimizer {
    config: PsoConfig,
    space: Option<SearchSpace>,
    fitness_fn: Option<Box<dyn Objective>>,
    num_runs: usize,
    last_result: Option<PsoResult>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(PsoConfig::default())
    }
}

impl Optimizer {
    pub fn new(config: PsoConfig) -> Self {
        Self {
            config,
            space: None,
            fitness_fn: None,
            num_runs: 1,
            last_result: None,
        }
    }

    /// Runs averaged per [`evaluate_fitness`](Self::evaluate_fitness) call.
    pub fn with_num_runs(mut self, n: usize) -> Self {
        self.num_runs = n.max(1);
        self
    }

    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PsoConfig {
        &mut self.config
    }

    /// Sets the function to maximize.
    pub fn set_fitness_fn<O: Objective + 'static>(&mut self, objective: O) {
        self.fitness_fn = Some(Box::new(objective));
    }

    /// Sets the search space: a dimension count (expanded with the default
    /// bound) or explicit per-dimension bounds.
    ///
    /// On error the previous search space is cleared, so a later `run`
    /// fails with [`PsoError::DimensionsNotSet`].
    pub fn set_search_dimensions<S: Into<SearchSpace>>(
        &mut self,
        dimensions: S,
    ) -> Result<(), PsoError> {
        let space = dimensions.into();
        match space.resolve(self.config.bound) {
            Ok(_) => {
                self.space = Some(space);
                Ok(())
            }
            Err(err) => {
                self.space = None;
                Err(err)
            }
        }
    }

    pub fn search_space(&self) -> Option<&SearchSpace> {
        self.space.as_ref()
    }

    /// Runs one optimization and returns the best location found.
    pub fn run(&mut self) -> Result<FitnessLoc, PsoError> {
        let space = self.space.as_ref().ok_or(PsoError::DimensionsNotSet)?;
        let objective = self.fitness_fn.as_deref().ok_or(PsoError::FitnessFnNotSet)?;

        let result = PsoRunner::run(objective, space, &self.config)?;
        let best = result.best.clone();
        self.last_result = Some(result);
        Ok(best)
    }

    /// Best location of the last successful run.
    pub fn best(&self) -> Option<&FitnessLoc> {
        self.last_result.as_ref().map(|r| &r.best)
    }

    /// Full statistics of the last successful run.
    pub fn last_result(&self) -> Option<&PsoResult> {
        self.last_result.as_ref()
    }

    /// Applies a hyperparameter vector to the configuration.
    ///
    /// See [`HyperParams`] for the layout.
    pub fn decode_vec(&mut self, vec: &[f64]) -> Result<&mut Self, PsoError> {
        HyperParams::decode_vec(vec)?.apply_to(&mut self.config);
        Ok(self)
    }

    /// Valid range of each hyperparameter, for use as an outer search space.
    pub fn dimension_vec(&self) -> Vec<Bound> {
        HyperParams::dimension_vec()
    }

    /// Applies `vec`, runs `num_runs` times and returns the mean best
    /// fitness.
    /// The configuration is only changed once dimensions and fitness
    /// function are known to be set.
    pub fn evaluate_fitness(&mut self, vec: &[f64]) -> Result<f64, PsoError> {
        if self.space.is_none() {
            return Err(PsoError::DimensionsNotSet);
        }
        if self.fitness_fn.is_none() {
            return Err(PsoError::FitnessFnNotSet);
        }
        self.decode_vec(vec)?;
        let space = self.space.as_ref().ok_or(PsoError::DimensionsNotSet)?;
        let objective = self.fitness_fn.as_deref().ok_or(PsoError::FitnessFnNotSet)?;
        mean_best_fitness(objective, space, &self.config, self.num_runs)
    }
}
