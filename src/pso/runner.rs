//! PSO execution loop.
//!
//! [`PsoRunner`] drives a swarm through repeated iterations:
//! assess → reduce swarm best → update velocities → move → check termination.

use super::config::PsoConfig;
use super::swarm::Swarm;
use super::termination::TerminationController;
use super::types::{FitnessLoc, Objective, SearchSpace};
use crate::error::PsoError;
use crate::random::rng_from_option;

/// Result of a PSO run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoResult {
    /// The best location found and its fitness.
    pub best: FitnessLoc,

    /// Number of full assess/update/move sweeps executed.
    pub iterations: usize,

    /// Total fitness evaluations.
    pub evaluations: usize,

    /// Particles frozen (all-zero velocity) when the run ended.
    pub frozen_particles: usize,

    /// Swarm best fitness at the end of each iteration.
    pub fitness_history: Vec<f64>,
}

/// Executes the particle swarm optimizer.
///
/// # Usage
///
/// ```
/// use u_pso::pso::{PsoConfig, PsoRunner, SearchSpace};
///
/// let config = PsoConfig::default()
///     .with_swarm_size(20)
///     .with_max_iter(50)
///     .with_seed(7);
/// let objective = |x: &[f64]| -x[0] * x[0];
///
/// let result = PsoRunner::run(&objective, &SearchSpace::from(1), &config).unwrap();
/// assert_eq!(result.iterations, 50);
/// assert!(result.best.fitness <= 0.0);
/// ```
pub struct PsoRunner;

impl PsoRunner {
    /// Runs one optimization.
    ///
    /// Fails before creating any state if the configuration or search space
    /// is invalid. Fails mid-run if the boundary policy cannot be applied.
    pub fn run<O: Objective + ?Sized>(
        objective: &O,
        space: &SearchSpace,
        config: &PsoConfig,
    ) -> Result<PsoResult, PsoError> {
        config.validate()?;
        let bounds = space.resolve(config.bound)?;
        let dimensions = bounds.len();

        let mut rng = rng_from_option(config.seed);
        let mut swarm = Swarm::new(bounds, config, &mut rng);
        let mut controller = TerminationController::new(
            config.termination_policy.iter().copied(),
            config.termination_args.clone(),
        );

        tracing::debug!(
            swarm_size = config.swarm_size,
            num_informants = config.num_informants,
            dimensions,
            max_iter = config.termination_args.max_iter,
            "starting particle swarm run"
        );

        let mut fitness_history = Vec::new();
        let mut evaluations = 0usize;

        while !controller.is_terminated() {
            evaluations += swarm.assess(objective, config.parallel);
            swarm.update_velocities(config, &mut rng);
            swarm.move_particles(config, &mut rng)?;

            let fitness_delta = swarm.fitness_delta();
            let best_fitness = swarm.best().fitness;
            fitness_history.push(best_fitness);

            controller.next_iteration(fitness_delta);
            tracing::trace!(
                iteration = controller.current_iteration(),
                best_fitness,
                fitness_delta,
                "iteration complete"
            );
            objective.on_iteration(
                controller.current_iteration(),
                controller.estimate_progress(),
                best_fitness,
            );
        }

        if !swarm.best().is_set() {
            return Err(PsoError::NoFitnessEvaluated);
        }

        let iterations = controller.current_iteration();
        tracing::debug!(
            iterations,
            evaluations,
            best_fitness = swarm.best().fitness,
            elapsed_ms = controller.elapsed().as_millis() as u64,
            "particle swarm run finished"
        );

        Ok(PsoResult {
            best: swarm.best().clone(),
            iterations,
            evaluations,
            frozen_particles: swarm.frozen_count(),
            fitness_history,
        })
    }
}
