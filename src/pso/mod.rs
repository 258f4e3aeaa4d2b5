//! Particle Swarm Optimization (PSO) with informant topologies.
//!
//! Each particle is pulled toward three remembered points: its own best,
//! the best among a fixed random set of informants, and the best of the
//! whole swarm. Every iteration runs three swarm-wide phases in order:
//! fitness assessment, velocity update, and movement under a boundary
//! policy. Fitness is maximized.
//!
//! Entry points:
//!
//! - [`PsoRunner::run`]: one call with an objective, a search space and a
//!   [`PsoConfig`].
//! - [`Optimizer`]: the same engine behind setters, plus the
//!   hyperparameter encode/decode used for meta-optimization.
//! - [`Swarm`]: the individual phases, for callers that drive the loop
//!   themselves.
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Luke (2013), *Essentials of Metaheuristics*, 2nd ed., Algorithm 39

mod boundary;
mod config;
mod meta;
mod optimizer;
mod particle;
mod runner;
mod swarm;
mod termination;
mod topology;
mod types;

pub use boundary::resolve_move;
pub use config::{BoundaryPolicy, PsoConfig, TerminationArgs, TerminationPolicy};
pub use meta::{mean_best_fitness, HyperParams, MetaObjective, HYPERPARAM_COUNT};
pub use optimizer::Optimizer;
pub use particle::Particle;
pub use runner::{PsoResult, PsoRunner};
pub use swarm::Swarm;
pub use termination::TerminationController;
pub use topology::{informant_best, wire_informants};
pub use types::{Bound, FitnessLoc, Objective, SearchSpace};
