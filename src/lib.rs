//! Particle swarm optimization for bounded continuous search spaces.
//!
//! Maximizes a caller-supplied fitness function over a box of real
//! parameters without gradient information. Typical use is tuning the
//! numeric parameters of a model (weights, coefficients).
//!
//! - **PSO engine** ([`pso`]): swarm of particles guided by personal,
//!   informant and swarm-wide bests, with pluggable boundary policies and
//!   a termination controller.
//! - **Meta-optimization** ([`pso::MetaObjective`]): treats a PSO
//!   configuration as the subject of an outer PSO search.
//!
//! # Features
//!
//! - `parallel`: runs each swarm phase across particles with rayon.
//! - `serde`: `Serialize`/`Deserialize` for configuration and results.
//!
//! # Example
//!
//! ```
//! use u_pso::pso::{PsoConfig, PsoRunner, SearchSpace};
//!
//! let config = PsoConfig::default().with_max_iter(100).with_seed(42);
//! let space = SearchSpace::from(vec![(-5.0, 5.0), (-5.0, 5.0)]);
//! let sphere = |x: &[f64]| -(x[0] * x[0] + x[1] * x[1]);
//!
//! let result = PsoRunner::run(&sphere, &space, &config).unwrap();
//! assert!(result.best.fitness <= 0.0);
//! ```

pub mod error;
pub mod pso;
pub mod random;

pub use error::PsoError;
