//! Core value types: fitness-tagged locations, search bounds and the
//! objective trait.

use crate::error::PsoError;
use rand::Rng;
use std::cmp::Ordering;

/// A location paired with the fitness measured there.
///
/// Ordering and equality consider `fitness` only; `location` is payload.
/// Higher fitness is better (maximization).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessLoc {
    /// The evaluated point.
    pub location: Vec<f64>,

    /// Fitness at `location`.
    pub fitness: f64,
}

impl FitnessLoc {
    pub fn new(location: Vec<f64>, fitness: f64) -> Self {
        Self { location, fitness }
    }

    /// The "nothing found yet" marker: empty location, fitness of negative
    /// infinity. Any finite evaluation supersedes it.
    pub fn unset() -> Self {
        Self {
            location: Vec::new(),
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Whether this value came from an actual evaluation.
    pub fn is_set(&self) -> bool {
        !self.location.is_empty()
    }

    /// Strict improvement test. Equal fitness is not better, and NaN is
    /// never better than anything.
    pub fn is_better_than(&self, other: &FitnessLoc) -> bool {
        self.fitness > other.fitness
    }
}

impl PartialEq for FitnessLoc {
    fn eq(&self, other: &Self) -> bool {
        self.fitness == other.fitness
    }
}

impl PartialOrd for FitnessLoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.fitness.partial_cmp(&other.fitness)
    }
}

/// Closed interval `[low, high]` for one search dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }

    /// Uniform sample in `[low, high]`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.low..=self.high)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(format!("bound ({}, {}) must be finite", self.low, self.high));
        }
        if self.low >= self.high {
            return Err(format!(
                "bound low ({}) must be less than high ({})",
                self.low, self.high
            ));
        }
        if !(self.high - self.low).is_finite() {
            return Err(format!(
                "bound ({}, {}) is too wide to sample",
                self.low, self.high
            ));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for Bound {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

/// Description of the search space.
///
/// # Examples
///
/// ```
/// use u_pso::pso::{Bound, SearchSpace};
///
/// let space = SearchSpace::from(3);
/// let bounds = space.resolve(Bound::new(-1.0, 1.0)).unwrap();
/// assert_eq!(bounds.len(), 3);
///
/// let space = SearchSpace::from(vec![(0.0, 1.0), (-5.0, 5.0)]);
/// assert_eq!(space.resolve(Bound::new(-1.0, 1.0)).unwrap()[1].high, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchSpace {
    /// `D` dimensions, each using the configured default bound.
    Dimensions(usize),

    /// One explicit bound per dimension.
    Bounds(Vec<Bound>),
}

impl SearchSpace {
    /// Expands into one bound per dimension, validating each.
    pub fn resolve(&self, default_bound: Bound) -> Result<Vec<Bound>, PsoError> {
        let bounds = match self {
            SearchSpace::Dimensions(d) => vec![default_bound; *d],
            SearchSpace::Bounds(b) => b.clone(),
        };
        if bounds.is_empty() {
            return Err(PsoError::InvalidDimensions(
                "search space needs at least one dimension".into(),
            ));
        }
        for (i, b) in bounds.iter().enumerate() {
            b.validate()
                .map_err(|e| PsoError::InvalidDimensions(format!("dimension {i}: {e}")))?;
        }
        Ok(bounds)
    }
}

impl From<usize> for SearchSpace {
    fn from(d: usize) -> Self {
        SearchSpace::Dimensions(d)
    }
}

impl From<Vec<(f64, f64)>> for SearchSpace {
    fn from(bounds: Vec<(f64, f64)>) -> Self {
        SearchSpace::Bounds(bounds.into_iter().map(Bound::from).collect())
    }
}

impl From<Vec<Bound>> for SearchSpace {
    fn from(bounds: Vec<Bound>) -> Self {
        SearchSpace::Bounds(bounds)
    }
}

/// The function being maximized.
///
/// Implemented for every `Fn(&[f64]) -> f64 + Send + Sync` closure.
/// The swarm assumes `fitness` has no side effects; the snapshot taken
/// after each assessment phase is only meaningful if it doesn't.
///
/// # Examples
///
/// ```ignore
/// struct Sphere;
///
/// impl Objective for Sphere {
///     fn fitness(&self, x: &[f64]) -> f64 {
///         -x.iter().map(|v| v * v).sum::<f64>()
///     }
///
///     fn on_iteration(&self, iteration: usize, progress: f64, best: f64) {
///         println!("{iteration} ({:.0}%): {best}", progress * 100.0);
///     }
/// }
/// ```
pub trait Objective: Send + Sync {
    /// Fitness of `position`. Higher is better.
    fn fitness(&self, position: &[f64]) -> f64;

    /// Called once at the end of every iteration, for progress display.
    ///
    /// `progress` is the controller's completion estimate in `[0, 1]`.
    /// The default implementation is a no-op.
    fn on_iteration(&self, _iteration: usize, _progress: f64, _best_fitness: f64) {}
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn fitness(&self, position: &[f64]) -> f64 {
        self(position)
    }
}
