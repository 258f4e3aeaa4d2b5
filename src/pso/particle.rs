//! A single particle of the swarm.

use super::types::{FitnessLoc, Objective};

/// One candidate solution moving through the search space.
///
/// A particle knows its informants only by index into the owning swarm;
/// it never owns or mutates them.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    fitness_loc: Option<FitnessLoc>,
    personal_best: Option<FitnessLoc>,
    informants: Vec<usize>,
    velocity_history: Vec<Vec<f64>>,
}

impl Particle {
    pub fn new(position: Vec<f64>, velocity: Vec<f64>) -> Self {
        Self {
            position,
            velocity,
            fitness_loc: None,
            personal_best: None,
            informants: Vec::new(),
            velocity_history: Vec::new(),
        }
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Result of the most recent assessment, if any.
    pub fn fitness_loc(&self) -> Option<&FitnessLoc> {
        self.fitness_loc.as_ref()
    }

    pub fn personal_best(&self) -> Option<&FitnessLoc> {
        self.personal_best.as_ref()
    }

    /// Indices of this particle's informants within the swarm.
    pub fn informants(&self) -> &[usize] {
        &self.informants
    }

    /// Velocities recorded before each update, oldest first.
    pub fn velocity_history(&self) -> &[Vec<f64>] {
        &self.velocity_history
    }

    /// A particle with an all-zero velocity is frozen: it is skipped by
    /// every phase, and since its velocity is never recomputed it stays
    /// frozen for the rest of the run.
    pub fn is_frozen(&self) -> bool {
        self.velocity.iter().all(|&v| v == 0.0)
    }

    /// Evaluates the objective at the current position.
    ///
    /// Replaces the stored fitness and updates the personal best on strict
    /// improvement. A NaN fitness is stored but never becomes the personal
    /// best. Returns the new fitness location.
    pub fn assess_fitness<O: Objective + ?Sized>(&mut self, objective: &O) -> FitnessLoc {
        let current = FitnessLoc::new(self.position.clone(), objective.fitness(&self.position));

        let improves = match &self.personal_best {
            Some(best) => current.is_better_than(best),
            None => current.is_better_than(&FitnessLoc::unset()),
        };
        if improves {
            self.personal_best = Some(current.clone());
        }

        self.fitness_loc = Some(current.clone());
        current
    }

    pub fn update_position(&mut self, position: Vec<f64>) {
        self.position = position;
    }

    pub fn update_velocity(&mut self, velocity: Vec<f64>) {
        self.velocity = velocity;
    }

    /// Assigns the fixed neighborhood. Called once while wiring the swarm.
    pub fn set_informants(&mut self, informants: Vec<usize>) {
        self.informants = informants;
    }

    pub(crate) fn record_velocity(&mut self) {
        self.velocity_history.push(self.velocity.clone());
    }
}
