//! Informant topology.
//!
//! Each particle gets a fixed random neighborhood of `k` other particles,
//! sampled without replacement once per run. Particles are identified by
//! index, so duplicate-valued particles cannot be confused with each other.

use super::particle::Particle;
use super::types::FitnessLoc;
use crate::random::sample_excluding;
use rand::Rng;

/// Wires every particle to `k` distinct informants other than itself.
///
/// `k` must be less than `particles.len()` (checked by config validation).
pub fn wire_informants<R: Rng>(particles: &mut [Particle], k: usize, rng: &mut R) {
    let n = particles.len();
    for (i, particle) in particles.iter_mut().enumerate() {
        particle.set_informants(sample_excluding(rng, n, i, k));
    }
}

/// Best assessed fitness location among the informants of `particle`.
///
/// Linear scan; on equal fitness the first informant found wins. The
/// tie-break carries no meaning. Returns `None` when no informant has an
/// assessed fitness above negative infinity (NaN included).
pub fn informant_best<'a>(particle: &Particle, swarm: &'a [Particle]) -> Option<&'a FitnessLoc> {
    let unset = FitnessLoc::unset();
    let mut best: Option<&FitnessLoc> = None;
    for &idx in particle.informants() {
        if let Some(candidate) = swarm[idx].fitness_loc() {
            if candidate.is_better_than(best.unwrap_or(&unset)) {
                best = Some(candidate);
            }
        }
    }
    best
}
