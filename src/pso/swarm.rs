//! The swarm and its three per-iteration phases.
//!
//! One iteration is `assess` → `update_velocities` → `move_particles`, each
//! spanning the whole swarm before the next begins. The velocity phase reads
//! a snapshot of personal, informant and swarm bests as left by the
//! assessment phase; new velocities are computed against that immutable
//! view and written back only once all are known. The move phase likewise
//! resolves every particle's landing point before committing any of them.
//!
//! Each phase that draws random numbers hands every particle its own RNG,
//! seeded from the master RNG in particle order. Sequential and parallel
//! execution therefore consume identical random streams.

use super::boundary::resolve_move;
use super::config::PsoConfig;
use super::particle::Particle;
use super::topology::{informant_best, wire_informants};
use super::types::{Bound, FitnessLoc, Objective};
use crate::error::PsoError;
use crate::random::split_rngs;
use rand::rngs::StdRng;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The particles of one run plus the swarm-wide best.
#[derive(Debug, Clone)]
pub struct Swarm {
    particles: Vec<Particle>,
    bounds: Vec<Bound>,
    best: FitnessLoc,
    previous_best: FitnessLoc,
}

impl Swarm {
    /// Creates `config.swarm_size` particles with positions and velocities
    /// drawn uniformly from `bounds`, then wires the informant topology.
    pub fn new<R: Rng>(bounds: Vec<Bound>, config: &PsoConfig, rng: &mut R) -> Self {
        let particles: Vec<Particle> = (0..config.swarm_size)
            .map(|_| {
                let position = bounds.iter().map(|b| b.sample(rng)).collect();
                let velocity = bounds.iter().map(|b| b.sample(rng)).collect();
                Particle::new(position, velocity)
            })
            .collect();

        let mut swarm = Self::from_particles(particles, bounds);
        wire_informants(&mut swarm.particles, config.num_informants, rng);
        swarm
    }

    /// Builds a swarm from prepared particles, keeping their informants.
    pub fn from_particles(particles: Vec<Particle>, bounds: Vec<Bound>) -> Self {
        Self {
            particles,
            bounds,
            best: FitnessLoc::unset(),
            previous_best: FitnessLoc::unset(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Best location found so far. Unset until the first assessment.
    pub fn best(&self) -> &FitnessLoc {
        &self.best
    }

    /// The swarm best as it stood before the latest assessment phase.
    pub fn previous_best(&self) -> &FitnessLoc {
        &self.previous_best
    }

    /// `best - previous_best` for the latest iteration.
    ///
    /// Infinite on the first improvement over the unset marker, zero while
    /// nothing has been assessed.
    pub fn fitness_delta(&self) -> f64 {
        match (self.best.is_set(), self.previous_best.is_set()) {
            (true, true) => self.best.fitness - self.previous_best.fitness,
            (true, false) => f64::INFINITY,
            (false, _) => 0.0,
        }
    }

    pub fn frozen_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_frozen()).count()
    }

    /// Phase 1: assesses every non-frozen particle, then reduces the results
    /// into the swarm best. Returns the number of evaluations made.
    ///
    /// The swarm best is updated once, after all assessments, and only on
    /// strict improvement. Among equally fit results the lowest particle
    /// index wins. NaN results never become the best.
    pub fn assess<O: Objective + ?Sized>(&mut self, objective: &O, parallel: bool) -> usize {
        let results = assess_all(&mut self.particles, objective, parallel);

        self.previous_best = self.best.clone();
        let mut evaluations = 0;
        for loc in results.into_iter().flatten() {
            evaluations += 1;
            if loc.is_better_than(&self.best) {
                self.best = loc;
            }
        }
        evaluations
    }

    /// Phase 2: recomputes the velocity of every non-frozen particle.
    ///
    /// ```text
    /// v'[i] = alpha*v[i] + b*(personal[i] - x[i]) + c*(informant[i] - x[i])
    ///                    + d*(global[i] - x[i])
    /// ```
    /// with `b ~ U(0, beta)`, `c ~ U(0, gamma)`, `d ~ U(0, delta)` drawn
    /// per dimension. A best that is not known yet contributes nothing.
    /// Positions are not touched.
    pub fn update_velocities<R: Rng>(&mut self, config: &PsoConfig, rng: &mut R) {
        let rngs = split_rngs(rng, self.particles.len());
        let coefficients = Coefficients::from(config);
        let snapshot = &self.particles;
        let global = &self.best;

        let next = map_with_rngs(snapshot, rngs, config.parallel, |(particle, mut prng)| {
            if particle.is_frozen() {
                return None;
            }
            let informant = informant_best(particle, snapshot);
            Some(next_velocity(particle, informant, global, &coefficients, &mut prng))
        });

        for (particle, velocity) in self.particles.iter_mut().zip(next) {
            if let Some(velocity) = velocity {
                if config.track_velocity_history {
                    particle.record_velocity();
                }
                particle.update_velocity(velocity);
            }
        }
    }

    /// Phase 3: moves every non-frozen particle by `epsilon * velocity`,
    /// resolving out-of-bound dimensions with the boundary policy.
    ///
    /// All landing points are resolved before any is committed: on error no
    /// particle has moved.
    pub fn move_particles<R: Rng>(
        &mut self,
        config: &PsoConfig,
        rng: &mut R,
    ) -> Result<(), PsoError> {
        let rngs = split_rngs(rng, self.particles.len());
        let bounds = &self.bounds;
        let epsilon = config.epsilon;
        let policy = config.boundary_policy;

        let next = map_with_rngs(&self.particles, rngs, config.parallel, |(particle, mut prng)| {
            if particle.is_frozen() {
                return Ok(None);
            }
            resolve_move(
                particle.position(),
                particle.velocity(),
                epsilon,
                bounds,
                policy,
                &mut prng,
            )
            .map(Some)
        })
        .into_iter()
        .collect::<Result<Vec<_>, PsoError>>()?;

        for (particle, position) in self.particles.iter_mut().zip(next) {
            if let Some(position) = position {
                particle.update_position(position);
            }
        }
        Ok(())
    }
}

/// Velocity coefficients for one iteration.
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    alpha: f64,
    beta: f64,
    gamma: f64,
    delta: f64,
}

impl From<&PsoConfig> for Coefficients {
    fn from(config: &PsoConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            gamma: config.gamma,
            delta: config.delta,
        }
    }
}

fn next_velocity<R: Rng>(
    particle: &Particle,
    informant: Option<&FitnessLoc>,
    global: &FitnessLoc,
    k: &Coefficients,
    rng: &mut R,
) -> Vec<f64> {
    let x = particle.position();
    let personal = particle.personal_best().map(|p| p.location.as_slice());
    let informant = informant.map(|p| p.location.as_slice());
    let global = global.is_set().then_some(global.location.as_slice());

    // Pull toward `target` on dimension `i`, zero when the target is unknown.
    let pull = |target: Option<&[f64]>, i: usize| target.map_or(0.0, |t| t[i] - x[i]);

    particle
        .velocity()
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let b = rng.random::<f64>() * k.beta;
            let c = rng.random::<f64>() * k.gamma;
            let d = rng.random::<f64>() * k.delta;
            k.alpha * v + b * pull(personal, i) + c * pull(informant, i) + d * pull(global, i)
        })
        .collect()
}

/// Maps `f` over particles paired with their own RNG, in parallel when
/// requested and available. Output order follows particle order.
#[cfg(feature = "parallel")]
fn map_with_rngs<T, F>(particles: &[Particle], rngs: Vec<StdRng>, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn((&Particle, StdRng)) -> T + Send + Sync,
{
    if parallel {
        particles.par_iter().zip(rngs.into_par_iter()).map(f).collect()
    } else {
        particles.iter().zip(rngs).map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_with_rngs<T, F>(particles: &[Particle], rngs: Vec<StdRng>, _parallel: bool, f: F) -> Vec<T>
where
    F: Fn((&Particle, StdRng)) -> T,
{
    particles.iter().zip(rngs).map(f).collect()
}

/// Assesses every non-frozen particle; frozen ones yield `None`.
fn assess_all<O: Objective + ?Sized>(
    particles: &mut [Particle],
    objective: &O,
    parallel: bool,
) -> Vec<Option<FitnessLoc>> {
    let assess = |p: &mut Particle| (!p.is_frozen()).then(|| p.assess_fitness(objective));

    #[cfg(feature = "parallel")]
    {
        if parallel {
            return particles.par_iter_mut().map(assess).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    particles.iter_mut().map(assess).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pso::BoundaryPolicy;
    use crate::random::create_rng;

    fn neg_sphere(x: &[f64]) -> f64 {
        -x.iter().map(|v| v * v).sum::<f64>()
    }

    fn config() -> PsoConfig {
        PsoConfig::default()
            .with_swarm_size(12)
            .with_num_informants(4)
    }

    fn unit_swarm(config: &PsoConfig, d: usize, seed: u64) -> (Swarm, StdRng) {
        let mut rng = create_rng(seed);
        let swarm = Swarm::new(vec![Bound::new(-1.0, 1.0); d], config, &mut rng);
        (swarm, rng)
    }

    #[test]
    fn test_new_swarm_within_bounds_and_wired() {
        let config = config();
        let (swarm, _) = unit_swarm(&config, 3, 1);
        assert_eq!(swarm.particles().len(), 12);
        for (i, p) in swarm.particles().iter().enumerate() {
            assert_eq!(p.position().len(), 3);
            assert_eq!(p.velocity().len(), 3);
            assert!(p.position().iter().all(|x| (-1.0..=1.0).contains(x)));
            assert_eq!(p.informants().len(), 4);
            assert!(!p.informants().contains(&i));
        }
        assert!(!swarm.best().is_set());
    }

    #[test]
    fn test_assess_reduces_global_best() {
        let config = config();
        let (mut swarm, _) = unit_swarm(&config, 2, 2);
        let evaluations = swarm.assess(&neg_sphere, false);
        assert_eq!(evaluations, 12);

        let expected = swarm
            .particles()
            .iter()
            .map(|p| p.fitness_loc().unwrap().fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(swarm.best().fitness, expected);
        assert!(!swarm.previous_best().is_set());
        assert_eq!(swarm.fitness_delta(), f64::INFINITY);
    }

    #[test]
    fn test_previous_best_snapshots_each_iteration() {
        let config = config();
        let (mut swarm, _) = unit_swarm(&config, 2, 3);
        swarm.assess(&neg_sphere, false);
        let first = swarm.best().fitness;
        swarm.assess(&neg_sphere, false);
        // Positions did not move: nothing improved.
        assert_eq!(swarm.previous_best().fitness, first);
        assert_eq!(swarm.fitness_delta(), 0.0);
    }

    #[test]
    fn test_pure_carry_over_velocity() {
        let config = config().with_coefficients(1.0, 0.0, 0.0, 0.0);
        let (mut swarm, mut rng) = unit_swarm(&config, 3, 4);
        for _ in 0..5 {
            swarm.assess(&neg_sphere, false);
            let before: Vec<Vec<f64>> =
                swarm.particles().iter().map(|p| p.velocity().to_vec()).collect();
            swarm.update_velocities(&config, &mut rng);
            for (p, v) in swarm.particles().iter().zip(&before) {
                assert_eq!(p.velocity(), v.as_slice());
            }
            swarm.move_particles(&config, &mut rng).unwrap();
        }
    }

    #[test]
    fn test_velocity_phase_leaves_positions() {
        let config = config();
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 5);
        swarm.assess(&neg_sphere, false);
        let before: Vec<Vec<f64>> =
            swarm.particles().iter().map(|p| p.position().to_vec()).collect();
        swarm.update_velocities(&config, &mut rng);
        for (p, x) in swarm.particles().iter().zip(&before) {
            assert_eq!(p.position(), x.as_slice());
        }
    }

    #[test]
    fn test_velocity_formula_single_particle() {
        // One particle, no informants: personal and global best coincide
        // with the current position, so only alpha*v survives.
        let config = PsoConfig::default()
            .with_swarm_size(1)
            .with_num_informants(0)
            .with_coefficients(0.5, 1.0, 1.0, 1.0);
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 6);
        swarm.assess(&neg_sphere, false);
        let v0 = swarm.particles()[0].velocity().to_vec();
        swarm.update_velocities(&config, &mut rng);
        let v1 = swarm.particles()[0].velocity();
        for (a, b) in v1.iter().zip(&v0) {
            assert!((a - 0.5 * b).abs() < 1e-15);
        }
    }

    /// Two particles in 2-D: particle 0 at the origin, particle 1 at the
    /// optimum of `toward_corner`. Particle 0 optionally informed by 1.
    fn origin_and_corner(informed: bool) -> Swarm {
        let mut origin = Particle::new(vec![0.0, 0.0], vec![0.2, -0.4]);
        if informed {
            origin.set_informants(vec![1]);
        }
        let corner = Particle::new(vec![0.5, -0.5], vec![0.1, 0.1]);
        Swarm::from_particles(vec![origin, corner], vec![Bound::new(-1.0, 1.0); 2])
    }

    fn toward_corner(x: &[f64]) -> f64 {
        -((x[0] - 0.5).powi(2) + (x[1] + 0.5).powi(2))
    }

    /// Asserts `after - alpha*before` points from `x` toward `target` on
    /// every dimension, scaled by a factor in `(0, coef]`.
    fn assert_pull(
        before: &[f64],
        after: &[f64],
        alpha: f64,
        x: &[f64],
        target: &[f64],
        coef: f64,
    ) {
        for (i, (v, v_next)) in before.iter().zip(after).enumerate() {
            let term = v_next - alpha * v;
            let max = coef * (target[i] - x[i]);
            assert!(term * max > 0.0, "dim {i}: term {term} not toward {max}");
            assert!(term.abs() <= max.abs() + 1e-12, "dim {i}: term {term} exceeds {max}");
        }
    }

    #[test]
    fn test_velocity_global_term_only() {
        let config = PsoConfig::default()
            .with_swarm_size(2)
            .with_num_informants(0)
            .with_coefficients(0.5, 0.0, 0.0, 1.0);
        let mut rng = create_rng(10);
        let mut swarm = origin_and_corner(false);
        swarm.assess(&toward_corner, false);
        assert_eq!(swarm.best().location, vec![0.5, -0.5]);

        let before = swarm.particles()[0].velocity().to_vec();
        swarm.update_velocities(&config, &mut rng);
        let after = swarm.particles()[0].velocity();
        assert_pull(&before, after, 0.5, &[0.0, 0.0], &[0.5, -0.5], 1.0);
    }

    #[test]
    fn test_velocity_informant_term_only() {
        let config = PsoConfig::default()
            .with_swarm_size(2)
            .with_num_informants(1)
            .with_coefficients(0.5, 0.0, 2.0, 0.0);
        let mut rng = create_rng(11);
        let mut swarm = origin_and_corner(true);
        swarm.assess(&toward_corner, false);

        let before = swarm.particles()[0].velocity().to_vec();
        swarm.update_velocities(&config, &mut rng);
        let after = swarm.particles()[0].velocity();
        assert_pull(&before, after, 0.5, &[0.0, 0.0], &[0.5, -0.5], 2.0);
    }

    #[test]
    fn test_velocity_personal_term_only() {
        let config = PsoConfig::default()
            .with_swarm_size(1)
            .with_num_informants(0)
            .with_coefficients(0.5, 1.0, 0.0, 0.0);
        let mut rng = create_rng(12);
        let mut swarm = Swarm::from_particles(
            vec![Particle::new(vec![0.0, 0.0], vec![0.2, -0.4])],
            vec![Bound::new(-1.0, 1.0); 2],
        );
        swarm.assess(&toward_corner, false);
        // Personal best stays at the origin; the particle is now elsewhere.
        swarm.particles_mut()[0].update_position(vec![0.4, 0.4]);

        let before = swarm.particles()[0].velocity().to_vec();
        swarm.update_velocities(&config, &mut rng);
        let after = swarm.particles()[0].velocity();
        assert_pull(&before, after, 0.5, &[0.4, 0.4], &[0.0, 0.0], 1.0);
    }

    #[test]
    fn test_nan_fitness_does_not_shadow_swarm_best() {
        let mut swarm = Swarm::from_particles(
            vec![
                Particle::new(vec![-0.5], vec![0.1]),
                Particle::new(vec![0.1], vec![0.1]),
                Particle::new(vec![0.2], vec![0.1]),
            ],
            vec![Bound::new(-1.0, 1.0)],
        );
        let f = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { -x[0] * x[0] };

        assert_eq!(swarm.assess(&f, false), 3);
        assert!(swarm.best().is_set());
        assert_eq!(swarm.best().location, vec![0.1]);
        assert!((swarm.best().fitness + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_zero_epsilon_never_moves() {
        let config = config().with_epsilon(0.0);
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 7);
        let start: Vec<Vec<f64>> =
            swarm.particles().iter().map(|p| p.position().to_vec()).collect();
        for _ in 0..10 {
            swarm.assess(&neg_sphere, false);
            swarm.update_velocities(&config, &mut rng);
            swarm.move_particles(&config, &mut rng).unwrap();
        }
        for (p, x) in swarm.particles().iter().zip(&start) {
            assert_eq!(p.position(), x.as_slice());
        }
    }

    #[test]
    fn test_frozen_particle_stays_frozen() {
        let config = config();
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 8);
        swarm.particles_mut()[0].update_velocity(vec![0.0, 0.0]);
        let position = swarm.particles()[0].position().to_vec();

        for _ in 0..20 {
            let evaluations = swarm.assess(&neg_sphere, false);
            assert_eq!(evaluations, 11);
            swarm.update_velocities(&config, &mut rng);
            swarm.move_particles(&config, &mut rng).unwrap();
        }

        let frozen = &swarm.particles()[0];
        assert!(frozen.is_frozen());
        assert!(frozen.fitness_loc().is_none());
        assert!(frozen.personal_best().is_none());
        assert_eq!(frozen.position(), position.as_slice());
        assert_eq!(frozen.velocity(), &[0.0, 0.0]);
    }

    #[test]
    fn test_velocity_history_tracking() {
        let config = config().with_velocity_history(true);
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 9);
        let v0 = swarm.particles()[3].velocity().to_vec();
        for _ in 0..3 {
            swarm.assess(&neg_sphere, false);
            swarm.update_velocities(&config, &mut rng);
            swarm.move_particles(&config, &mut rng).unwrap();
        }
        let history = swarm.particles()[3].velocity_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], v0);
    }

    #[test]
    fn test_bounce_fails_without_mutation() {
        let config = config()
            .with_boundary_policy(BoundaryPolicy::Bounce)
            .with_epsilon(1.0);
        let (mut swarm, mut rng) = unit_swarm(&config, 2, 10);
        swarm.assess(&neg_sphere, false);
        swarm.update_velocities(&config, &mut rng);

        // Guarantee at least one particle leaves the box.
        let last = swarm.particles().len() - 1;
        swarm.particles_mut()[last].update_velocity(vec![10.0, 10.0]);

        let before: Vec<(Vec<f64>, Vec<f64>)> = swarm
            .particles()
            .iter()
            .map(|p| (p.position().to_vec(), p.velocity().to_vec()))
            .collect();

        let err = swarm.move_particles(&config, &mut rng).unwrap_err();
        assert!(matches!(err, PsoError::NotImplemented(_)));

        for (p, (x, v)) in swarm.particles().iter().zip(&before) {
            assert_eq!(p.position(), x.as_slice());
            assert_eq!(p.velocity(), v.as_slice());
        }
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        for policy in [BoundaryPolicy::RandomReinit, BoundaryPolicy::Refuse] {
            let config = config()
                .with_boundary_policy(policy)
                .with_epsilon(1.5)
                .with_coefficients(1.2, 2.0, 2.0, 2.0);
            let mut rng = create_rng(11);
            let bounds = vec![Bound::new(-1.0, 1.0), Bound::new(10.0, 10.5)];
            let mut swarm = Swarm::new(bounds.clone(), &config, &mut rng);
            for _ in 0..30 {
                swarm.assess(&neg_sphere, false);
                swarm.update_velocities(&config, &mut rng);
                swarm.move_particles(&config, &mut rng).unwrap();
                for p in swarm.particles() {
                    for (x, b) in p.position().iter().zip(&bounds) {
                        assert!(b.contains(*x), "{policy:?}: {x} outside {b:?}");
                    }
                }
            }
        }
    }
}
