//! Move resolution under the configured boundary policy.

use super::config::BoundaryPolicy;
use super::types::Bound;
use crate::error::PsoError;
use rand::Rng;

/// Computes the position a particle lands on after one step.
///
/// `candidate[i] = position[i] + epsilon * velocity[i]`, then every
/// dimension outside its bound is resolved by `policy`. Dimensions inside
/// their bound are left as computed.
///
/// Returns [`PsoError::NotImplemented`] as soon as `Bounce` would have to
/// be applied. Nothing is mutated, so callers can discard the error without
/// rolling anything back.
pub fn resolve_move<R: Rng>(
    position: &[f64],
    velocity: &[f64],
    epsilon: f64,
    bounds: &[Bound],
    policy: BoundaryPolicy,
    rng: &mut R,
) -> Result<Vec<f64>, PsoError> {
    let mut candidate: Vec<f64> = position
        .iter()
        .zip(velocity)
        .map(|(x, v)| x + epsilon * v)
        .collect();

    for (i, bound) in bounds.iter().enumerate() {
        if !bound.contains(candidate[i]) {
            candidate[i] = resolve_dimension(policy, position[i], bound, rng)?;
        }
    }

    Ok(candidate)
}

fn resolve_dimension<R: Rng>(
    policy: BoundaryPolicy,
    current: f64,
    bound: &Bound,
    rng: &mut R,
) -> Result<f64, PsoError> {
    match policy {
        BoundaryPolicy::RandomReinit => Ok(bound.sample(rng)),
        BoundaryPolicy::Refuse => Ok(current),
        // TODO: derive reflection per dimension (`bound.low`/`bound.high`
        // of the violated side, repeated until inside) before enabling.
        BoundaryPolicy::Bounce => Err(PsoError::NotImplemented("bounce boundary policy")),
    }
}
