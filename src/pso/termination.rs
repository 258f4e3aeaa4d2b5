//! Termination controller.
//!
//! A one-way state machine: running until a policy fires, then terminated
//! for good.

use super::config::{TerminationArgs, TerminationPolicy};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Decides when a run stops.
///
/// The iteration budget (`max_iter`) is always enforced. `Convergence` and
/// `Duration` are accepted and their inputs are tracked, but they never
/// end a run on their own.
///
/// # Examples
///
/// ```
/// use u_pso::pso::{TerminationArgs, TerminationController, TerminationPolicy};
///
/// let args = TerminationArgs { max_iter: 2, ..TerminationArgs::default() };
/// let mut controller = TerminationController::new([TerminationPolicy::Iterations], args);
/// controller.next_iteration(0.5);
/// assert!(!controller.is_terminated());
/// controller.next_iteration(0.0);
/// assert!(controller.is_terminated());
/// ```
#[derive(Debug, Clone)]
pub struct TerminationController {
    policies: BTreeSet<TerminationPolicy>,
    args: TerminationArgs,
    current_iter: usize,
    last_fitness_delta: Option<f64>,
    started: Instant,
    terminated: bool,
}

impl TerminationController {
    pub fn new<I>(policies: I, args: TerminationArgs) -> Self
    where
        I: IntoIterator<Item = TerminationPolicy>,
    {
        let policies: BTreeSet<TerminationPolicy> = policies.into_iter().collect();
        for policy in &policies {
            match policy {
                TerminationPolicy::Iterations => {}
                TerminationPolicy::Convergence | TerminationPolicy::Duration => {
                    tracing::debug!(?policy, "termination policy accepted but inactive");
                }
            }
        }
        let terminated = args.max_iter == 0;
        Self {
            policies,
            args,
            current_iter: 0,
            last_fitness_delta: None,
            started: Instant::now(),
            terminated,
        }
    }

    /// Whether the run must stop.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Completed iterations so far.
    pub fn current_iteration(&self) -> usize {
        self.current_iter
    }

    /// Fitness delta passed to the latest `next_iteration` call.
    pub fn last_fitness_delta(&self) -> Option<f64> {
        self.last_fitness_delta
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn policies(&self) -> &BTreeSet<TerminationPolicy> {
        &self.policies
    }

    /// Fraction of the iteration budget consumed, in `[0, 1]`.
    ///
    /// For reporting only.
    pub fn estimate_progress(&self) -> f64 {
        if self.args.max_iter == 0 {
            return 1.0;
        }
        (self.current_iter as f64 / self.args.max_iter as f64).clamp(0.0, 1.0)
    }

    /// Records one finished iteration and its best-fitness delta.
    ///
    /// Has no effect once terminated.
    pub fn next_iteration(&mut self, fitness_delta: f64) {
        if self.terminated {
            return;
        }
        self.current_iter += 1;
        self.last_fitness_delta = Some(fitness_delta);

        self.terminated = self.current_iter >= self.args.max_iter
            || self.policies.iter().any(|&p| self.policy_fires(p));
    }

    /// Stop conditions beyond the iteration budget, which always applies.
    fn policy_fires(&self, policy: TerminationPolicy) -> bool {
        match policy {
            TerminationPolicy::Iterations => false,
            // Not wired yet: inputs are tracked but never stop a run.
            TerminationPolicy::Convergence | TerminationPolicy::Duration => false,
        }
    }
}
