//! Default (rollout) policies.
//!
//! A rollout estimates the return beyond the tree frontier by simulating a
//! continuation that is not added to the tree. Rollouts use the hypothesis
//! drawn by the root sampler for the current iteration.

use bamcp_core::{Horizon, Hypothesis, Model, Result};
use rand::Rng;

/// Estimates the discounted return from a frontier state.
pub trait DefaultPolicy<M: Model> {
    /// Simulate from `state` and return `sum_t gamma^t * r_t` over at most
    /// `horizon.steps()` transitions.
    fn rollout<R: Rng + ?Sized>(
        &self,
        model: &M,
        state: &M::State,
        hypothesis: &Hypothesis<M>,
        horizon: &Horizon,
        rng: &mut R,
    ) -> Result<f64>;
}

/// Rollout with uniformly random legal actions.
///
/// Stops early on a terminal state or a state without legal actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRollout;

impl<M: Model> DefaultPolicy<M> for RandomRollout {
    fn rollout<R: Rng + ?Sized>(
        &self,
        model: &M,
        state: &M::State,
        hypothesis: &Hypothesis<M>,
        horizon: &Horizon,
        rng: &mut R,
    ) -> Result<f64> {
        let mut state = state.clone();
        let mut total = 0.0;
        let mut discount = 1.0;

        for _ in 0..horizon.steps() {
            if model.is_terminal(&state) {
                break;
            }
            let legal_actions = model.legal_actions(&state);
            if legal_actions.is_empty() {
                break;
            }

            let action = legal_actions[rng.gen_range(0..legal_actions.len())];
            let transition = model.sample_state(&state, action, hypothesis, rng)?;
            total += discount * transition.reward;
            discount *= horizon.gamma();
            state = transition.state;
        }

        Ok(total)
    }
}
