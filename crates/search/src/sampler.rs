//! Root sampling: one model hypothesis per simulated trajectory.

use bamcp_core::{Belief, Hypothesis, Model, Result};
use rand::Rng;

/// Draws the hypothesis that governs every transition of one iteration,
/// from the root down to the end of the rollout.
pub trait RootSampler<M: Model> {
    /// Draw a hypothesis from the belief held at the root state.
    fn sample<R: Rng + ?Sized>(
        &self,
        model: &M,
        root: &M::State,
        rng: &mut R,
    ) -> Result<Hypothesis<M>>;
}

/// Samples the root state's own belief.
#[derive(Clone, Copy, Debug, Default)]
pub struct BeliefSampler;

impl<M: Model> RootSampler<M> for BeliefSampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        model: &M,
        root: &M::State,
        rng: &mut R,
    ) -> Result<Hypothesis<M>> {
        model.belief(root).sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{BanditState, BernoulliBandit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_belief_sampler_leaves_root_belief_untouched() {
        let bandit = BernoulliBandit::new(3);
        let root = BanditState::uniform(2);
        let before = root.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let hypothesis = BeliefSampler.sample(&bandit, &root, &mut rng).unwrap();

        assert_eq!(hypothesis.len(), 2);
        assert!(hypothesis.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(root, before);
    }
}
