use crate::{Result, Transition};
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// A posterior over the unknown parameters of an environment model.
///
/// The search draws one hypothesis per simulated trajectory ("root
/// sampling") and uses it for every transition along that trajectory.
pub trait Belief {
    /// A concrete model instantiation drawn from the belief.
    type Hypothesis;

    /// Draws one hypothesis without mutating the belief.
    ///
    /// # Errors
    /// Returns `BamcpError::InconsistentBelief` if the stored parameters do
    /// not describe a proper distribution.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self::Hypothesis>;
}

/// A belief that can absorb an observed transition.
pub trait UpdatableBelief: Belief {
    /// What the environment reveals after a transition.
    type Observation;

    /// Conditions the belief on an observation.
    fn update(&mut self, observation: Self::Observation) -> Result<()>;
}

/// Belief for environments whose dynamics are fully known.
///
/// Every sample yields the same (empty) hypothesis, so BAMCP degenerates
/// to plain UCT on such models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KnownDynamics;

impl Belief for KnownDynamics {
    type Hypothesis = ();

    fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) -> Result<()> {
        Ok(())
    }
}

/// Hypothesis type of a model's belief.
pub type Hypothesis<M> = <<M as Model>::Belief as Belief>::Hypothesis;

/// A belief-augmented environment model for Bayes-adaptive planning.
///
/// States carry their own belief, so the tree never tracks beliefs per node.
/// State identity should be keyed on the full trajectory rather than on an
/// abstract position; the search tree relies on it to stay acyclic.
pub trait Model {
    /// Belief-augmented state.
    type State: Clone + Eq + Hash;

    /// An action (e.g. a grid move).
    type Action: Copy + Eq + Hash + Debug;

    /// The posterior carried inside each state.
    type Belief: Belief;

    /// Returns all legal actions from the given state
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Returns true if no further transitions happen from this state
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// The belief stored in the given state.
    fn belief<'s>(&self, state: &'s Self::State) -> &'s Self::Belief;

    /// Samples a successor state and its reward under the given hypothesis.
    ///
    /// # Errors
    /// Returns `BamcpError::IllegalAction` if `action` is not legal in
    /// `state`, or `BamcpError::InconsistentBelief` if the hypothesis does
    /// not define a proper outcome distribution for `action`.
    fn sample_state<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        action: Self::Action,
        hypothesis: &Hypothesis<Self>,
        rng: &mut R,
    ) -> Result<Transition<Self::State>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_known_dynamics_sample() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(KnownDynamics.sample(&mut rng), Ok(()));
    }
}
