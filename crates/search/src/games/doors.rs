//! Two doors, one decision.
//!
//! Door A pays 10 and door B pays nothing; either ends the episode. The
//! dynamics are known, so a correct planner must always pick door A.

use bamcp_core::{BamcpError, KnownDynamics, Model, Result, Transition};
use rand::Rng;
use std::fmt;

/// Door to open.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Door {
    A,
    B,
}

impl fmt::Display for Door {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Door::A => write!(f, "A"),
            Door::B => write!(f, "B"),
        }
    }
}

/// Before or after the decision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TwoDoorsState {
    Start,
    Done,
}

/// Two-door domain implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoDoors;

impl TwoDoors {
    /// Reward for opening each door.
    pub fn reward(door: Door) -> f64 {
        match door {
            Door::A => 10.0,
            Door::B => 0.0,
        }
    }
}

impl Model for TwoDoors {
    type State = TwoDoorsState;
    type Action = Door;
    type Belief = KnownDynamics;

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        match state {
            TwoDoorsState::Start => vec![Door::A, Door::B],
            TwoDoorsState::Done => Vec::new(),
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        *state == TwoDoorsState::Done
    }

    fn belief<'s>(&self, _state: &'s Self::State) -> &'s Self::Belief {
        &KnownDynamics
    }

    fn sample_state<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        action: Self::Action,
        _hypothesis: &(),
        _rng: &mut R,
    ) -> Result<Transition<Self::State>> {
        if *state == TwoDoorsState::Done {
            return Err(BamcpError::IllegalAction(format!(
                "door {} after the episode ended",
                action
            )));
        }
        Ok(Transition::new(TwoDoorsState::Done, Self::reward(action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_transitions() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = TwoDoors
            .sample_state(&TwoDoorsState::Start, Door::A, &(), &mut rng)
            .unwrap();
        assert_eq!(t.state, TwoDoorsState::Done);
        assert_eq!(t.reward, 10.0);
        assert!(TwoDoors.is_terminal(&t.state));
        assert!(TwoDoors.legal_actions(&t.state).is_empty());
    }

    #[test]
    fn test_no_action_after_done() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = TwoDoors.sample_state(&TwoDoorsState::Done, Door::B, &(), &mut rng);
        assert!(matches!(result, Err(BamcpError::IllegalAction(_))));
    }
}
