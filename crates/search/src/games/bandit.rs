//! Bernoulli bandit with unknown arm probabilities.
//!
//! Each arm pays 1 with an unknown probability. The belief is one Beta
//! distribution per arm, stored as integer pseudo-counts so that states
//! can be hashed. A state remembers every pull, which keys tree nodes on
//! the full history.

use bamcp_core::{BamcpError, Belief, Model, Result, Transition, UpdatableBelief};
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// Beta(successes, failures) pseudo-counts for every arm.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BetaBelief {
    counts: Vec<(u32, u32)>,
}

impl BetaBelief {
    /// Beta(1, 1) prior on every arm.
    pub fn uniform(arms: usize) -> Self {
        Self {
            counts: vec![(1, 1); arms],
        }
    }

    /// Explicit pseudo-counts per arm.
    pub fn from_counts(counts: Vec<(u32, u32)>) -> Self {
        Self { counts }
    }

    /// Number of arms.
    pub fn arms(&self) -> usize {
        self.counts.len()
    }

    /// (successes, failures) pseudo-counts for one arm.
    pub fn counts(&self, arm: usize) -> Option<(u32, u32)> {
        self.counts.get(arm).copied()
    }

    /// Posterior mean success probability of one arm.
    pub fn mean(&self, arm: usize) -> Option<f64> {
        self.counts(arm).and_then(|(s, f)| {
            let total = s + f;
            (total > 0).then(|| f64::from(s) / f64::from(total))
        })
    }
}

impl Belief for BetaBelief {
    /// Success probability of every arm.
    type Hypothesis = Vec<f64>;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        self.counts
            .iter()
            .enumerate()
            .map(|(arm, &(s, f))| {
                let beta = Beta::new(f64::from(s), f64::from(f)).map_err(|e| {
                    BamcpError::InconsistentBelief(format!(
                        "arm {} has counts ({}, {}): {}",
                        arm, s, f, e
                    ))
                })?;
                Ok(beta.sample(rng))
            })
            .collect()
    }
}

impl UpdatableBelief for BetaBelief {
    type Observation = Pull;

    fn update(&mut self, pull: Pull) -> Result<()> {
        let counts = self.counts.get_mut(pull.arm).ok_or_else(|| {
            BamcpError::IllegalAction(format!("arm {} does not exist", pull.arm))
        })?;
        if pull.success {
            counts.0 += 1;
        } else {
            counts.1 += 1;
        }
        Ok(())
    }
}

/// One observed pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pull {
    pub arm: usize,
    pub success: bool,
}

/// Belief plus the pulls made so far.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BanditState {
    belief: BetaBelief,
    history: Vec<Pull>,
}

impl BanditState {
    /// Fresh state with a uniform prior over `arms` arms.
    pub fn uniform(arms: usize) -> Self {
        Self::with_belief(BetaBelief::uniform(arms))
    }

    /// Fresh state with the given belief.
    pub fn with_belief(belief: BetaBelief) -> Self {
        Self {
            belief,
            history: Vec::new(),
        }
    }

    /// Current belief.
    pub fn belief(&self) -> &BetaBelief {
        &self.belief
    }

    /// Pulls made so far.
    pub fn history(&self) -> &[Pull] {
        &self.history
    }

    /// State after observing `pull`.
    pub fn observe(&self, pull: Pull) -> Result<Self> {
        let mut next = self.clone();
        next.belief.update(pull)?;
        next.history.push(pull);
        Ok(next)
    }
}

/// Bandit episode with a fixed number of pulls.
#[derive(Clone, Copy, Debug)]
pub struct BernoulliBandit {
    pulls: usize,
}

impl BernoulliBandit {
    /// Episode ending after `pulls` pulls.
    pub fn new(pulls: usize) -> Self {
        Self { pulls }
    }

    /// Number of pulls per episode.
    pub fn pulls(&self) -> usize {
        self.pulls
    }
}

impl Model for BernoulliBandit {
    type State = BanditState;
    type Action = usize;
    type Belief = BetaBelief;

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            (0..state.belief.arms()).collect()
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.history.len() >= self.pulls
    }

    fn belief<'s>(&self, state: &'s Self::State) -> &'s Self::Belief {
        &state.belief
    }

    fn sample_state<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        action: Self::Action,
        hypothesis: &Vec<f64>,
        rng: &mut R,
    ) -> Result<Transition<Self::State>> {
        let p = *hypothesis.get(action).ok_or_else(|| {
            BamcpError::IllegalAction(format!("arm {} does not exist", action))
        })?;
        if !(0.0..=1.0).contains(&p) {
            return Err(BamcpError::InconsistentBelief(format!(
                "arm {} has success probability {}",
                action, p
            )));
        }

        let success = rng.gen_bool(p);
        let next = state.observe(Pull {
            arm: action,
            success,
        })?;
        Ok(Transition::new(next, if success { 1.0 } else { 0.0 }))
    }
}
