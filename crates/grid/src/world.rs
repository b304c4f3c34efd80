//! The grid world: configuration, simulated and real transitions.

use crate::belief::{DirichletBelief, Outcome, TransitionHypothesis};
use crate::moves::{Cell, Move};
use crate::state::{GridState, Step};
use bamcp_core::{BamcpError, Model, Result, Transition, UpdatableBelief};
use rand::Rng;
use tracing::debug;

/// Settings of a grid world.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub start: Cell,
    pub goal: Cell,
    /// Leaving this cell makes the belief confident that moves work.
    pub manual: Option<Cell>,
    /// Add the information gained about the dynamics to each step reward.
    pub information_gain: bool,
    /// Probability that the real environment replaces the intended move
    /// with one of the other three.
    pub slip: f64,
    pub goal_reward: f64,
    pub step_cost: f64,
    /// Stop the episode once the goal is reached.
    pub goal_terminal: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            start: Cell::new(0, 0),
            goal: Cell::new(4, 4),
            manual: None,
            information_gain: false,
            slip: 0.2,
            goal_reward: 100.0,
            step_cost: -1.0,
            goal_terminal: false,
        }
    }
}

impl GridConfig {
    fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Check sizes, cells and probabilities.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(BamcpError::InvalidConfig(format!(
                "grid must not be empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        let cells = [
            ("start", Some(self.start)),
            ("goal", Some(self.goal)),
            ("manual", self.manual),
        ];
        for (name, cell) in cells {
            if let Some(cell) = cell {
                if !self.contains(cell) {
                    return Err(BamcpError::InvalidConfig(format!(
                        "{} cell {} is outside the {}x{} grid",
                        name, cell, self.rows, self.cols
                    )));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.slip) {
            return Err(BamcpError::InvalidConfig(format!(
                "slip must be in [0, 1], got {}",
                self.slip
            )));
        }
        if !self.goal_reward.is_finite() || !self.step_cost.is_finite() {
            return Err(BamcpError::InvalidConfig("rewards must be finite".to_string()));
        }
        Ok(())
    }
}

/// Largest information gain of one observation under a belief whose rows
/// hold at least the uniform prior's mass.
///
/// Adding one count to a row of mass `n` gives a KL between predictives of
/// at most `ln((n + 1) / n)`, and `n >= 4`.
fn information_gain_bound() -> f64 {
    (1.0 + 1.0 / Move::COUNT as f64).ln()
}

/// Bounded grid with unknown move dynamics.
#[derive(Clone, Debug)]
pub struct GridWorld {
    config: GridConfig,
}

impl GridWorld {
    /// # Errors
    /// Returns `BamcpError::InvalidConfig` if `config` does not validate.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Start state with the uniform prior.
    pub fn initial_state(&self) -> GridState {
        GridState::new(self.config.start, DirichletBelief::uniform())
    }

    /// Largest per-step reward magnitude.
    ///
    /// With the information bonus enabled this adds the largest gain of one
    /// observation, `ln(1 + 1/4)`, which holds for beliefs grown from the
    /// uniform prior. The step leaving the manual cell replaces the whole
    /// belief and is not covered.
    pub fn r_max(&self) -> f64 {
        let bonus = if self.config.information_gain {
            information_gain_bound()
        } else {
            0.0
        };
        self.config.goal_reward.abs().max(self.config.step_cost.abs() + bonus)
    }

    /// Apply `action` with the environment's true dynamics.
    ///
    /// The intended move happens with probability `1 - slip`; otherwise one
    /// of the other three moves is picked uniformly. The returned state
    /// carries the belief updated with the observed outcome.
    pub fn real_step<R: Rng + ?Sized>(
        &self,
        state: &GridState,
        action: Move,
        rng: &mut R,
    ) -> Result<Transition<GridState>> {
        self.check_active(state)?;
        let outcome = if rng.gen_bool(self.config.slip) {
            let others: Vec<Move> = Move::ALL.into_iter().filter(|m| *m != action).collect();
            others[rng.gen_range(0..others.len())]
        } else {
            action
        };
        self.transition(state, action, outcome)
    }

    /// Successor of `state` when `action` results in `outcome`.
    ///
    /// Used for simulated and real steps alike, so both update the same
    /// belief slot.
    pub fn transition(
        &self,
        state: &GridState,
        action: Move,
        outcome: Move,
    ) -> Result<Transition<GridState>> {
        let position = state.position();
        let mut belief = state.belief().clone();
        belief.update(Outcome {
            action,
            result: outcome,
        })?;

        if self.config.manual == Some(position) {
            debug!(cell = %position, "manual found, belief is now confident");
            belief = DirichletBelief::confident();
        }

        let cell = position.step(outcome, self.config.rows, self.config.cols);
        let reward = if cell == self.config.goal {
            self.config.goal_reward
        } else if self.config.information_gain {
            self.config.step_cost + state.belief().information_gain(&belief)?
        } else {
            self.config.step_cost
        };

        let step = Step {
            action,
            outcome,
            cell,
        };
        Ok(Transition::new(state.advance(step, belief), reward))
    }

    fn check_active(&self, state: &GridState) -> Result<()> {
        if self.is_terminal(state) {
            return Err(BamcpError::IllegalAction(format!(
                "no moves from the goal {}",
                state.position()
            )));
        }
        Ok(())
    }
}

impl Model for GridWorld {
    type State = GridState;
    type Action = Move;
    type Belief = DirichletBelief;

    fn legal_actions(&self, state: &GridState) -> Vec<Move> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            Move::ALL.to_vec()
        }
    }

    fn is_terminal(&self, state: &GridState) -> bool {
        self.config.goal_terminal && state.position() == self.config.goal
    }

    fn belief<'s>(&self, state: &'s GridState) -> &'s DirichletBelief {
        state.belief()
    }

    fn sample_state<R: Rng + ?Sized>(
        &self,
        state: &GridState,
        action: Move,
        hypothesis: &TransitionHypothesis,
        rng: &mut R,
    ) -> Result<Transition<GridState>> {
        self.check_active(state)?;
        let outcome = hypothesis.sample_outcome(action, rng)?;
        self.transition(state, action, outcome)
    }
}
