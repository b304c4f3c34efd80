//! History-keyed grid states.

use crate::belief::DirichletBelief;
use crate::moves::{Cell, Move};
use std::hash::{Hash, Hasher};

/// One step of a trajectory: the intended move, the move that happened,
/// and the cell it led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub action: Move,
    pub outcome: Move,
    pub cell: Cell,
}

/// Position, trajectory and belief of the agent.
///
/// Two states are equal when they share the start cell and the full
/// trajectory. The belief is determined by those two, so it takes no
/// part in equality or hashing; revisiting a cell along a different path
/// is a different state.
#[derive(Clone, Debug)]
pub struct GridState {
    start: Cell,
    history: Vec<Step>,
    belief: DirichletBelief,
}

impl GridState {
    /// State at `start` with an empty trajectory.
    pub fn new(start: Cell, belief: DirichletBelief) -> Self {
        Self {
            start,
            history: Vec::new(),
            belief,
        }
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    /// Current cell.
    pub fn position(&self) -> Cell {
        self.history.last().map_or(self.start, |step| step.cell)
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }

    pub fn belief(&self) -> &DirichletBelief {
        &self.belief
    }

    /// Number of steps taken.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Successor after `step`, holding `belief`.
    pub(crate) fn advance(&self, step: Step, belief: DirichletBelief) -> Self {
        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend_from_slice(&self.history);
        history.push(step);
        Self {
            start: self.start,
            history,
            belief,
        }
    }
}

impl PartialEq for GridState {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.history == other.history
    }
}

impl Eq for GridState {}

impl Hash for GridState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.history.hash(state);
    }
}
