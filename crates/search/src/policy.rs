//! Tree policies: scores used to pick among already-tried actions while
//! descending the tree.

use crate::node::{ActionNode, StateNode};
use std::hash::Hash;

/// Scores an action node during descent.
///
/// Only consulted at state nodes whose legal actions have all been tried,
/// so every scored edge has at least one visit.
pub trait TreePolicy<S, A> {
    fn score(&self, parent: &StateNode<S, A>, edge: &ActionNode<S, A>) -> f64;
}

/// UCB1: `q + c * sqrt(ln N / n)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ucb1 {
    /// Exploration constant `c`. Should be on the scale of the returns.
    pub exploration: f64,
}

impl Ucb1 {
    pub fn new(exploration: f64) -> Self {
        Self { exploration }
    }
}

impl Default for Ucb1 {
    fn default() -> Self {
        Self::new(std::f64::consts::SQRT_2)
    }
}

impl<S, A> TreePolicy<S, A> for Ucb1
where
    S: Eq + Hash,
    A: Copy + Eq,
{
    fn score(&self, parent: &StateNode<S, A>, edge: &ActionNode<S, A>) -> f64 {
        if edge.n() == 0 {
            return f64::INFINITY;
        }
        let parent_visits = f64::from(parent.visit_count().max(1));
        edge.q() + self.exploration * (parent_visits.ln() / f64::from(edge.n())).sqrt()
    }
}

/// Pure exploitation: the action's mean return.
#[derive(Clone, Copy, Debug, Default)]
pub struct Greedy;

impl<S, A> TreePolicy<S, A> for Greedy
where
    S: Eq + Hash,
    A: Copy,
{
    fn score(&self, _parent: &StateNode<S, A>, edge: &ActionNode<S, A>) -> f64 {
        edge.q()
    }
}
