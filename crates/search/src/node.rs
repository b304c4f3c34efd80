//! Search tree node types.
//!
//! The tree alternates between state nodes (belief-augmented states) and
//! action nodes (edges for one action taken from a state). Both live in an
//! arena and refer to each other through lightweight indices.

use std::collections::HashMap;
use std::hash::Hash;

/// Index of a state node in the tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// The node a tree is created with is always at index 0.
    pub const ROOT: StateId = StateId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an action node in the tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub(crate) usize);

impl ActionId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Visit count and running mean of the returns observed at a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    visits: u32,
    mean: f64,
}

impl Stats {
    /// Number of returns recorded so far.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Mean of the recorded returns; 0.0 before the first visit.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Fold one return into the running mean: `n += 1; q += (g - q) / n`.
    pub fn record(&mut self, value: f64) {
        self.visits += 1;
        self.mean += (value - self.mean) / f64::from(self.visits);
    }
}

/// A belief-augmented state in the search tree.
#[derive(Clone, Debug)]
pub struct StateNode<S, A> {
    pub(crate) state: S,
    pub(crate) parent: Option<ActionId>,
    pub(crate) depth: usize,
    pub(crate) terminal: bool,
    pub(crate) reward: f64,
    pub(crate) children: Vec<(A, ActionId)>,
    pub(crate) untried: Vec<A>,
    pub(crate) stats: Stats,
}

impl<S, A: Copy + Eq> StateNode<S, A> {
    pub(crate) fn new(
        state: S,
        parent: Option<ActionId>,
        depth: usize,
        terminal: bool,
        reward: f64,
        legal_actions: Vec<A>,
    ) -> Self {
        Self {
            state,
            parent,
            depth,
            terminal,
            reward,
            children: Vec::new(),
            untried: if terminal { Vec::new() } else { legal_actions },
            stats: Stats::default(),
        }
    }

    /// The state this node stands for.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The action node this state was sampled from (None for the root).
    pub fn parent(&self) -> Option<ActionId> {
        self.parent
    }

    /// Number of actions taken from the root to reach this node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the state was terminal when the node was created.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Reward of the transition that produced this state.
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Action nodes of the actions tried from this state.
    pub fn children(&self) -> &[(A, ActionId)] {
        &self.children
    }

    /// Action node for `action`, if it has been tried.
    pub fn child(&self, action: A) -> Option<ActionId> {
        self.children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, id)| *id)
    }

    /// Legal actions that have not been tried yet.
    pub fn untried_actions(&self) -> &[A] {
        &self.untried
    }

    /// Whether every legal action has been tried at least once.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Visit count and mean return from this state.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of visits to this state.
    pub fn visit_count(&self) -> u32 {
        self.stats.visits()
    }

    /// Record a return measured from this state.
    pub fn record(&mut self, value: f64) {
        self.stats.record(value);
    }
}

/// An action taken from a state node.
///
/// Its children are keyed by the full successor state, so sampling the same
/// outcome twice reuses the existing node.
#[derive(Clone, Debug)]
pub struct ActionNode<S, A> {
    pub(crate) action: A,
    pub(crate) parent: StateId,
    pub(crate) children: HashMap<S, StateId>,
    pub(crate) stats: Stats,
}

impl<S: Eq + Hash, A: Copy> ActionNode<S, A> {
    pub(crate) fn new(action: A, parent: StateId) -> Self {
        Self {
            action,
            parent,
            children: HashMap::new(),
            stats: Stats::default(),
        }
    }

    /// The action this edge represents.
    pub fn action(&self) -> A {
        self.action
    }

    /// The state node the action is taken from.
    pub fn parent(&self) -> StateId {
        self.parent
    }

    /// Number of distinct successor states sampled so far.
    pub fn num_outcomes(&self) -> usize {
        self.children.len()
    }

    /// Successor state nodes sampled so far.
    pub fn outcomes(&self) -> impl Iterator<Item = StateId> + '_ {
        self.children.values().copied()
    }

    /// Visit count and mean return of this action.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of times the action was backed up (`n`).
    pub fn n(&self) -> u32 {
        self.stats.visits()
    }

    /// Mean discounted return of the action (`q`).
    pub fn q(&self) -> f64 {
        self.stats.mean()
    }

    /// Record a return measured from this action.
    pub fn record(&mut self, value: f64) {
        self.stats.record(value);
    }
}
