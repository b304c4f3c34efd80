//! Arena-allocated BAMCP tree.
//!
//! State and action nodes are stored in two contiguous vectors and refer to
//! each other by index. Children are owned by the arena; parent links are
//! plain ids, so dropping the tree drops every branch at once.

use crate::node::{ActionId, ActionNode, StateId, StateNode};
use bamcp_core::{BamcpError, Model, Result, Transition};
use std::fmt::Debug;
use std::hash::Hash;

/// Arena sizes at one point in time.
///
/// Nodes are only ever appended, so the sizes identify everything created
/// since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    states: usize,
    actions: usize,
}

/// Arena-allocated search tree alternating state and action nodes.
#[derive(Clone, Debug)]
pub struct Tree<S, A> {
    states: Vec<StateNode<S, A>>,
    actions: Vec<ActionNode<S, A>>,
}

impl<S, A> Tree<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash + Debug,
{
    /// Create a tree holding a single parentless root for `state`.
    pub fn new<M>(model: &M, state: S) -> Self
    where
        M: Model<State = S, Action = A>,
    {
        let terminal = model.is_terminal(&state);
        let legal_actions = model.legal_actions(&state);
        let root = StateNode::new(state, None, 0, terminal, 0.0, legal_actions);
        Self {
            states: vec![root],
            actions: Vec::new(),
        }
    }

    /// Get a state node by ID.
    ///
    /// # Panics
    /// Panics if the StateId does not belong to this tree.
    pub fn state(&self, id: StateId) -> &StateNode<S, A> {
        &self.states[id.0]
    }

    /// Get a mutable state node by ID.
    ///
    /// # Panics
    /// Panics if the StateId does not belong to this tree.
    pub fn state_mut(&mut self, id: StateId) -> &mut StateNode<S, A> {
        &mut self.states[id.0]
    }

    /// Get an action node by ID.
    ///
    /// # Panics
    /// Panics if the ActionId does not belong to this tree.
    pub fn action(&self, id: ActionId) -> &ActionNode<S, A> {
        &self.actions[id.0]
    }

    /// Get a mutable action node by ID.
    ///
    /// # Panics
    /// Panics if the ActionId does not belong to this tree.
    pub fn action_mut(&mut self, id: ActionId) -> &mut ActionNode<S, A> {
        &mut self.actions[id.0]
    }

    /// The node the tree was created with.
    pub fn root(&self) -> &StateNode<S, A> {
        self.state(StateId::ROOT)
    }

    /// IDs of all state nodes, in creation order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId)
    }

    /// Number of state nodes.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Number of action nodes.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Total number of nodes of both kinds.
    pub fn len(&self) -> usize {
        self.states.len() + self.actions.len()
    }

    /// Always false: a tree is never without its root.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Mark `action` as tried at `state_id` and return its action node,
    /// creating the node on first use.
    ///
    /// # Errors
    /// Returns `BamcpError::IllegalAction` if `action` is neither untried nor
    /// already expanded at this node.
    pub fn expand(&mut self, state_id: StateId, action: A) -> Result<ActionId> {
        let node = &mut self.states[state_id.0];
        if let Some(existing) = node.child(action) {
            return Ok(existing);
        }

        let position = node
            .untried
            .iter()
            .position(|a| *a == action)
            .ok_or_else(|| {
                BamcpError::IllegalAction(format!(
                    "{:?} is not available at node {}",
                    action, state_id.0
                ))
            })?;
        node.untried.swap_remove(position);

        let id = ActionId(self.actions.len());
        self.actions.push(ActionNode::new(action, state_id));
        self.states[state_id.0].children.push((action, id));
        Ok(id)
    }

    /// Attach a sampled transition below `action_id`.
    ///
    /// Returns the existing child when the successor state was sampled
    /// before, otherwise a new state node that stores the transition reward.
    /// The stored reward is the first one sampled; backups use the rewards of
    /// their own iteration.
    pub fn insert_outcome<M>(
        &mut self,
        model: &M,
        action_id: ActionId,
        transition: Transition<S>,
    ) -> StateId
    where
        M: Model<State = S, Action = A>,
    {
        if let Some(&existing) = self.actions[action_id.0].children.get(&transition.state) {
            return existing;
        }

        let parent_depth = self.states[self.actions[action_id.0].parent.0].depth;
        let terminal = model.is_terminal(&transition.state);
        let legal_actions = if terminal {
            Vec::new()
        } else {
            model.legal_actions(&transition.state)
        };

        let id = StateId(self.states.len());
        self.actions[action_id.0]
            .children
            .insert(transition.state.clone(), id);
        self.states.push(StateNode::new(
            transition.state,
            Some(action_id),
            parent_depth + 1,
            terminal,
            transition.reward,
            legal_actions,
        ));
        id
    }

    /// Current arena sizes, to undo a failed iteration with [`Tree::rollback`].
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            states: self.states.len(),
            actions: self.actions.len(),
        }
    }

    /// Remove every node created after `checkpoint`.
    ///
    /// Actions expanded since then go back to their node's untried set.
    /// Statistics are left alone, so no backup may have run in between.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        for edge in self.actions.drain(checkpoint.actions..) {
            if let Some(parent) = self.states.get_mut(edge.parent.0) {
                parent.children.retain(|(_, id)| id.0 < checkpoint.actions);
                parent.untried.push(edge.action);
            }
        }

        for node in self.states.drain(checkpoint.states..) {
            if let Some(edge) = node.parent.and_then(|id| self.actions.get_mut(id.0)) {
                edge.children.retain(|_, id| id.0 < checkpoint.states);
            }
        }
    }

    /// Deepest state node in the tree.
    pub fn max_depth(&self) -> usize {
        self.states.iter().map(|s| s.depth).max().unwrap_or(0)
    }
}
