//! Backup strategies: propagate one simulated return from the frontier to
//! the root.

use crate::node::StateId;
use crate::tree::Tree;
use std::fmt::Debug;
use std::hash::Hash;

/// Updates node statistics along the path from a frontier node to the root.
pub trait BackupStrategy<S, A> {
    /// `rewards` holds the rewards sampled on this iteration's transitions,
    /// from the root down to `frontier`. `value` is the return measured from
    /// the frontier state (its rollout estimate).
    fn backup(
        &self,
        tree: &mut Tree<S, A>,
        frontier: StateId,
        rewards: &[f64],
        value: f64,
        gamma: f64,
    );
}

/// Discounted Monte Carlo backup with incremental means.
///
/// Walking up from the frontier, the return seen by each action node is
/// `G = r + gamma * G'`, where `r` is the reward sampled for the transition
/// below it on this iteration and `G'` the return of the state below it.
/// Each node on the path is updated exactly once.
///
/// If `rewards` is shorter than the path, the upper levels fall back to the
/// reward stored when their child node was created.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonteCarloBackup;

impl<S, A> BackupStrategy<S, A> for MonteCarloBackup
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash + Debug,
{
    fn backup(
        &self,
        tree: &mut Tree<S, A>,
        frontier: StateId,
        rewards: &[f64],
        value: f64,
        gamma: f64,
    ) {
        let mut current = frontier;
        let mut ret = value;
        let mut rewards = rewards.iter().rev();

        loop {
            let node = tree.state_mut(current);
            node.record(ret);
            let Some(edge_id) = node.parent() else {
                break;
            };
            let reward = rewards.next().copied().unwrap_or_else(|| node.reward());
            ret = reward + gamma * ret;

            let edge = tree.action_mut(edge_id);
            edge.record(ret);
            current = edge.parent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Door, TwoDoors, TwoDoorsState};
    use bamcp_core::Transition;

    #[test]
    fn test_backup_discounts_per_level() {
        let mut tree = Tree::new(&TwoDoors, TwoDoorsState::Start);
        let a = tree.expand(StateId::ROOT, Door::A).unwrap();
        let leaf = tree.insert_outcome(&TwoDoors, a, Transition::new(TwoDoorsState::Done, 10.0));

        MonteCarloBackup.backup(&mut tree, leaf, &[10.0], 4.0, 0.5);

        // leaf value 4, edge return 10 + 0.5 * 4
        assert_eq!(tree.state(leaf).visit_count(), 1);
        assert!((tree.state(leaf).stats().mean() - 4.0).abs() < 1e-12);
        assert_eq!(tree.action(a).n(), 1);
        assert!((tree.action(a).q() - 12.0).abs() < 1e-12);
        assert_eq!(tree.root().visit_count(), 1);
        assert!((tree.root().stats().mean() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_scripted_backups_give_arithmetic_mean() {
        let mut tree = Tree::new(&TwoDoors, TwoDoorsState::Start);
        let a = tree.expand(StateId::ROOT, Door::A).unwrap();
        let leaf = tree.insert_outcome(&TwoDoors, a, Transition::new(TwoDoorsState::Done, 0.0));

        let returns = [5.0, -3.0, 8.5, 0.0, 12.0, -7.25, 1.0];
        for &g in &returns {
            MonteCarloBackup.backup(&mut tree, leaf, &[0.0], g, 0.9);
        }

        let k = returns.len() as f64;
        let mean_leaf: f64 = returns.iter().sum::<f64>() / k;
        let mean_edge: f64 = returns.iter().map(|g| 0.9 * g).sum::<f64>() / k;

        assert_eq!(tree.action(a).n() as usize, returns.len());
        assert!((tree.state(leaf).stats().mean() - mean_leaf).abs() < 1e-9);
        assert!((tree.action(a).q() - mean_edge).abs() < 1e-9);
        assert!((tree.root().stats().mean() - mean_edge).abs() < 1e-9);
    }

    #[test]
    fn test_backup_at_root_only_touches_root() {
        let mut tree = Tree::new(&TwoDoors, TwoDoorsState::Done);
        MonteCarloBackup.backup(&mut tree, StateId::ROOT, &[], 0.0, 0.9);
        assert_eq!(tree.root().visit_count(), 1);
        assert_eq!(tree.num_actions(), 0);
    }

    #[test]
    fn test_sampled_rewards_override_stored_reward() {
        let mut tree = Tree::new(&TwoDoors, TwoDoorsState::Start);
        let a = tree.expand(StateId::ROOT, Door::A).unwrap();
        let leaf = tree.insert_outcome(&TwoDoors, a, Transition::new(TwoDoorsState::Done, 1.0));

        // Same successor reached with a different reward each time
        for &r in &[1.0, 0.0, 0.0, 1.0] {
            MonteCarloBackup.backup(&mut tree, leaf, &[r], 0.0, 0.9);
        }

        assert_eq!(tree.action(a).n(), 4);
        assert!((tree.action(a).q() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_rewards_fall_back_to_stored_reward() {
        let mut tree = Tree::new(&TwoDoors, TwoDoorsState::Start);
        let a = tree.expand(StateId::ROOT, Door::A).unwrap();
        let leaf = tree.insert_outcome(&TwoDoors, a, Transition::new(TwoDoorsState::Done, 10.0));

        MonteCarloBackup.backup(&mut tree, leaf, &[], 2.0, 0.5);
        assert!((tree.action(a).q() - 11.0).abs() < 1e-12);
    }
}
