//! Property-based tests for the BAMCP tree and search loop.
//!
//! These tests verify the structural invariants of the search:
//! - Tried and untried actions partition the legal actions of every node
//! - Untried sets only shrink, and the tree policy never sees a node with
//!   untried actions
//! - Root visits are conserved across children
//! - Same seed gives the same search

use bamcp_core::Model;
use bamcp_search::{
    games::{BanditState, BernoulliBandit, BetaBelief},
    ActionNode, Bamcp, BamcpConfig, StateId, StateNode, Tree, TreePolicy, Ucb1,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

type BanditTree = Tree<BanditState, usize>;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

/// Generate a random seed
fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Generate a random number of iterations (small for fast tests)
fn arb_iterations() -> impl Strategy<Value = usize> {
    1usize..120
}

/// Generate a bandit episode: number of arms and pulls
fn arb_bandit() -> impl Strategy<Value = (usize, usize)> {
    (1usize..4, 1usize..5)
}

fn planner(seed: u64) -> Bamcp<BernoulliBandit, ChaCha8Rng> {
    let config = BamcpConfig::default().with_discount(0.9).with_tolerance(0.05);
    Bamcp::new(config, ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

/// Check that untried and tried actions partition the legal actions.
fn check_tree_shape(model: &BernoulliBandit, tree: &BanditTree) -> Result<(), TestCaseError> {
    for id in tree.state_ids() {
        let node = tree.state(id);
        let legal: HashSet<usize> = model.legal_actions(node.state()).into_iter().collect();
        let untried: HashSet<usize> = node.untried_actions().iter().copied().collect();
        let tried: HashSet<usize> = node
            .children()
            .iter()
            .filter(|(_, edge)| tree.action(*edge).n() > 0)
            .map(|(a, _)| *a)
            .collect();

        prop_assert_eq!(untried.len(), node.untried_actions().len(), "duplicate untried action");
        prop_assert!(untried.is_disjoint(&tried), "action both tried and untried");
        prop_assert_eq!(&untried | &tried, legal);
        prop_assert_eq!(tried.len(), node.children().len(), "child edge without a visit");
    }
    Ok(())
}

/// Check that parent links form a tree rooted at the search root.
fn check_acyclic(tree: &BanditTree) -> Result<(), TestCaseError> {
    for id in tree.state_ids() {
        let node = tree.state(id);
        match node.parent() {
            None => prop_assert_eq!(id, StateId::ROOT),
            Some(edge) => {
                let parent = tree.state(tree.action(edge).parent());
                prop_assert_eq!(node.depth(), parent.depth() + 1);
                prop_assert_eq!(node.state().history().len(), node.depth());
            }
        }
    }
    Ok(())
}

// =============================================================================
// Tree shape and widening
// =============================================================================

proptest! {
    /// Untried and tried actions partition the legal actions after every iteration
    #[test]
    fn prop_tree_shape_invariant(
        seed in arb_seed(),
        iterations in arb_iterations(),
        (arms, pulls) in arb_bandit()
    ) {
        let model = BernoulliBandit::new(pulls);
        let mut tree = Tree::new(&model, BanditState::uniform(arms));
        let mut bamcp = planner(seed);

        for _ in 0..iterations {
            bamcp.search(&model, &mut tree, StateId::ROOT, 1).unwrap();
            check_tree_shape(&model, &tree)?;
        }
        check_acyclic(&tree)?;
    }

    /// Untried sets never grow
    #[test]
    fn prop_monotonic_widening(
        seed in arb_seed(),
        iterations in arb_iterations(),
        (arms, pulls) in arb_bandit()
    ) {
        let model = BernoulliBandit::new(pulls);
        let mut tree = Tree::new(&model, BanditState::uniform(arms));
        let mut bamcp = planner(seed);
        let mut untried_sizes: HashMap<StateId, usize> = HashMap::new();

        for _ in 0..iterations {
            bamcp.search(&model, &mut tree, StateId::ROOT, 1).unwrap();
            for id in tree.state_ids() {
                let size = tree.state(id).untried_actions().len();
                if let Some(&previous) = untried_sizes.get(&id) {
                    prop_assert!(
                        size <= previous,
                        "untried set grew from {} to {}",
                        previous,
                        size
                    );
                }
                untried_sizes.insert(id, size);
            }
        }
    }

    /// Without a terminal root, every iteration goes through exactly one root action
    #[test]
    fn prop_visit_conservation(
        seed in arb_seed(),
        iterations in arb_iterations(),
        (arms, pulls) in arb_bandit()
    ) {
        let model = BernoulliBandit::new(pulls);
        let mut bamcp = planner(seed);

        let mut tree = Tree::new(&model, BanditState::uniform(arms));
        let result = bamcp.search(&model, &mut tree, StateId::ROOT, iterations).unwrap();

        prop_assert_eq!(result.total_child_visits() as usize, iterations);
        prop_assert_eq!(result.root_visits as usize, iterations);
    }

    /// Same seed should produce identical results
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        iterations in arb_iterations(),
        (arms, pulls) in arb_bandit()
    ) {
        let model = BernoulliBandit::new(pulls);
        let run = || {
            let mut tree = Tree::new(&model, BanditState::uniform(arms));
            planner(seed)
                .search(&model, &mut tree, StateId::ROOT, iterations)
                .unwrap()
        };

        let result1 = run();
        let result2 = run();

        prop_assert_eq!(result1.best_action, result2.best_action);
        prop_assert_eq!(result1.root_stats, result2.root_stats);
        prop_assert_eq!(result1.tree_size, result2.tree_size);
    }
}

// =============================================================================
// Tree policy is only consulted at fully expanded nodes
// =============================================================================

/// UCB1 that counts its calls and any call made at a node with untried actions.
#[derive(Default)]
struct SpyPolicy {
    calls: Cell<usize>,
    premature: Cell<usize>,
}

impl TreePolicy<BanditState, usize> for SpyPolicy {
    fn score(
        &self,
        parent: &StateNode<BanditState, usize>,
        edge: &ActionNode<BanditState, usize>,
    ) -> f64 {
        self.calls.set(self.calls.get() + 1);
        if !parent.untried_actions().is_empty() || edge.n() == 0 {
            self.premature.set(self.premature.get() + 1);
        }
        Ucb1::default().score(parent, edge)
    }
}

proptest! {
    #[test]
    fn prop_tree_policy_never_sees_untried_actions(
        seed in arb_seed(),
        iterations in 10usize..150,
        (arms, pulls) in (2usize..4, 2usize..5)
    ) {
        let model = BernoulliBandit::new(pulls);
        let mut bamcp = planner(seed).with_tree_policy(SpyPolicy::default());
        let mut tree = Tree::new(&model, BanditState::uniform(arms));

        bamcp.search(&model, &mut tree, StateId::ROOT, iterations).unwrap();

        prop_assert_eq!(bamcp.tree_policy().premature.get(), 0);
        if iterations > arms {
            prop_assert!(bamcp.tree_policy().calls.get() > 0);
        }
    }
}

// =============================================================================
// History-keyed identity
// =============================================================================

#[test]
fn test_same_belief_different_history_are_distinct_nodes() {
    use bamcp_search::games::Pull;

    let root = BanditState::with_belief(BetaBelief::uniform(2));
    let a = root
        .observe(Pull { arm: 0, success: true })
        .and_then(|s| s.observe(Pull { arm: 1, success: false }))
        .unwrap();
    let b = root
        .observe(Pull { arm: 1, success: false })
        .and_then(|s| s.observe(Pull { arm: 0, success: true }))
        .unwrap();

    // Identical posterior, different trajectories
    assert_eq!(a.belief(), b.belief());
    assert_ne!(a, b);
}
