//! Bayes-Adaptive Monte Carlo Planning.
//!
//! Each iteration draws one model hypothesis from the root belief, descends
//! the tree with the tree policy until it creates a new frontier node, rolls
//! out from the frontier under the same hypothesis, and backs the return up
//! to the root.

use crate::{
    backup::{BackupStrategy, MonteCarloBackup},
    config::BamcpConfig,
    node::{ActionId, StateId},
    policy::{TreePolicy, Ucb1},
    rollout::{DefaultPolicy, RandomRollout},
    sampler::{BeliefSampler, RootSampler},
    select::rand_max,
    tree::Tree,
};
use bamcp_core::{BamcpError, Horizon, Hypothesis, Model, Result};
use rand::Rng;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Statistics of one root action after a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionStats<A> {
    pub action: A,

    /// Number of iterations that went through this action.
    pub visits: u32,

    /// Mean discounted return of the action.
    pub q: f64,
}

/// Result of a BAMCP search.
#[derive(Clone, Debug)]
pub struct SearchResult<A> {
    /// Root action with the highest mean return (ties broken uniformly).
    pub best_action: A,

    /// Statistics for every action tried at the root.
    pub root_stats: Vec<ActionStats<A>>,

    /// Number of iterations run by this call.
    pub iterations: usize,

    /// Visit count of the root after the search.
    pub root_visits: u32,

    /// Number of nodes (both kinds) in the tree after the search.
    pub tree_size: usize,

    /// Depth of the deepest state node.
    pub max_depth: usize,
}

impl<A: Copy + PartialEq> SearchResult<A> {
    /// Get the best action (greedy selection).
    pub fn best(&self) -> A {
        self.best_action
    }

    /// Root statistics for one action, if it was tried.
    pub fn stats_for(&self, action: A) -> Option<&ActionStats<A>> {
        self.root_stats.iter().find(|s| s.action == action)
    }

    /// Sum of the visit counts of all root actions.
    pub fn total_child_visits(&self) -> u32 {
        self.root_stats.iter().map(|s| s.visits).sum()
    }
}

/// Bayes-Adaptive Monte Carlo Planner.
///
/// Generic over:
/// - `M`: The model being planned in
/// - `R`: The random number generator
/// - `S`: Root sampler drawing one hypothesis per iteration
/// - `T`: Tree policy scoring tried actions during descent
/// - `D`: Default policy estimating returns beyond the frontier
/// - `B`: Backup strategy updating the path to the root
pub struct Bamcp<
    M,
    R,
    S = BeliefSampler,
    T = Ucb1,
    D = RandomRollout,
    B = MonteCarloBackup,
> {
    config: BamcpConfig,
    horizon: Horizon,
    root_sampler: S,
    tree_policy: T,
    default_policy: D,
    backup: B,
    rng: R,
    _model: PhantomData<M>,
}

impl<M: Model, R: Rng> Bamcp<M, R> {
    /// Create a planner with the default strategies: belief root sampling,
    /// UCB1 descent, uniformly random rollouts and Monte Carlo backups.
    ///
    /// # Errors
    /// Returns `BamcpError::InvalidConfig` if the return parameters of
    /// `config` are out of range.
    pub fn new(config: BamcpConfig, rng: R) -> Result<Self> {
        let horizon = config.horizon()?;
        Ok(Self {
            config,
            horizon,
            root_sampler: BeliefSampler,
            tree_policy: Ucb1::default(),
            default_policy: RandomRollout,
            backup: MonteCarloBackup,
            rng,
            _model: PhantomData,
        })
    }
}

impl<M: Model, R: Rng, S, T, D, B> Bamcp<M, R, S, T, D, B> {
    /// Replace the root sampler.
    pub fn with_root_sampler<S2>(self, root_sampler: S2) -> Bamcp<M, R, S2, T, D, B> {
        Bamcp {
            config: self.config,
            horizon: self.horizon,
            root_sampler,
            tree_policy: self.tree_policy,
            default_policy: self.default_policy,
            backup: self.backup,
            rng: self.rng,
            _model: PhantomData,
        }
    }

    /// Replace the tree policy.
    pub fn with_tree_policy<T2>(self, tree_policy: T2) -> Bamcp<M, R, S, T2, D, B> {
        Bamcp {
            config: self.config,
            horizon: self.horizon,
            root_sampler: self.root_sampler,
            tree_policy,
            default_policy: self.default_policy,
            backup: self.backup,
            rng: self.rng,
            _model: PhantomData,
        }
    }

    /// Replace the default (rollout) policy.
    pub fn with_default_policy<D2>(self, default_policy: D2) -> Bamcp<M, R, S, T, D2, B> {
        Bamcp {
            config: self.config,
            horizon: self.horizon,
            root_sampler: self.root_sampler,
            tree_policy: self.tree_policy,
            default_policy,
            backup: self.backup,
            rng: self.rng,
            _model: PhantomData,
        }
    }

    /// Replace the backup strategy.
    pub fn with_backup<B2>(self, backup: B2) -> Bamcp<M, R, S, T, D, B2> {
        Bamcp {
            config: self.config,
            horizon: self.horizon,
            root_sampler: self.root_sampler,
            tree_policy: self.tree_policy,
            default_policy: self.default_policy,
            backup,
            rng: self.rng,
            _model: PhantomData,
        }
    }

    /// The configuration the planner was built with.
    pub fn config(&self) -> &BamcpConfig {
        &self.config
    }

    /// Discount and rollout length derived from the configuration.
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// The tree policy in use.
    pub fn tree_policy(&self) -> &T {
        &self.tree_policy
    }
}

impl<M, R, S, T, D, B> Bamcp<M, R, S, T, D, B>
where
    M: Model,
    R: Rng,
    S: RootSampler<M>,
    T: TreePolicy<M::State, M::Action>,
    D: DefaultPolicy<M>,
    B: BackupStrategy<M::State, M::Action>,
{
    /// Build a fresh tree for `state` and search it for
    /// `config.num_iterations` iterations.
    pub fn plan(&mut self, model: &M, state: M::State) -> Result<SearchResult<M::Action>> {
        let mut tree = Tree::new(model, state);
        let iterations = self.config.num_iterations;
        self.search(model, &mut tree, StateId::ROOT, iterations)
    }

    /// Run `n_iterations` simulations from `root` and return the root action
    /// with the highest mean return.
    ///
    /// A failing iteration is rolled back: nodes it created are removed and
    /// nothing is backed up, so the tree can be inspected after a failed
    /// call and looks as it did before that iteration.
    ///
    /// # Errors
    /// - `BamcpError::InvalidRoot` if `root` has a parent (no iteration runs)
    /// - `BamcpError::EmptyInput` if a non-terminal state has no legal
    ///   actions, or the root has no tried action to return
    /// - `BamcpError::InconsistentBelief` raised by the model's belief
    pub fn search(
        &mut self,
        model: &M,
        tree: &mut Tree<M::State, M::Action>,
        root: StateId,
        n_iterations: usize,
    ) -> Result<SearchResult<M::Action>> {
        if tree.state(root).parent().is_some() {
            return Err(BamcpError::InvalidRoot);
        }

        for _ in 0..n_iterations {
            self.simulate(model, tree, root)?;
        }

        let result = self.extract_results(tree, root, n_iterations)?;
        debug!(
            iterations = result.iterations,
            tree_size = result.tree_size,
            max_depth = result.max_depth,
            best_action = ?result.best_action,
            "search finished"
        );
        Ok(result)
    }

    /// Run a single simulation: sample -> descend/expand -> rollout -> backup.
    fn simulate(
        &mut self,
        model: &M,
        tree: &mut Tree<M::State, M::Action>,
        root: StateId,
    ) -> Result<()> {
        let hypothesis = self
            .root_sampler
            .sample(model, tree.state(root).state(), &mut self.rng)?;

        let checkpoint = tree.checkpoint();
        let mut rewards = Vec::new();
        let sampled = self.trajectory(model, tree, root, &hypothesis, &mut rewards);
        let (frontier, value) = match sampled {
            Ok(sample) => sample,
            Err(err) => {
                tree.rollback(checkpoint);
                return Err(err);
            }
        };

        self.backup.backup(tree, frontier, &rewards, value, self.horizon.gamma());
        Ok(())
    }

    /// Descend to the frontier and roll out from it.
    ///
    /// Returns the frontier and its rollout value; `rewards` receives the
    /// reward of every transition taken in the tree.
    fn trajectory(
        &mut self,
        model: &M,
        tree: &mut Tree<M::State, M::Action>,
        root: StateId,
        hypothesis: &Hypothesis<M>,
        rewards: &mut Vec<f64>,
    ) -> Result<(StateId, f64)> {
        let frontier = self.descend(model, tree, root, hypothesis, rewards)?;

        let value = self.default_policy.rollout(
            model,
            tree.state(frontier).state(),
            hypothesis,
            &self.horizon,
            &mut self.rng,
        )?;
        trace!(depth = tree.state(frontier).depth(), value, "rollout finished");

        Ok((frontier, value))
    }

    /// Descend from `root` to the frontier of this iteration.
    ///
    /// Terminal nodes are their own frontier. A node with untried actions is
    /// expanded with one of them, chosen uniformly, and the sampled successor
    /// becomes the frontier. Only fully expanded nodes consult the tree
    /// policy.
    fn descend(
        &mut self,
        model: &M,
        tree: &mut Tree<M::State, M::Action>,
        root: StateId,
        hypothesis: &Hypothesis<M>,
        rewards: &mut Vec<f64>,
    ) -> Result<StateId> {
        let mut current = root;

        loop {
            let node = tree.state(current);
            if node.is_terminal() {
                return Ok(current);
            }

            if !node.is_fully_expanded() {
                let untried = node.untried_actions();
                let action = untried[self.rng.gen_range(0..untried.len())];
                let transition =
                    model.sample_state(node.state(), action, hypothesis, &mut self.rng)?;
                let edge = tree.expand(current, action)?;
                rewards.push(transition.reward);
                return Ok(tree.insert_outcome(model, edge, transition));
            }

            let policy = &self.tree_policy;
            let edge = rand_max(
                node.children().iter().map(|(_, id)| *id),
                |id| policy.score(node, tree.action(*id)),
                &mut self.rng,
            )?;
            current = self.sample_outcome(model, tree, edge, hypothesis, rewards)?;
        }
    }

    /// Sample a successor below `edge` under the iteration's hypothesis.
    fn sample_outcome(
        &mut self,
        model: &M,
        tree: &mut Tree<M::State, M::Action>,
        edge: ActionId,
        hypothesis: &Hypothesis<M>,
        rewards: &mut Vec<f64>,
    ) -> Result<StateId> {
        let action = tree.action(edge).action();
        let parent = tree.action(edge).parent();
        let transition =
            model.sample_state(tree.state(parent).state(), action, hypothesis, &mut self.rng)?;
        rewards.push(transition.reward);
        Ok(tree.insert_outcome(model, edge, transition))
    }

    /// Extract search results from the root node.
    fn extract_results(
        &mut self,
        tree: &Tree<M::State, M::Action>,
        root: StateId,
        iterations: usize,
    ) -> Result<SearchResult<M::Action>> {
        let node = tree.state(root);

        let root_stats: Vec<ActionStats<M::Action>> = node
            .children()
            .iter()
            .map(|(action, id)| {
                let edge = tree.action(*id);
                ActionStats {
                    action: *action,
                    visits: edge.n(),
                    q: edge.q(),
                }
            })
            .collect();

        // No exploration bonus here: pure exploitation of the statistics.
        let best_action = rand_max(root_stats.iter(), |s| s.q, &mut self.rng)?.action;

        Ok(SearchResult {
            best_action,
            root_stats,
            iterations,
            root_visits: node.visit_count(),
            tree_size: tree.len(),
            max_depth: tree.max_depth(),
        })
    }
}
