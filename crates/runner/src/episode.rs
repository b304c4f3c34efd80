//! Plan-act-observe episodes in the grid world.

use anyhow::{Context, Result};
use bamcp_core::Model;
use bamcp_grid::{Cell, GridWorld};
use bamcp_search::{Bamcp, BamcpConfig, Ucb1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One real step taken by the agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EpisodeStep {
    /// Cell before the step, as (row, col).
    pub from: (u32, u32),

    /// Move chosen by the planner.
    pub action: String,

    /// Move the environment actually made.
    pub outcome: String,

    /// Cell after the step.
    pub to: (u32, u32),

    pub reward: f64,

    /// Mean return the search estimated for the chosen move.
    pub q: f64,

    /// Nodes in the search tree that chose the move.
    pub tree_size: usize,
}

/// A complete episode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub steps: Vec<EpisodeStep>,

    /// Undiscounted sum of rewards.
    pub total_reward: f64,

    /// Discounted sum of rewards with the planner's discount.
    pub discounted_return: f64,

    /// Whether the agent ever stood on the goal.
    pub reached_goal: bool,

    pub metadata: HashMap<String, serde_json::Value>,
}

fn coords(cell: Cell) -> (u32, u32) {
    (cell.row, cell.col)
}

/// Run one episode of at most `max_steps` real steps.
///
/// The planner searches a fresh tree from the current state before every
/// step; the environment then applies the chosen move with its true
/// dynamics and the belief absorbs the observed outcome.
pub fn run_episode(
    world: &GridWorld,
    config: &BamcpConfig,
    exploration: f64,
    max_steps: usize,
    seed: u64,
) -> Result<EpisodeRecord> {
    let planner_rng = ChaCha8Rng::seed_from_u64(seed);
    let mut env_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut bamcp: Bamcp<GridWorld, ChaCha8Rng> = Bamcp::new(config.clone(), planner_rng)
        .context("Invalid search configuration")?
        .with_tree_policy(Ucb1::new(exploration));

    let goal = world.config().goal;
    let mut state = world.initial_state();
    let mut steps = Vec::new();
    let mut total_reward = 0.0;
    let mut discounted_return = 0.0;
    let mut discount = 1.0;
    let mut reached_goal = state.position() == goal;

    while steps.len() < max_steps && !world.is_terminal(&state) {
        let result = bamcp
            .plan(world, state.clone())
            .with_context(|| format!("Search failed at step {}", steps.len()))?;
        let action = result.best_action;
        let q = result.stats_for(action).map_or(0.0, |s| s.q);

        let from = state.position();
        let transition = world
            .real_step(&state, action, &mut env_rng)
            .with_context(|| format!("Real step failed at step {}", steps.len()))?;
        state = transition.state;

        let (outcome, to) = state
            .history()
            .last()
            .map(|step| (step.outcome, step.cell))
            .context("Real step left no trace in the history")?;

        info!(
            step = steps.len(),
            %from,
            %action,
            %outcome,
            %to,
            reward = transition.reward,
            q,
            "agent moved"
        );

        total_reward += transition.reward;
        discounted_return += discount * transition.reward;
        discount *= config.gamma;
        reached_goal |= to == goal;

        steps.push(EpisodeStep {
            from: coords(from),
            action: action.to_string(),
            outcome: outcome.to_string(),
            to: coords(to),
            reward: transition.reward,
            q,
            tree_size: result.tree_size,
        });
    }

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert("iterations".to_string(), serde_json::json!(config.num_iterations));
    metadata.insert("gamma".to_string(), serde_json::json!(config.gamma));
    metadata.insert("exploration".to_string(), serde_json::json!(exploration));

    Ok(EpisodeRecord {
        steps,
        total_reward,
        discounted_return,
        reached_goal,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bamcp_grid::GridConfig;

    fn small_world() -> GridWorld {
        GridWorld::new(GridConfig {
            rows: 3,
            cols: 3,
            goal: Cell::new(2, 2),
            ..GridConfig::default()
        })
        .unwrap()
    }

    fn search_config(world: &GridWorld) -> BamcpConfig {
        BamcpConfig::with_iterations(60)
            .with_discount(0.9)
            .with_tolerance(1.0)
            .with_reward_bound(world.r_max())
    }

    #[test]
    fn test_run_episode() {
        let world = small_world();
        let config = search_config(&world);
        let record = run_episode(&world, &config, world.r_max(), 5, 42).unwrap();

        assert_eq!(record.steps.len(), 5);
        assert_eq!(record.steps[0].from, (0, 0));
        for pair in record.steps.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        let total: f64 = record.steps.iter().map(|s| s.reward).sum();
        assert!((record.total_reward - total).abs() < 1e-9);
        assert_eq!(record.metadata["seed"], serde_json::json!(42));
    }

    #[test]
    fn test_episode_is_reproducible() {
        let world = small_world();
        let config = search_config(&world);
        let first = run_episode(&world, &config, world.r_max(), 4, 7).unwrap();
        let second = run_episode(&world, &config, world.r_max(), 4, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_episode_stops_at_terminal_goal() {
        let world = GridWorld::new(GridConfig {
            rows: 1,
            cols: 1,
            start: Cell::new(0, 0),
            goal: Cell::new(0, 0),
            goal_terminal: true,
            ..GridConfig::default()
        })
        .unwrap();
        let config = search_config(&world);
        let record = run_episode(&world, &config, 1.0, 10, 0).unwrap();

        assert!(record.steps.is_empty());
        assert!(record.reached_goal);
        assert_eq!(record.total_reward, 0.0);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let world = small_world();
        let config = search_config(&world).with_discount(1.0);
        assert!(run_episode(&world, &config, 1.0, 3, 0).is_err());
    }

    #[test]
    fn test_record_serializes_to_json() {
        let world = small_world();
        let record = run_episode(&world, &search_config(&world), world.r_max(), 2, 1).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        let parsed: EpisodeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.steps.len(), record.steps.len());
        for (a, b) in parsed.steps.iter().zip(&record.steps) {
            assert_eq!(a.action, b.action);
            assert_eq!(a.to, b.to);
        }
        assert_eq!(parsed.reached_goal, record.reached_goal);
    }
}
