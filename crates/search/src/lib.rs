//! Bayes-Adaptive Monte Carlo Planning.
//!
//! This crate provides a generic BAMCP implementation that can be used with
//! any model implementing the `bamcp_core::Model` trait: a Monte Carlo tree
//! search over belief-augmented states, where every simulated trajectory is
//! governed by one model hypothesis drawn from the root belief.
//!
//! # Features
//!
//! - **Generic**: Works with any `Model` implementation
//! - **Root Sampling**: One hypothesis per iteration, no per-node beliefs
//! - **Pluggable Strategies**: Root sampler, tree policy, rollout policy and
//!   backup are swappable strategy objects
//! - **Truncated Rollouts**: Rollout length derived from a tolerance on the
//!   discarded discounted return
//! - **Fair Tie-Breaking**: Maximal candidates are picked uniformly
//!
//! # Example
//!
//! ```
//! use bamcp_search::{games::{Door, TwoDoors, TwoDoorsState}, Bamcp, BamcpConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = BamcpConfig::with_iterations(50).with_discount(0.99);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut bamcp: Bamcp<TwoDoors, _> = Bamcp::new(config, rng).expect("valid config");
//!
//! let result = bamcp.plan(&TwoDoors, TwoDoorsState::Start).expect("search succeeds");
//! assert_eq!(result.best_action, Door::A);
//! ```

pub mod backup;
pub mod config;
pub mod games;
pub mod node;
pub mod policy;
pub mod rollout;
pub mod sampler;
pub mod search;
pub mod select;
pub mod tree;

pub use backup::{BackupStrategy, MonteCarloBackup};
pub use config::BamcpConfig;
pub use node::{ActionId, ActionNode, StateId, StateNode, Stats};
pub use policy::{Greedy, TreePolicy, Ucb1};
pub use rollout::{DefaultPolicy, RandomRollout};
pub use sampler::{BeliefSampler, RootSampler};
pub use search::{ActionStats, Bamcp, SearchResult};
pub use select::rand_max;
pub use tree::{Checkpoint, Tree};
