//! BAMCP Core - Environment contract for Bayes-adaptive planning
//!
//! This crate provides the traits a domain implements to be searched by
//! the BAMCP engine, together with the error type shared by the workspace.
//!
//! # Types
//!
//! - [`Model`] - Belief-augmented environment model
//! - [`Belief`] - Posterior that can be sampled for a model hypothesis
//! - [`Transition`] - Sampled successor state and reward
//! - [`Horizon`] - Discount factor and truncated rollout length

mod error;
mod model;
mod types;

pub use error::{BamcpError, Result};
pub use model::{Belief, Hypothesis, KnownDynamics, Model, UpdatableBelief};
pub use types::{truncation_bound, Horizon, Transition};
