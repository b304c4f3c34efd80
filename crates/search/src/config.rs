//! BAMCP configuration parameters.
//!
//! These parameters control the iteration budget and the return
//! arithmetic of the search. Strategy objects (tree policy, rollout policy,
//! backup) are configured on the searcher itself.

use bamcp_core::{Horizon, Result};

/// BAMCP configuration parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BamcpConfig {
    /// Number of simulations used by `Bamcp::plan`.
    pub num_iterations: usize,

    /// Discount factor, in [0, 1).
    pub gamma: f64,

    /// Tolerance on the return discarded by truncating rollouts.
    pub epsilon: f64,

    /// Upper bound on the absolute per-step reward.
    pub r_max: f64,
}

impl Default for BamcpConfig {
    fn default() -> Self {
        Self {
            num_iterations: 1500,
            gamma: 0.95,
            epsilon: 0.01,
            r_max: 1.0,
        }
    }
}

impl BamcpConfig {
    /// Create a new config with the specified number of iterations.
    pub fn with_iterations(num_iterations: usize) -> Self {
        Self {
            num_iterations,
            ..Default::default()
        }
    }

    /// Set the discount factor.
    pub fn with_discount(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the rollout truncation tolerance.
    pub fn with_tolerance(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the per-step reward bound.
    pub fn with_reward_bound(mut self, r_max: f64) -> Self {
        self.r_max = r_max;
        self
    }

    /// Validate the return parameters and derive the rollout horizon.
    ///
    /// # Errors
    /// Returns `BamcpError::InvalidConfig` for a discount outside [0, 1),
    /// a non-positive tolerance or a negative reward bound.
    pub fn horizon(&self) -> Result<Horizon> {
        Horizon::from_tolerance(self.gamma, self.epsilon, self.r_max)
    }
}
