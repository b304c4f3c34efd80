//! Value types shared by models and the search engine.
//!
//! - Transition: successor state plus the reward collected on the way
//! - Horizon: discount factor and truncated rollout length

use crate::{BamcpError, Result};

/// Outcome of one sampled environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<S> {
    /// Successor state.
    pub state: S,

    /// Reward received for the step.
    pub reward: f64,
}

impl<S> Transition<S> {
    pub fn new(state: S, reward: f64) -> Self {
        Self { state, reward }
    }
}

/// Upper bound on the return discarded by truncating a rollout after
/// `steps` steps: `gamma^steps * r_max / (1 - gamma)`.
pub fn truncation_bound(gamma: f64, r_max: f64, steps: usize) -> f64 {
    let steps = i32::try_from(steps).unwrap_or(i32::MAX);
    gamma.powi(steps) * r_max / (1.0 - gamma)
}

/// Discount factor together with the rollout length it implies.
///
/// Invariant: `0 <= gamma < 1`, and `steps` is the smallest horizon whose
/// truncation bound does not exceed the tolerance it was built from.
///
/// # Example
/// ```
/// use bamcp_core::{truncation_bound, Horizon};
///
/// let horizon = Horizon::from_tolerance(0.9, 0.01, 1.0).unwrap();
/// assert!(truncation_bound(0.9, 1.0, horizon.steps()) <= 0.01);
/// assert!(truncation_bound(0.9, 1.0, horizon.steps() - 1) > 0.01);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Horizon {
    gamma: f64,
    steps: usize,
}

impl Horizon {
    /// Build the minimal horizon `H` with `gamma^H * r_max / (1 - gamma) <= epsilon`.
    ///
    /// # Errors
    /// Returns `BamcpError::InvalidConfig` if:
    /// - `gamma` is outside `[0, 1)`
    /// - `epsilon` is not strictly positive
    /// - `r_max` is negative
    /// - any argument is not finite
    pub fn from_tolerance(gamma: f64, epsilon: f64, r_max: f64) -> Result<Self> {
        if !gamma.is_finite() || !(0.0..1.0).contains(&gamma) {
            return Err(BamcpError::InvalidConfig(format!(
                "discount {} is outside [0, 1)",
                gamma
            )));
        }
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(BamcpError::InvalidConfig(format!(
                "truncation tolerance {} must be positive",
                epsilon
            )));
        }
        if !r_max.is_finite() || r_max < 0.0 {
            return Err(BamcpError::InvalidConfig(format!(
                "reward bound {} must be non-negative",
                r_max
            )));
        }

        if truncation_bound(gamma, r_max, 0) <= epsilon {
            return Ok(Self { gamma, steps: 0 });
        }
        if gamma == 0.0 {
            return Ok(Self { gamma, steps: 1 });
        }

        // Closed form, then walk to the exact boundary to absorb rounding.
        let estimate = ((epsilon * (1.0 - gamma) / r_max).ln() / gamma.ln()).ceil();
        let mut steps = if estimate.is_finite() && estimate > 0.0 {
            estimate as usize
        } else {
            1
        };
        while truncation_bound(gamma, r_max, steps) > epsilon {
            steps += 1;
        }
        while steps > 0 && truncation_bound(gamma, r_max, steps - 1) <= epsilon {
            steps -= 1;
        }

        Ok(Self { gamma, steps })
    }

    /// Horizon with an explicit step count.
    ///
    /// # Errors
    /// Returns `BamcpError::InvalidConfig` if `gamma` is outside `[0, 1)`.
    pub fn fixed(gamma: f64, steps: usize) -> Result<Self> {
        if !gamma.is_finite() || !(0.0..1.0).contains(&gamma) {
            return Err(BamcpError::InvalidConfig(format!(
                "discount {} is outside [0, 1)",
                gamma
            )));
        }
        Ok(Self { gamma, steps })
    }

    /// Discount factor.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Maximum number of rollout steps.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_new() {
        let t = Transition::new("s1", -1.0);
        assert_eq!(t.state, "s1");
        assert_eq!(t.reward, -1.0);
    }

    #[test]
    fn test_horizon_boundary_is_minimal() {
        let (gamma, epsilon, r_max) = (0.9, 0.01, 1.0);
        let horizon = Horizon::from_tolerance(gamma, epsilon, r_max).unwrap();
        let h = horizon.steps();

        assert!(h > 0);
        assert!(truncation_bound(gamma, r_max, h) <= epsilon);
        assert!(truncation_bound(gamma, r_max, h - 1) > epsilon);
    }

    #[test]
    fn test_horizon_boundary_across_parameters() {
        for &gamma in &[0.5, 0.9, 0.95, 0.99] {
            for &epsilon in &[1.0, 0.1, 0.001] {
                for &r_max in &[1.0, 10.0, 100.0] {
                    let h = Horizon::from_tolerance(gamma, epsilon, r_max)
                        .unwrap()
                        .steps();
                    assert!(truncation_bound(gamma, r_max, h) <= epsilon);
                    if h > 0 {
                        assert!(truncation_bound(gamma, r_max, h - 1) > epsilon);
                    }
                }
            }
        }
    }

    #[test]
    fn test_horizon_zero_reward_bound() {
        let horizon = Horizon::from_tolerance(0.99, 0.01, 0.0).unwrap();
        assert_eq!(horizon.steps(), 0);
    }

    #[test]
    fn test_horizon_zero_discount() {
        let horizon = Horizon::from_tolerance(0.0, 0.01, 5.0).unwrap();
        assert_eq!(horizon.steps(), 1);
        assert_eq!(horizon.gamma(), 0.0);
    }

    #[test]
    fn test_horizon_invalid_arguments() {
        assert!(Horizon::from_tolerance(1.0, 0.01, 1.0).is_err());
        assert!(Horizon::from_tolerance(-0.1, 0.01, 1.0).is_err());
        assert!(Horizon::from_tolerance(f64::NAN, 0.01, 1.0).is_err());
        assert!(Horizon::from_tolerance(0.9, 0.0, 1.0).is_err());
        assert!(Horizon::from_tolerance(0.9, 0.01, -1.0).is_err());
        assert!(Horizon::fixed(1.5, 10).is_err());
    }

    #[test]
    fn test_horizon_fixed() {
        let horizon = Horizon::fixed(0.5, 3).unwrap();
        assert_eq!(horizon.steps(), 3);
        assert_eq!(horizon.gamma(), 0.5);
    }
}
