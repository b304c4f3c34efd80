//! Dirichlet belief over the outcome of each move.
//!
//! For every intended move the belief stores one Dirichlet count per
//! outcome move. A hypothesis fixes one categorical distribution per
//! intended move.

use crate::moves::Move;
use bamcp_core::{BamcpError, Belief, Result, UpdatableBelief};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Gamma};

type Table = [[f64; Move::COUNT]; Move::COUNT];

/// Count placed on the believed outcome by [`DirichletBelief::confident`].
const CONFIDENT_COUNT: f64 = 50.0;

/// Kullback-Leibler divergence `KL(p || q)` in nats.
///
/// Zero-probability terms of `p` contribute nothing; a zero in `q` where
/// `p` has mass gives infinity.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            if pi <= 0.0 {
                0.0
            } else if qi <= 0.0 {
                f64::INFINITY
            } else {
                pi * (pi / qi).ln()
            }
        })
        .sum()
}

/// An observed transition: the move intended and the move that happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Outcome {
    pub action: Move,
    pub result: Move,
}

/// Dirichlet counts indexed by `[intended move][outcome move]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DirichletBelief {
    counts: Table,
}

impl DirichletBelief {
    /// Uniform prior: one count per outcome.
    pub fn uniform() -> Self {
        Self::symmetric(1.0)
    }

    /// Symmetric prior with the same count everywhere.
    pub fn symmetric(alpha: f64) -> Self {
        Self {
            counts: [[alpha; Move::COUNT]; Move::COUNT],
        }
    }

    /// Belief that every move almost surely does what it says.
    pub fn confident() -> Self {
        let mut counts = [[1.0; Move::COUNT]; Move::COUNT];
        for (i, row) in counts.iter_mut().enumerate() {
            row[i] = CONFIDENT_COUNT;
        }
        Self { counts }
    }

    /// Explicit counts.
    ///
    /// # Errors
    /// Returns `BamcpError::InconsistentBelief` if any count is negative or
    /// not finite, or a move has no mass at all.
    pub fn from_counts(counts: Table) -> Result<Self> {
        let belief = Self { counts };
        belief.validate()?;
        Ok(belief)
    }

    /// Counts for the outcomes of `action`.
    pub fn counts(&self, action: Move) -> &[f64; Move::COUNT] {
        &self.counts[action.index()]
    }

    /// Posterior predictive outcome distribution of `action`.
    pub fn predictive(&self, action: Move) -> Result<[f64; Move::COUNT]> {
        let counts = self.counts(action);
        let total = Self::total_mass(action, counts)?;
        Ok(counts.map(|c| c / total))
    }

    /// Sum over moves of `KL(self_a || posterior_a)` between predictive
    /// distributions.
    pub fn information_gain(&self, posterior: &Self) -> Result<f64> {
        Move::ALL.iter().try_fold(0.0, |acc, &mv| {
            let prior = self.predictive(mv)?;
            let post = posterior.predictive(mv)?;
            Ok(acc + kl_divergence(&prior, &post))
        })
    }

    fn total_mass(action: Move, counts: &[f64; Move::COUNT]) -> Result<f64> {
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(BamcpError::InconsistentBelief(format!(
                "counts {:?} for {} must be finite and non-negative",
                counts, action
            )));
        }
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return Err(BamcpError::InconsistentBelief(format!(
                "counts for {} have no mass",
                action
            )));
        }
        Ok(total)
    }

    fn validate(&self) -> Result<()> {
        for mv in Move::ALL {
            Self::total_mass(mv, self.counts(mv))?;
        }
        Ok(())
    }
}

impl Default for DirichletBelief {
    fn default() -> Self {
        Self::uniform()
    }
}

impl Belief for DirichletBelief {
    type Hypothesis = TransitionHypothesis;

    /// Draw one categorical per move via normalised Gamma variates.
    ///
    /// Zero counts stay impossible outcomes.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TransitionHypothesis> {
        let mut probabilities = [[0.0; Move::COUNT]; Move::COUNT];

        for mv in Move::ALL {
            let counts = self.counts(mv);
            Self::total_mass(mv, counts)?;

            let row = &mut probabilities[mv.index()];
            for (p, &alpha) in row.iter_mut().zip(counts) {
                if alpha > 0.0 {
                    let gamma = Gamma::new(alpha, 1.0).map_err(|e| {
                        BamcpError::InconsistentBelief(format!(
                            "count {} for {}: {}",
                            alpha, mv, e
                        ))
                    })?;
                    *p = gamma.sample(rng);
                }
            }

            let total: f64 = row.iter().sum();
            if total.is_nan() || total <= 0.0 {
                return Err(BamcpError::InconsistentBelief(format!(
                    "sampled outcome weights for {} sum to {}",
                    mv, total
                )));
            }
            for p in row.iter_mut() {
                *p /= total;
            }
        }

        Ok(TransitionHypothesis { probabilities })
    }
}

impl UpdatableBelief for DirichletBelief {
    type Observation = Outcome;

    fn update(&mut self, outcome: Outcome) -> Result<()> {
        self.counts[outcome.action.index()][outcome.result.index()] += 1.0;
        Ok(())
    }
}

/// Outcome probabilities `[intended move][outcome move]` of one sampled model.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionHypothesis {
    probabilities: Table,
}

impl TransitionHypothesis {
    /// Hypothesis given explicitly.
    ///
    /// # Errors
    /// Returns `BamcpError::InconsistentBelief` if a row is negative,
    /// non-finite, or does not sum to a positive total.
    pub fn new(probabilities: Table) -> Result<Self> {
        for mv in Move::ALL {
            DirichletBelief::total_mass(mv, &probabilities[mv.index()])?;
        }
        Ok(Self { probabilities })
    }

    /// Moves always do what they say.
    pub fn deterministic() -> Self {
        let mut probabilities = [[0.0; Move::COUNT]; Move::COUNT];
        for (i, row) in probabilities.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { probabilities }
    }

    /// Outcome distribution for `action`.
    pub fn probabilities(&self, action: Move) -> &[f64; Move::COUNT] {
        &self.probabilities[action.index()]
    }

    /// Draw the outcome move of `action`.
    pub fn sample_outcome<R: Rng + ?Sized>(&self, action: Move, rng: &mut R) -> Result<Move> {
        let weights = WeightedIndex::new(self.probabilities(action)).map_err(|e| {
            BamcpError::InconsistentBelief(format!("outcome weights for {}: {}", action, e))
        })?;
        Move::from_index(weights.sample(rng)).ok_or_else(|| {
            BamcpError::InconsistentBelief(format!("no outcome slot for {}", action))
        })
    }
}
