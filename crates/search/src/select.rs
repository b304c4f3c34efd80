//! Uniform tie-breaking argmax.

use bamcp_core::{BamcpError, Result};
use rand::Rng;

/// Return a candidate with maximal score, chosen uniformly at random among
/// all candidates attaining that score.
///
/// Single pass with reservoir sampling over the current set of maxima. NaN
/// scores rank below every other score.
///
/// # Errors
/// Returns `BamcpError::EmptyInput` if `candidates` yields nothing.
pub fn rand_max<T, I, F, R>(candidates: I, mut score: F, rng: &mut R) -> Result<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> f64,
    R: Rng + ?Sized,
{
    let mut best: Option<(T, f64)> = None;
    let mut ties = 0u32;

    for candidate in candidates {
        let mut value = score(&candidate);
        if value.is_nan() {
            value = f64::NEG_INFINITY;
        }

        match best.as_ref().map(|(_, v)| *v) {
            Some(best_value) if value < best_value => {}
            Some(best_value) if value == best_value => {
                ties += 1;
                if rng.gen_range(0..ties) == 0 {
                    best = Some((candidate, value));
                }
            }
            _ => {
                ties = 1;
                best = Some((candidate, value));
            }
        }
    }

    best.map(|(candidate, _)| candidate)
        .ok_or(BamcpError::EmptyInput)
}
