//! Small domains used to validate the planner.
//!
//! - `TwoDoors`: fully known, one decision, then terminal
//! - `BernoulliBandit`: unknown arm probabilities with a Beta belief,
//!   the smallest domain where root sampling matters

pub mod bandit;
pub mod doors;

pub use bandit::{BanditState, BernoulliBandit, BetaBelief, Pull};
pub use doors::{Door, TwoDoors, TwoDoorsState};
