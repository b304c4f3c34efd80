//! BAMCP Grid - A bounded 2D grid with unknown move dynamics
//!
//! An agent walks on a grid towards a goal cell. Every move lands on one of
//! four outcome moves with unknown probabilities; the agent's belief about
//! them is a Dirichlet distribution per move, carried inside the state.

mod belief;
mod moves;
mod state;
mod world;

pub use belief::{kl_divergence, DirichletBelief, Outcome, TransitionHypothesis};
pub use moves::{Cell, Move};
pub use state::{GridState, Step};
pub use world::{GridConfig, GridWorld};
