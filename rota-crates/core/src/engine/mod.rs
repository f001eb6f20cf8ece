//! Solves a [`Model`](crate::model::Model) with the Pumpkin constraint solver.
//!
//! Every constraint of the model is lowered onto the constraints Pumpkin provides, and the
//! decision strategies of the model become a brancher which runs before Pumpkin's default search.
//! Optimisation is run by several workers in parallel which share the best objective value found
//! so far.
mod solver;
mod translation;

pub use solver::*;
