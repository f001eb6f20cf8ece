//! A [`TerminationCondition`] is polled by the solver while it explores the model and tells it
//! when to give up, even if no definitive conclusion has been reached. The conditions are the
//! ones Pumpkin ships; [`Solver`](crate::engine::Solver) combines the caller's condition with
//! its own time budget.
pub use pumpkin_solver::termination::*;
