//! # Rota core
//! The constraint layer of the Rota shift scheduler.
//!
//! A scheduling problem is stated as a [`Model`](model::Model) over boolean and integer
//! variables. Sequence rules such as "at most five consecutive working days" or "at least two
//! nights in a row" are compiled into that model by the functions in [`compiler`]: hard rules
//! become constraints, soft rules become violation variables whose cost is collected by an
//! [`ObjectiveBuilder`](objective::ObjectiveBuilder). The finished model is solved by an
//! [`engine::Solver`].
//!
//! # Example
//! ```
//! # use rota_core::compiler::forbid_max;
//! # use rota_core::engine::SolveParameters;
//! # use rota_core::engine::Solver;
//! # use rota_core::model::Model;
//! # use rota_core::results::SatisfactionResult;
//! # use rota_core::sequence::Condition;
//! # use rota_core::termination::Indefinite;
//! # use rota_core::variables::Literal;
//! let mut model = Model::default();
//! let works = (0..7)
//!     .map(|day| Literal::from(model.new_bool_var(format!("works_{day}"))))
//!     .collect::<Vec<_>>();
//!
//! // Never more than three days in a row.
//! forbid_max(&mut model, &works, 3, &Condition::None, "consecutive_days").unwrap();
//! model.add_linear(rota_core::variables::LinearExpr::sum(works.iter()), 5, 7).post();
//!
//! let result = Solver::new(&model, SolveParameters::default()).satisfy(Indefinite);
//! assert!(matches!(result, SatisfactionResult::Satisfiable(_)));
//! ```
#[macro_use]
pub mod asserts;
pub mod checker;
pub mod compiler;
pub mod containers;
pub mod engine;
pub mod error;
pub mod model;
pub mod objective;
pub mod results;
pub mod sequence;
pub mod statistics;
pub mod termination;
pub mod variables;

pub use convert_case;
pub use pumpkin_solver;
