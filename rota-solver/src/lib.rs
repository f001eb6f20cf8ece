//! # Rota
//! Builds monthly staff rosters. An [`instance::Instance`] describes the staff, the shifts to cover
//! and the calendar; a [`config::RotaConfig`] selects and parameterises the scheduling rules. The
//! [`scheduler::Scheduler`] compiles both into a constraint model with a penalty objective and
//! solves it with [`rota_core`].
//!
//! ```
//! # use rota_solver::config::{Cost, Priority, RotaConfig};
//! # use rota_solver::instance::*;
//! # use rota_solver::rules::Rule;
//! # use rota_solver::scheduler::Scheduler;
//! # use rota_core::engine::SolveParameters;
//! # use rota_core::termination::Indefinite;
//! let instance = Instance::new(
//!     vec![Staff::named("Ann"), Staff::named("Bo")],
//!     vec![Shift::new("early", (7, 0), 480, ShiftCategory::Day)],
//!     Calendar::new(Weekday::Monday, 4),
//!     vec![Request::day_off(0, 1, Cost::Priority(Priority::Highest))],
//! )
//! .unwrap();
//! let config = RotaConfig::default().only([Rule::AllShiftsTaken, Rule::ApplyRequests]);
//!
//! let rota = Scheduler::new(instance, &config)
//!     .unwrap()
//!     .solve(SolveParameters::default(), Indefinite)
//!     .unwrap();
//!
//! assert_eq!(rota.schedule.shift(0, 1), None);
//! assert_eq!(rota.schedule.staff_on(1, 0), Some(1));
//! assert_eq!(rota.report.total, 0);
//! ```
pub mod aggregates;
pub mod config;
pub mod error;
pub mod instance;
pub mod rules;
pub mod schedule;
pub mod scheduler;
