//! Shared setup for the integration tests of the scheduler.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::time::Duration;

use rota_core::checker;
use rota_core::engine::SolveParameters;
use rota_core::engine::Solver;
use rota_core::model::Model;
use rota_core::objective::Objective;
use rota_core::objective::ObjectiveBuilder;
use rota_core::results::OptimisationResult;
use rota_core::results::SatisfactionResult;
use rota_core::results::Solution;
use rota_core::termination::Indefinite;
use rota_solver::aggregates::Aggregates;
use rota_solver::aggregates::Works;
use rota_solver::config::RotaConfig;
use rota_solver::instance::Calendar;
use rota_solver::instance::Instance;
use rota_solver::instance::Request;
use rota_solver::instance::Shift;
use rota_solver::instance::ShiftCategory;
use rota_solver::instance::Staff;
use rota_solver::instance::Weekday;
use rota_solver::rules::compile_rules;
use rota_solver::rules::RuleContext;
use rota_solver::schedule::Schedule;
use wait_timeout::ChildExt;

/// Staff named "Staff 0", "Staff 1", ...
pub(crate) fn staff(count: usize) -> Vec<Staff> {
    (0..count)
        .map(|index| Staff::named(format!("Staff {index}")))
        .collect()
}

pub(crate) fn day_shift() -> Shift {
    Shift::new("0700 - 1500", (7, 0), 480, ShiftCategory::Day)
}

pub(crate) fn late_shift() -> Shift {
    Shift::new("1800 - 0200", (18, 0), 480, ShiftCategory::Late)
}

pub(crate) fn midnight_shift() -> Shift {
    Shift::new("2359 - 0700", (23, 59), 421, ShiftCategory::Midnight)
}

pub(crate) fn instance(
    staff: Vec<Staff>,
    shifts: Vec<Shift>,
    num_days: usize,
    requests: Vec<Request>,
) -> Instance {
    Instance::new(staff, shifts, Calendar::new(Weekday::Monday, num_days), requests)
        .expect("valid instance")
}

/// A model built the way the scheduler builds it, which tests can constrain further before solving.
#[derive(Debug)]
pub(crate) struct Compiled {
    pub(crate) instance: Instance,
    pub(crate) model: Model,
    pub(crate) objective: Objective,
    pub(crate) works: Works,
    pub(crate) aggregates: Aggregates,
}

pub(crate) fn compile(instance: Instance, config: &RotaConfig) -> Compiled {
    let mut model = Model::default();
    let mut objective = ObjectiveBuilder::default();
    let works = Works::new(&mut model, &instance);
    let aggregates = Aggregates::new(&mut model, &instance, &works);

    let mut context = RuleContext {
        model: &mut model,
        objective: &mut objective,
        works: &works,
        aggregates: &aggregates,
        instance: &instance,
        priorities: config.priorities,
        fairness_weight: config.fairness_weight,
    };
    compile_rules(&mut context, config).expect("valid rules");

    Compiled {
        instance,
        model,
        objective: objective.build(),
        works,
        aggregates,
    }
}

impl Compiled {
    /// Fixes the shift of `staff` on every day; `None` is a day off.
    pub(crate) fn fix(&mut self, staff: usize, shifts: &[Option<usize>]) {
        for (day, &shift) in shifts.iter().enumerate() {
            let literals = (0..self.instance.num_shifts())
                .map(|index| {
                    let literal = self.works.get(staff, day, index);
                    if Some(index) == shift {
                        literal
                    } else {
                        !literal
                    }
                })
                .collect::<Vec<_>>();
            self.model
                .add_bool_and(literals)
                .with_name(format!("fixed staff {staff} on day {day}"))
                .post();
        }
    }

    pub(crate) fn is_feasible(&self) -> bool {
        match Solver::new(&self.model, SolveParameters::default()).satisfy(Indefinite) {
            SatisfactionResult::Satisfiable(solution) => {
                checker::verify(&self.model, &solution).expect("solution satisfies the model");
                true
            }
            SatisfactionResult::Unsatisfiable => false,
            SatisfactionResult::Unknown => panic!("the search should be exhaustive"),
        }
    }

    /// Solves to optimality and returns the solution with its total penalty.
    pub(crate) fn minimise(&self) -> (Solution, i64) {
        match Solver::new(&self.model, SolveParameters::default())
            .minimise(&self.objective, Indefinite)
        {
            OptimisationResult::Optimal(solution) => {
                checker::verify(&self.model, &solution).expect("solution satisfies the model");
                let total = self.objective.report(&solution).total;
                (solution, total)
            }
            other => panic!("expected an optimal solution, got {other:?}"),
        }
    }

    pub(crate) fn schedule(&self, solution: &Solution) -> Schedule {
        Schedule::from_solution(&self.instance, &self.works, solution)
    }
}

/// Every (day, shift) is worked by exactly one staff member.
pub(crate) fn assert_every_shift_covered(instance: &Instance, schedule: &Schedule) {
    for day in 0..instance.num_days() {
        for shift in 0..instance.num_shifts() {
            let covering = (0..instance.num_staff())
                .filter(|&staff| schedule.shift(staff, day) == Some(shift))
                .count();
            assert_eq!(covering, 1, "shift {shift} on day {day} has {covering} staff");
        }
    }
}

/// No staff member works more than one shift on any day.
pub(crate) fn assert_no_double_booking(instance: &Instance, works: &Works, solution: &Solution) {
    for staff in 0..instance.num_staff() {
        for day in 0..instance.num_days() {
            let worked = works
                .on_day(staff, day)
                .iter()
                .filter(|&&literal| solution.literal_value(literal))
                .count();
            assert!(worked <= 1, "staff {staff} works {worked} shifts on day {day}");
        }
    }
}

/// The length of the longest run of worked days of `staff`.
pub(crate) fn longest_run(schedule: &Schedule, staff: usize) -> usize {
    schedule
        .shifts_of(staff)
        .split(Option::is_none)
        .map(<[Option<usize>]>::len)
        .max()
        .unwrap_or(0)
}

pub(crate) fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("instances")
        .join(name)
}

/// Runs the binary to completion and captures its output.
pub(crate) fn run_solver(args: &[&str]) -> Output {
    const TEST_TIMEOUT: Duration = Duration::from_secs(60);

    let mut child = Command::new(env!("CARGO_BIN_EXE_rota-solver"))
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run solver.");

    match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => {
            let _ = child.kill();
            panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs())
        }
        Ok(Some(_)) => {}
        Err(e) => panic!("error starting solver: {e}"),
    }

    child.wait_with_output().expect("Failed to collect solver output.")
}
