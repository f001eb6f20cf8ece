use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::info;
use log::warn;
use pumpkin_solver::branching::branchers::dynamic_brancher::DynamicBrancher;

use super::translation::Infeasible;
use super::translation::LoweredModel;
use super::translation::SolveOutcome;
use crate::checker;
use crate::model::Model;
use crate::objective::Objective;
use crate::results::OptimisationResult;
use crate::results::SatisfactionResult;
use crate::results::Solution;
use crate::statistics::statistic_logging::log_statistic_postfix;
use crate::statistics::statistic_logging::should_log_statistics;
use crate::statistics::SearchStatistics;
use crate::statistics::StatisticLogger;
use crate::termination::Combinator;
use crate::termination::TerminationCondition;
use crate::termination::TimeBudget;

/// The options of a [`Solver`].
#[derive(Clone, Debug)]
pub struct SolveParameters {
    /// The wall-clock budget shared by all workers; `None` searches until a conclusion is reached.
    pub time_limit: Option<Duration>,
    /// The number of search workers which run in parallel.
    pub workers: usize,
    /// Worker `i` seeds its random generator with `random_seed + i`.
    pub random_seed: u64,
}

impl Default for SolveParameters {
    fn default() -> Self {
        SolveParameters {
            time_limit: None,
            workers: 1,
            random_seed: 42,
        }
    }
}

/// Solves a [`Model`] with a portfolio of Pumpkin solvers, one per worker.
///
/// Optimisation is linear SAT-UNSAT: every solution tightens an upper bound on the objective,
/// shared between the workers, until a worker proves that no better solution exists.
#[derive(Debug)]
pub struct Solver<'model> {
    model: &'model Model,
    parameters: SolveParameters,
}

/// Raised by any worker to stop all of them.
#[derive(Clone, Copy, Debug)]
struct SharedStop<'a>(&'a AtomicBool);

impl TerminationCondition for SharedStop<'_> {
    fn should_stop(&mut self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct WorkerOutcome {
    best: Option<(i64, Solution)>,
    /// The worker ruled out everything below its last bound.
    proven: bool,
    statistics: SearchStatistics,
}

type WorkerTermination<'a, T> = Combinator<Combinator<Option<TimeBudget>, T>, SharedStop<'a>>;

impl<'model> Solver<'model> {
    pub fn new(model: &'model Model, parameters: SolveParameters) -> Self {
        Solver { model, parameters }
    }

    /// Finds a solution which minimises `objective`.
    pub fn minimise<T: TerminationCondition + Clone + Send>(
        &self,
        objective: &Objective,
        termination: T,
    ) -> OptimisationResult {
        let incumbent = AtomicI64::new(i64::MAX);
        let outcomes = self.run_portfolio(
            termination,
            Some(objective),
            |lowered, brancher, termination, stop, worker| {
                let mut best: Option<(i64, Solution)> = None;
                let mut bound = i64::MAX;
                let proven = loop {
                    let shared = incumbent.load(Ordering::SeqCst);
                    if shared < bound {
                        bound = shared;
                        if lowered.bound_objective(bound - 1) == Err(Infeasible) {
                            stop.store(true, Ordering::Relaxed);
                            break true;
                        }
                    }

                    match lowered.solve(brancher, termination) {
                        SolveOutcome::Solution(solution) => {
                            rota_assert_moderate!(checker::verify(self.model, &solution).is_ok());
                            let value = objective.evaluate(&solution);
                            let _ = incumbent.fetch_min(value, Ordering::SeqCst);
                            if best.as_ref().map_or(true, |(best, _)| value < *best) {
                                info!("Worker {worker} found a solution with penalty {value}");
                                best = Some((value, solution));
                            }
                        }
                        SolveOutcome::Exhausted => {
                            stop.store(true, Ordering::Relaxed);
                            break true;
                        }
                        SolveOutcome::Stopped => break false,
                    }
                };
                (best, proven)
            },
        );

        let proven = outcomes.iter().any(|outcome| outcome.proven);
        let best = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.best)
            .min_by_key(|(value, _)| *value);

        match (best, proven) {
            (Some((_, solution)), true) => OptimisationResult::Optimal(solution),
            (None, true) => OptimisationResult::Unsatisfiable,
            (Some((value, solution)), false) => {
                warn!("The search stopped before proving the penalty {value} optimal");
                OptimisationResult::Satisfiable(solution)
            }
            (None, false) => {
                warn!("The search stopped before finding a solution");
                OptimisationResult::Unknown
            }
        }
    }

    /// Finds any solution of the model.
    pub fn satisfy<T: TerminationCondition + Clone + Send>(
        &self,
        termination: T,
    ) -> SatisfactionResult {
        let outcomes = self.run_portfolio(
            termination,
            None,
            |lowered, brancher, termination, stop, worker| match lowered
                .solve(brancher, termination)
            {
                SolveOutcome::Solution(solution) => {
                    rota_assert_moderate!(checker::verify(self.model, &solution).is_ok());
                    info!("Worker {worker} found a solution");
                    stop.store(true, Ordering::Relaxed);
                    (Some((0, solution)), false)
                }
                SolveOutcome::Exhausted => {
                    stop.store(true, Ordering::Relaxed);
                    (None, true)
                }
                SolveOutcome::Stopped => (None, false),
            },
        );

        let proven = outcomes.iter().any(|outcome| outcome.proven);
        match outcomes.into_iter().find_map(|outcome| outcome.best) {
            Some((_, solution)) => SatisfactionResult::Satisfiable(solution),
            None if proven => SatisfactionResult::Unsatisfiable,
            None => {
                warn!("The search stopped before finding a solution");
                SatisfactionResult::Unknown
            }
        }
    }

    /// Lowers the model once per worker and runs `work` on every lowered copy in parallel.
    ///
    /// A model which is already inconsistent when it is posted counts as proven without a
    /// solution.
    fn run_portfolio<T, Work>(
        &self,
        termination: T,
        objective: Option<&Objective>,
        work: Work,
    ) -> Vec<WorkerOutcome>
    where
        T: TerminationCondition + Clone + Send,
        Work: Fn(
                &mut LoweredModel,
                &mut DynamicBrancher,
                &mut WorkerTermination<'_, T>,
                &AtomicBool,
                usize,
            ) -> (Option<(i64, Solution)>, bool)
            + Sync,
    {
        let stop = AtomicBool::new(false);
        let time_budget = self.parameters.time_limit.map(TimeBudget::starting_now);
        let workers = self.parameters.workers.max(1);
        debug!(
            "Solving {} variables and {} constraints with {workers} worker(s)",
            self.model.num_variables(),
            self.model.num_constraints()
        );

        let outcomes = std::thread::scope(|scope| {
            let handles = (0..workers)
                .map(|worker| {
                    let termination = termination.clone();
                    let stop = &stop;
                    let work = &work;
                    scope.spawn(move || {
                        let seed = self.parameters.random_seed.wrapping_add(worker as u64);
                        let expression = objective.map(Objective::expression);
                        let Ok(mut lowered) = LoweredModel::new(self.model, seed, expression)
                        else {
                            stop.store(true, Ordering::Relaxed);
                            return WorkerOutcome {
                                best: None,
                                proven: true,
                                statistics: SearchStatistics::default(),
                            };
                        };
                        let mut brancher = lowered.brancher(self.model);
                        let mut termination = Combinator::new(
                            Combinator::new(time_budget, termination),
                            SharedStop(stop),
                        );
                        let (best, proven) =
                            work(&mut lowered, &mut brancher, &mut termination, stop, worker);
                        WorkerOutcome {
                            best,
                            proven,
                            statistics: lowered.statistics(),
                        }
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Vec<_>>()
        });

        if should_log_statistics() {
            for (worker, outcome) in outcomes.iter().enumerate() {
                outcome
                    .statistics
                    .log(&StatisticLogger::new(["worker".to_owned(), worker.to_string()]));
            }
            log_statistic_postfix();
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueSelection;
    use crate::objective::ObjectiveBuilder;
    use crate::termination::Indefinite;
    use crate::variables::LinearExpr;
    use crate::variables::Literal;

    #[test]
    fn minimise_proves_the_cheapest_assignment_optimal() {
        let mut model = Model::default();
        let x = model.new_int_var(0, 10, "x");
        let y = model.new_int_var(0, 10, "y");
        model
            .add_linear(LinearExpr::from(x) + y, 7, i64::MAX)
            .post();
        let mut objective = ObjectiveBuilder::default();
        objective.add_term("x", x, 3);
        objective.add_term("y", y, 2);
        let objective = objective.build();

        let result = Solver::new(&model, SolveParameters::default()).minimise(&objective, Indefinite);

        let OptimisationResult::Optimal(solution) = result else {
            panic!("expected an optimal solution, got {result:?}");
        };
        assert_eq!(objective.evaluate(&solution), 14);
    }

    #[test]
    fn workers_agree_on_the_optimum() {
        let mut model = Model::default();
        let literals = (0..6)
            .map(|i| model.new_bool_var(format!("b{i}")))
            .collect::<Vec<_>>();
        model
            .add_linear(LinearExpr::sum(literals.iter().copied()), 3, 6)
            .post();
        let mut objective = ObjectiveBuilder::default();
        for (i, &literal) in literals.iter().enumerate() {
            objective.add_term(format!("b{i}"), literal, i as i64 + 1);
        }
        let objective = objective.build();
        let parameters = SolveParameters {
            workers: 3,
            ..SolveParameters::default()
        };

        let result = Solver::new(&model, parameters).minimise(&objective, Indefinite);

        let OptimisationResult::Optimal(solution) = result else {
            panic!("expected an optimal solution, got {result:?}");
        };
        assert_eq!(objective.evaluate(&solution), 1 + 2 + 3);
    }

    #[test]
    fn decisions_are_propagated_before_the_next_decision() {
        let mut model = Model::default();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let c = model.new_bool_var("c");
        model.add_bool_or([!a, !b]).post();
        model.add_bool_or([!b, !c]).post();
        model.add_decision_strategy([a, b, c], ValueSelection::Max);

        let result = Solver::new(&model, SolveParameters::default()).satisfy(Indefinite);

        let SatisfactionResult::Satisfiable(solution) = result else {
            panic!("expected a solution, got {result:?}");
        };
        assert!(checker::verify(&model, &solution).is_ok());
        assert!(solution.bool_value(a));
        assert!(!solution.bool_value(b));
    }

    #[test]
    fn infeasible_models_are_unsatisfiable() {
        let mut model = Model::default();
        let a = model.new_bool_var("a");
        model.add_bool_and([a]).post();
        model.add_bool_and([!Literal::from(a)]).post();

        let solver = Solver::new(&model, SolveParameters::default());

        assert!(matches!(
            solver.satisfy(Indefinite),
            SatisfactionResult::Unsatisfiable
        ));
        assert!(matches!(
            solver.minimise(&ObjectiveBuilder::default().build(), Indefinite),
            OptimisationResult::Unsatisfiable
        ));
    }

    #[test]
    fn infeasibility_found_by_search_is_unsatisfiable() {
        let mut model = Model::default();
        let literals = (0..4)
            .map(|i| model.new_bool_var(format!("b{i}")))
            .collect::<Vec<_>>();
        model
            .add_linear(LinearExpr::sum(literals.iter().copied()), 2, 2)
            .post();
        model
            .add_linear(LinearExpr::sum(literals.iter().copied()), 3, 4)
            .only_enforce_if([literals[0]])
            .post();
        model
            .add_linear(LinearExpr::sum(literals.iter().copied()), 3, 4)
            .only_enforce_if([!Literal::from(literals[0])])
            .post();

        assert!(matches!(
            Solver::new(&model, SolveParameters::default()).satisfy(Indefinite),
            SatisfactionResult::Unsatisfiable
        ));
    }

    #[test]
    fn zero_time_limit_stops_immediately() {
        let mut model = Model::default();
        let _ = model.new_bool_var("a");
        let parameters = SolveParameters {
            time_limit: Some(Duration::ZERO),
            ..SolveParameters::default()
        };

        assert!(matches!(
            Solver::new(&model, parameters).satisfy(Indefinite),
            SatisfactionResult::Unknown
        ));
    }
}
