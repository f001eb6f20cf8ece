//! Builds the model of an instance and turns the solver's answer into a [`Schedule`].
use std::fmt::Display;
use std::fmt::Formatter;

use itertools::iproduct;
use log::debug;
use log::info;
use rota_core::engine::SolveParameters;
use rota_core::engine::Solver;
use rota_core::model::Model;
use rota_core::model::ValueSelection;
use rota_core::objective::Objective;
use rota_core::objective::ObjectiveBuilder;
use rota_core::objective::PenaltyReport;
use rota_core::results::OptimisationResult;
use rota_core::results::Solution;
use rota_core::termination::TerminationCondition;

use crate::aggregates::Aggregates;
use crate::aggregates::Works;
use crate::config::RotaConfig;
use crate::error::RotaError;
use crate::instance::Instance;
use crate::rules::compile_rules;
use crate::rules::RuleContext;
use crate::schedule::Schedule;

/// The compiled model of an instance: its variables, its constraints and the objective.
#[derive(Debug)]
pub struct Scheduler {
    instance: Instance,
    model: Model,
    objective: Objective,
    works: Works,
    aggregates: Aggregates,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// The search stopped before the schedule was proven optimal.
    Feasible,
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible, not proven optimal"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SolvedRota {
    pub schedule: Schedule,
    pub report: PenaltyReport,
    pub status: SolveStatus,
    pub solution: Solution,
}

impl Scheduler {
    pub fn new(instance: Instance, config: &RotaConfig) -> Result<Scheduler, RotaError> {
        let mut model = Model::default();
        let mut objective = ObjectiveBuilder::default();
        let works = Works::new(&mut model, &instance);
        let aggregates = Aggregates::new(&mut model, &instance, &works);

        // Fill the shifts day by day, trying the staff in order.
        model.add_decision_strategy(
            iproduct!(
                0..instance.num_days(),
                0..instance.num_shifts(),
                0..instance.num_staff()
            )
            .map(|(day, shift, staff)| works.get(staff, day, shift).variable()),
            ValueSelection::Max,
        );

        let mut context = RuleContext {
            model: &mut model,
            objective: &mut objective,
            works: &works,
            aggregates: &aggregates,
            instance: &instance,
            priorities: config.priorities,
            fairness_weight: config.fairness_weight,
        };
        compile_rules(&mut context, config)?;

        info!(
            "Built the model of {instance}: {} variables, {} constraints, {} penalty terms",
            model.num_variables(),
            model.num_constraints(),
            objective.len()
        );

        Ok(Scheduler {
            instance,
            model,
            objective: objective.build(),
            works,
            aggregates,
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn works(&self) -> &Works {
        &self.works
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    /// Looks for the schedule with the lowest total penalty.
    pub fn solve<T: TerminationCondition + Clone + Send>(
        &self,
        parameters: SolveParameters,
        termination: T,
    ) -> Result<SolvedRota, RotaError> {
        debug!("Solving with {parameters:?}");
        let (solution, status) =
            match Solver::new(&self.model, parameters).minimise(&self.objective, termination) {
                OptimisationResult::Optimal(solution) => (solution, SolveStatus::Optimal),
                OptimisationResult::Satisfiable(solution) => (solution, SolveStatus::Feasible),
                OptimisationResult::Unsatisfiable => return Err(RotaError::Infeasible),
                OptimisationResult::Unknown => return Err(RotaError::NoSolutionFound),
            };

        let report = self.objective.report(&solution);
        info!("Found a {status} schedule with penalty {}", report.total);
        Ok(SolvedRota {
            schedule: Schedule::from_solution(&self.instance, &self.works, &solution),
            report,
            status,
            solution,
        })
    }
}
