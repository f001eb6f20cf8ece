use log::debug;
use log::trace;
use pumpkin_solver::branching::branchers::dynamic_brancher::DynamicBrancher;
use pumpkin_solver::branching::branchers::independent_variable_value_brancher::IndependentVariableValueBrancher;
use pumpkin_solver::branching::value_selection::InDomainMin;
use pumpkin_solver::branching::variable_selection::InputOrder;
use pumpkin_solver::branching::Brancher;
use pumpkin_solver::constraints;
use pumpkin_solver::constraints::Constraint;
use pumpkin_solver::options::SolverOptions;
use pumpkin_solver::predicate;
use pumpkin_solver::proof::ConstraintTag;
use pumpkin_solver::rand::rngs::SmallRng;
use pumpkin_solver::rand::SeedableRng;
use pumpkin_solver::results::ProblemSolution;
use pumpkin_solver::results::SatisfactionResult;
use pumpkin_solver::termination::TerminationCondition;
use pumpkin_solver::variables::AffineView;
use pumpkin_solver::variables::DomainId;
use pumpkin_solver::variables::TransformableVariable;
use pumpkin_solver::Solver;

use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::model::ConstraintKind;
use crate::model::Model;
use crate::model::ValueSelection;
use crate::model::VariableInfo;
use crate::results::Solution;
use crate::statistics::SearchStatistics;
use crate::variables::LinearExpr;
use crate::variables::Literal;
use crate::variables::VariableId;

type SolverLiteral = pumpkin_solver::variables::Literal;
type View = AffineView<DomainId>;

/// Posting a constraint emptied a domain before any search took place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Infeasible;

#[derive(Clone, Copy, Debug)]
enum Handle {
    Literal(SolverLiteral),
    Integer(DomainId),
}

#[derive(Clone, Copy, Debug)]
struct LoweredVariable {
    handle: Handle,
    lower_bound: i64,
    upper_bound: i64,
}

impl LoweredVariable {
    fn view(&self) -> View {
        match self.handle {
            Handle::Literal(literal) => literal.get_integer_variable(),
            Handle::Integer(domain) => domain.scaled(1),
        }
    }
}

/// The outcome of a single call to [`LoweredModel::solve`].
#[derive(Debug)]
pub(crate) enum SolveOutcome {
    Solution(Solution),
    /// No assignment satisfies the constraints posted so far.
    Exhausted,
    /// The termination condition triggered.
    Stopped,
}

/// A [`Model`] posted to a Pumpkin [`Solver`].
///
/// Model variables with a domain inside `[0, 1]` become solver literals, every other variable a
/// bounded integer. Expressions which are not a single scaled variable get an auxiliary variable
/// defined by an unconditional equality.
pub(crate) struct LoweredModel {
    solver: Solver,
    variables: KeyedVec<VariableId, LoweredVariable>,
    objective: Option<View>,
    constraint_tag: ConstraintTag,
    statistics: SearchStatistics,
}

impl LoweredModel {
    pub(crate) fn new(
        model: &Model,
        seed: u64,
        objective: Option<&LinearExpr>,
    ) -> Result<LoweredModel, Infeasible> {
        let mut solver = Solver::with_options(SolverOptions {
            random_generator: SmallRng::seed_from_u64(seed),
            ..Default::default()
        });
        let constraint_tag = solver.new_constraint_tag();
        let mut lowered = LoweredModel {
            solver,
            variables: KeyedVec::default(),
            objective: None,
            constraint_tag,
            statistics: SearchStatistics::default(),
        };

        for (_, info) in model.variables() {
            let _ = lowered.new_variable(info)?;
        }
        for (id, constraint) in model.constraints() {
            trace!("lowering {id}: {constraint}");
            lowered.add(&constraint.kind, &constraint.enforcement)?;
        }
        if let Some(objective) = objective {
            lowered.objective = Some(lowered.expression(objective)?);
        }
        Ok(lowered)
    }

    pub(crate) fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    /// A brancher which follows the decision strategies of `model` before falling back to the
    /// default search of the solver.
    pub(crate) fn brancher(&self, model: &Model) -> DynamicBrancher {
        let mut seen: HashSet<VariableId> = HashSet::default();
        let ordered = model
            .decision_strategies()
            .iter()
            .flat_map(|strategy| {
                strategy
                    .variables
                    .iter()
                    .map(move |&variable| (variable, strategy.value_selection))
            })
            .filter(|&(variable, _)| seen.insert(variable))
            .map(|(variable, value_selection)| {
                let view = self.variables[variable].view();
                // The smallest value of the negated view is the largest value of the variable.
                match value_selection {
                    ValueSelection::Min => view,
                    ValueSelection::Max => view.scaled(-1),
                }
            })
            .collect::<Vec<_>>();

        let mut branchers: Vec<Box<dyn Brancher>> = vec![];
        if !ordered.is_empty() {
            branchers.push(Box::new(IndependentVariableValueBrancher::new(
                InputOrder::new(&ordered),
                InDomainMin,
            )));
        }
        branchers.push(Box::new(self.solver.default_brancher()));
        DynamicBrancher::new(branchers)
    }

    /// Looks for an assignment which satisfies every constraint and objective bound posted so far.
    pub(crate) fn solve(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> SolveOutcome {
        self.statistics.solve_calls += 1;
        match self.solver.satisfy(brancher, termination) {
            SatisfactionResult::Satisfiable(satisfiable) => {
                let solution = satisfiable.solution();
                let values = self
                    .variables
                    .iter()
                    .map(|variable| i64::from(solution.get_integer_value(variable.view())))
                    .collect::<Vec<_>>();
                self.statistics.solutions += 1;
                SolveOutcome::Solution(Solution::from(values))
            }
            SatisfactionResult::Unsatisfiable(..) => SolveOutcome::Exhausted,
            SatisfactionResult::Unknown(..) => SolveOutcome::Stopped,
        }
    }

    /// Restricts later solves to assignments whose objective is at most `upper_bound`.
    pub(crate) fn bound_objective(&mut self, upper_bound: i64) -> Result<(), Infeasible> {
        let Some(objective) = self.objective else {
            return Ok(());
        };
        let bound = narrow(upper_bound);
        self.solver
            .add_clause([predicate![objective <= bound]], self.constraint_tag)
            .map_err(|_| Infeasible)
    }

    fn new_variable(&mut self, info: &VariableInfo) -> Result<VariableId, Infeasible> {
        let (lower_bound, upper_bound) = (info.lower_bound(), info.upper_bound());
        if lower_bound > upper_bound {
            debug!("{} has an empty domain", info.name());
            return Err(Infeasible);
        }

        let handle = match (lower_bound, upper_bound) {
            (1, 1) => Handle::Literal(self.solver.get_true_literal()),
            (0, 0) => Handle::Literal(self.solver.get_false_literal()),
            (0, 1) => Handle::Literal(self.solver.new_named_literal(info.name())),
            _ => Handle::Integer(self.solver.new_named_bounded_integer(
                narrow(lower_bound),
                narrow(upper_bound),
                info.name(),
            )),
        };
        Ok(self.variables.push(LoweredVariable {
            handle,
            lower_bound,
            upper_bound,
        }))
    }

    fn add(&mut self, kind: &ConstraintKind, enforcement: &[Literal]) -> Result<(), Infeasible> {
        match kind {
            ConstraintKind::BoolOr(literals) => {
                let clause = enforcement
                    .iter()
                    .map(|&literal| !literal)
                    .chain(literals.iter().copied())
                    .map(|literal| self.literal(literal))
                    .collect::<Vec<_>>();
                if clause.is_empty() {
                    return Err(Infeasible);
                }
                self.post(constraints::clause(clause, self.constraint_tag), None)
            }
            ConstraintKind::BoolAnd(literals) => literals.iter().try_for_each(|&literal| {
                self.add(&ConstraintKind::BoolOr(Box::new([literal])), enforcement)
            }),
            ConstraintKind::Linear {
                expression,
                lower_bound,
                upper_bound,
            } => {
                let constant = expression.constant_term();
                let terms = self.terms(expression);
                if terms.is_empty() {
                    if (*lower_bound..=*upper_bound).contains(&constant) {
                        return Ok(());
                    }
                    return self.forbid(enforcement);
                }

                let enforced_by = self.enforced_by(enforcement)?;
                if lower_bound == upper_bound {
                    return self.post(
                        constraints::equals(
                            terms,
                            narrow(upper_bound.saturating_sub(constant)),
                            self.constraint_tag,
                        ),
                        enforced_by,
                    );
                }
                if *upper_bound != i64::MAX {
                    self.post(
                        constraints::less_than_or_equals(
                            terms.clone(),
                            narrow(upper_bound.saturating_sub(constant)),
                            self.constraint_tag,
                        ),
                        enforced_by,
                    )?;
                }
                if *lower_bound != i64::MIN {
                    let negated = terms.iter().map(|term| term.scaled(-1)).collect::<Vec<_>>();
                    self.post(
                        constraints::less_than_or_equals(
                            negated,
                            narrow(constant.saturating_sub(*lower_bound)),
                            self.constraint_tag,
                        ),
                        enforced_by,
                    )?;
                }
                Ok(())
            }
            ConstraintKind::MaxEquality {
                target,
                expressions,
            } => {
                if expressions.is_empty() {
                    return self.forbid(enforcement);
                }
                let target = self.expression(target)?;
                let arguments = expressions
                    .iter()
                    .map(|expression| self.expression(expression))
                    .collect::<Result<Vec<_>, _>>()?;
                let enforced_by = self.enforced_by(enforcement)?;
                self.post(
                    constraints::maximum(arguments, target, self.constraint_tag),
                    enforced_by,
                )
            }
            ConstraintKind::AbsEquality { target, expression } => {
                let target = self.expression(target)?;
                let signed = self.expression(expression)?;
                let enforced_by = self.enforced_by(enforcement)?;
                self.post(
                    constraints::absolute(signed, target, self.constraint_tag),
                    enforced_by,
                )
            }
            ConstraintKind::MultiplicationEquality {
                target,
                left,
                right,
            } => {
                let target = self.expression(target)?;
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                let enforced_by = self.enforced_by(enforcement)?;
                self.post(
                    constraints::times(left, right, target, self.constraint_tag),
                    enforced_by,
                )
            }
        }
    }

    fn post(
        &mut self,
        constraint: impl Constraint,
        enforced_by: Option<SolverLiteral>,
    ) -> Result<(), Infeasible> {
        let result = match enforced_by {
            None => constraint.post(&mut self.solver),
            Some(literal) => constraint.implied_by(&mut self.solver, literal),
        };
        result.map_err(|error| {
            debug!("the model is inconsistent at the root: {error:?}");
            Infeasible
        })
    }

    /// Requires at least one of the enforcement literals to be false.
    fn forbid(&mut self, enforcement: &[Literal]) -> Result<(), Infeasible> {
        self.add(&ConstraintKind::BoolOr(Box::new([])), enforcement)
    }

    /// A single literal which implies the conjunction of `enforcement`.
    fn enforced_by(
        &mut self,
        enforcement: &[Literal],
    ) -> Result<Option<SolverLiteral>, Infeasible> {
        match enforcement {
            [] => Ok(None),
            [literal] => Ok(Some(self.literal(*literal))),
            _ => {
                let conjunction = self.solver.new_literal();
                let clause = enforcement
                    .iter()
                    .map(|&literal| !self.literal(literal))
                    .chain([conjunction])
                    .collect::<Vec<_>>();
                self.post(constraints::clause(clause, self.constraint_tag), None)?;
                Ok(Some(conjunction))
            }
        }
    }

    fn literal(&self, literal: Literal) -> SolverLiteral {
        let solver_literal = match self.variables[literal.variable()].handle {
            Handle::Literal(solver_literal) => solver_literal,
            Handle::Integer(_) => unreachable!("literals are only built over boolean variables"),
        };
        if literal.is_negated() {
            !solver_literal
        } else {
            solver_literal
        }
    }

    fn terms(&self, expression: &LinearExpr) -> Vec<View> {
        expression
            .terms()
            .iter()
            .map(|&(coefficient, variable)| {
                self.variables[variable]
                    .view()
                    .scaled(narrow(coefficient))
            })
            .collect()
    }

    /// A view which equals `expression`.
    fn expression(&mut self, expression: &LinearExpr) -> Result<View, Infeasible> {
        let constant = expression.constant_term();
        if let [(coefficient, variable)] = expression.terms() {
            return Ok(self.variables[*variable]
                .view()
                .scaled(narrow(*coefficient))
                .offset(narrow(constant)));
        }

        let (lower_bound, upper_bound) = expression.terms().iter().fold(
            (constant, constant),
            |(low, high), &(coefficient, variable)| {
                let variable = &self.variables[variable];
                let a = coefficient * variable.lower_bound;
                let b = coefficient * variable.upper_bound;
                (low + a.min(b), high + a.max(b))
            },
        );
        let auxiliary = self
            .solver
            .new_bounded_integer(narrow(lower_bound), narrow(upper_bound));
        if expression.terms().is_empty() {
            return Ok(auxiliary.scaled(1));
        }

        let mut definition = self.terms(expression);
        definition.push(auxiliary.scaled(-1));
        self.post(
            constraints::equals(definition, narrow(-constant), self.constraint_tag),
            None,
        )?;
        Ok(auxiliary.scaled(1))
    }
}

/// Saturates `value` into the range of the solver's domains.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
