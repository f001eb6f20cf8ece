//! The solver-agnostic model: variables, constraints and search hints.
//!
//! The compilers only ever talk to a [`Model`]; it is handed to a
//! [`Solver`](crate::engine::Solver) once it is complete.
//!
//! # Example
//! ```
//! # use rota_core::model::Model;
//! let mut model = Model::default();
//!
//! let a = model.new_bool_var("a");
//! let b = model.new_bool_var("b");
//! let r = model.new_bool_var("r");
//!
//! // r -> (a or b)
//! model.add_bool_or([a, b]).only_enforce_if([r]).post();
//! ```
mod constraint;

pub use constraint::*;

use crate::containers::KeyedVec;
use crate::variables::BoolVar;
use crate::variables::IntVar;
use crate::variables::LinearExpr;
use crate::variables::Literal;
use crate::variables::VariableId;

/// The declaration of a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableInfo {
    lower_bound: i64,
    upper_bound: i64,
    name: String,
}

impl VariableInfo {
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Which value the search tries first for the variables of a [`DecisionStrategy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueSelection {
    #[default]
    Min,
    Max,
}

/// A group of variables the search branches on before the others, in the given order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionStrategy {
    pub variables: Vec<VariableId>,
    pub value_selection: ValueSelection,
}

/// The variables and constraints of a constraint model.
#[derive(Debug, Default)]
pub struct Model {
    variables: KeyedVec<VariableId, VariableInfo>,
    constraints: KeyedVec<ConstraintId, Constraint>,
    decision_strategies: Vec<DecisionStrategy>,
    /// The cached constant literals, indexed by their value.
    constants: [Option<BoolVar>; 2],
}

impl Model {
    /// Create a new variable with the domain `[0, 1]`.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        BoolVar::new(self.new_variable(0, 1, name.into()))
    }

    /// Create a new variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_int_var(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
        name: impl Into<String>,
    ) -> IntVar {
        IntVar::new(self.new_variable(lower_bound, upper_bound, name.into()))
    }

    /// A literal which is fixed to `value`. Repeated calls return the same literal.
    pub fn new_constant(&mut self, value: bool) -> Literal {
        let slot = usize::from(value);
        if let Some(constant) = self.constants[slot] {
            return constant.into();
        }
        let bound = i64::from(value);
        let constant = BoolVar::new(self.new_variable(bound, bound, value.to_string()));
        self.constants[slot] = Some(constant);
        constant.into()
    }

    fn new_variable(&mut self, lower_bound: i64, upper_bound: i64, name: String) -> VariableId {
        self.variables.push(VariableInfo {
            lower_bound,
            upper_bound,
            name,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable(&self, variable: impl Into<VariableId>) -> &VariableInfo {
        &self.variables[variable.into()]
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &VariableInfo)> + '_ {
        self.variables.keys().zip(self.variables.iter())
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> + '_ {
        self.constraints.keys().zip(self.constraints.iter())
    }

    pub fn decision_strategies(&self) -> &[DecisionStrategy] {
        &self.decision_strategies
    }

    pub(crate) fn push_constraint(&mut self, constraint: Constraint) -> ConstraintId {
        self.constraints.push(constraint)
    }

    /// At least one of the literals must be true.
    pub fn add_bool_or(
        &mut self,
        literals: impl IntoIterator<Item = impl Into<Literal>>,
    ) -> ConstraintPoster<'_> {
        let literals = literals.into_iter().map(Into::into).collect();
        ConstraintPoster::new(self, ConstraintKind::BoolOr(literals))
    }

    /// All of the literals must be true.
    pub fn add_bool_and(
        &mut self,
        literals: impl IntoIterator<Item = impl Into<Literal>>,
    ) -> ConstraintPoster<'_> {
        let literals = literals.into_iter().map(Into::into).collect();
        ConstraintPoster::new(self, ConstraintKind::BoolAnd(literals))
    }

    /// `lower_bound <= expression <= upper_bound`
    pub fn add_linear(
        &mut self,
        expression: impl Into<LinearExpr>,
        lower_bound: i64,
        upper_bound: i64,
    ) -> ConstraintPoster<'_> {
        ConstraintPoster::new(
            self,
            ConstraintKind::Linear {
                expression: expression.into(),
                lower_bound,
                upper_bound,
            },
        )
    }

    /// `lhs == rhs`
    pub fn add_equality(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> ConstraintPoster<'_> {
        self.add_linear(lhs.into().minus(rhs), 0, 0)
    }

    /// `lhs <= rhs`
    pub fn add_less_or_equal(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> ConstraintPoster<'_> {
        self.add_linear(lhs.into().minus(rhs), i64::MIN, 0)
    }

    /// `lhs >= rhs`
    pub fn add_greater_or_equal(
        &mut self,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) -> ConstraintPoster<'_> {
        self.add_linear(lhs.into().minus(rhs), 0, i64::MAX)
    }

    /// `target == max(expressions)`
    pub fn add_max_equality(
        &mut self,
        target: impl Into<LinearExpr>,
        expressions: impl IntoIterator<Item = impl Into<LinearExpr>>,
    ) -> ConstraintPoster<'_> {
        ConstraintPoster::new(
            self,
            ConstraintKind::MaxEquality {
                target: target.into(),
                expressions: expressions.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// `target == |expression|`
    pub fn add_abs_equality(
        &mut self,
        target: impl Into<LinearExpr>,
        expression: impl Into<LinearExpr>,
    ) -> ConstraintPoster<'_> {
        ConstraintPoster::new(
            self,
            ConstraintKind::AbsEquality {
                target: target.into(),
                expression: expression.into(),
            },
        )
    }

    /// `target == left * right`
    pub fn add_multiplication_equality(
        &mut self,
        target: impl Into<LinearExpr>,
        left: impl Into<LinearExpr>,
        right: impl Into<LinearExpr>,
    ) -> ConstraintPoster<'_> {
        ConstraintPoster::new(
            self,
            ConstraintKind::MultiplicationEquality {
                target: target.into(),
                left: left.into(),
                right: right.into(),
            },
        )
    }

    /// Branch on `variables`, in order, before any variable that is not part of a strategy.
    pub fn add_decision_strategy(
        &mut self,
        variables: impl IntoIterator<Item = impl Into<VariableId>>,
        value_selection: ValueSelection,
    ) {
        self.decision_strategies.push(DecisionStrategy {
            variables: variables.into_iter().map(Into::into).collect(),
            value_selection,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_cached_per_value() {
        let mut model = Model::default();

        let t = model.new_constant(true);
        let f = model.new_constant(false);

        assert_eq!(t, model.new_constant(true));
        assert_eq!(f, model.new_constant(false));
        assert_ne!(t.variable(), f.variable());
        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.variable(t.variable()).lower_bound(), 1);
        assert_eq!(model.variable(f.variable()).upper_bound(), 0);
    }

    #[test]
    fn equality_is_posted_as_a_zero_width_linear_constraint() {
        let mut model = Model::default();
        let x = model.new_int_var(0, 5, "x");
        let y = model.new_int_var(0, 5, "y");

        model.add_equality(x, LinearExpr::from(y).offset(1)).post();

        let (_, constraint) = model.constraints().next().expect("one constraint was posted");
        assert!(constraint.kind.is_satisfied(|id| if id == x.id() { 3 } else { 2 }));
        assert!(!constraint.kind.is_satisfied(|_| 2));
    }
}
