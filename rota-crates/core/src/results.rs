//! The outcomes of a solve.
use crate::containers::KeyedVec;
use crate::variables::BoolVar;
use crate::variables::IntVar;
use crate::variables::LinearExpr;
use crate::variables::Literal;
use crate::variables::VariableId;

/// A complete assignment of the variables of a [`Model`](crate::model::Model).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    values: KeyedVec<VariableId, i64>,
}

impl Solution {
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, variable: impl Into<VariableId>) -> i64 {
        self.values[variable.into()]
    }

    pub fn int_value(&self, variable: IntVar) -> i64 {
        self.value(variable)
    }

    pub fn bool_value(&self, variable: BoolVar) -> bool {
        self.value(variable) != 0
    }

    pub fn literal_value(&self, literal: Literal) -> bool {
        literal.evaluate(self.value(literal.variable()))
    }

    pub fn evaluate(&self, expression: &LinearExpr) -> i64 {
        expression.evaluate(|variable| self.value(variable))
    }
}

impl From<Vec<i64>> for Solution {
    fn from(values: Vec<i64>) -> Self {
        Solution {
            values: values.into(),
        }
    }
}

/// The result of looking for any solution.
#[derive(Clone, Debug)]
pub enum SatisfactionResult {
    Satisfiable(Solution),
    Unsatisfiable,
    /// The search was stopped before it reached a conclusion.
    Unknown,
}

/// The result of minimising an objective.
#[derive(Clone, Debug)]
pub enum OptimisationResult {
    /// The solution is proven to be optimal.
    Optimal(Solution),
    /// A solution was found, but the search stopped before proving it optimal.
    Satisfiable(Solution),
    Unsatisfiable,
    /// The search was stopped before any solution was found.
    Unknown,
}

impl OptimisationResult {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            OptimisationResult::Optimal(solution) | OptimisationResult::Satisfiable(solution) => {
                Some(solution)
            }
            OptimisationResult::Unsatisfiable | OptimisationResult::Unknown => None,
        }
    }
}
