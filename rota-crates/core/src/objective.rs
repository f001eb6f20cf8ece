//! The weighted penalty objective which the schedule minimises.
//!
//! Compilers append terms to an [`ObjectiveBuilder`]; once every rule has been compiled the
//! builder is turned into an [`Objective`], which is a linear expression over the penalty
//! variables that also remembers what every term stands for.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::results::Solution;
use crate::variables::BoolVar;
use crate::variables::IntVar;
use crate::variables::LinearExpr;
use crate::variables::Literal;

/// A variable which can carry a penalty: a violation literal or an integer excess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PenaltyVariable {
    Literal(Literal),
    Integer(IntVar),
}

impl From<Literal> for PenaltyVariable {
    fn from(value: Literal) -> Self {
        PenaltyVariable::Literal(value)
    }
}

impl From<BoolVar> for PenaltyVariable {
    fn from(value: BoolVar) -> Self {
        PenaltyVariable::Literal(value.into())
    }
}

impl From<IntVar> for PenaltyVariable {
    fn from(value: IntVar) -> Self {
        PenaltyVariable::Integer(value)
    }
}

impl From<PenaltyVariable> for LinearExpr {
    fn from(value: PenaltyVariable) -> Self {
        match value {
            PenaltyVariable::Literal(literal) => literal.into(),
            PenaltyVariable::Integer(variable) => variable.into(),
        }
    }
}

/// A single `coefficient * variable` term of the objective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PenaltyTerm {
    pub name: String,
    pub variable: PenaltyVariable,
    pub coefficient: i64,
}

impl PenaltyTerm {
    pub fn evaluate(&self, solution: &Solution) -> i64 {
        let value = match self.variable {
            PenaltyVariable::Literal(literal) => i64::from(solution.literal_value(literal)),
            PenaltyVariable::Integer(variable) => solution.int_value(variable),
        };
        value * self.coefficient
    }
}

/// An append-only collection of penalty terms.
#[derive(Clone, Debug, Default)]
pub struct ObjectiveBuilder {
    terms: Vec<PenaltyTerm>,
}

impl ObjectiveBuilder {
    pub fn add_term(
        &mut self,
        name: impl Into<String>,
        variable: impl Into<PenaltyVariable>,
        coefficient: i64,
    ) {
        self.terms.push(PenaltyTerm {
            name: name.into(),
            variable: variable.into(),
            coefficient,
        });
    }

    pub fn extend(&mut self, other: ObjectiveBuilder) {
        self.terms.extend(other.terms);
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[PenaltyTerm] {
        &self.terms
    }

    pub fn build(self) -> Objective {
        let expression = LinearExpr::weighted_sum(
            self.terms
                .iter()
                .map(|term| (LinearExpr::from(term.variable), term.coefficient)),
        );
        Objective {
            terms: self.terms,
            expression,
        }
    }
}

/// The objective: the sum of all penalty terms, to be minimised.
#[derive(Clone, Debug)]
pub struct Objective {
    terms: Vec<PenaltyTerm>,
    expression: LinearExpr,
}

impl Objective {
    pub fn terms(&self) -> &[PenaltyTerm] {
        &self.terms
    }

    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn evaluate(&self, solution: &Solution) -> i64 {
        solution.evaluate(&self.expression)
    }

    /// Every term with a non-zero contribution in the given solution.
    pub fn report(&self, solution: &Solution) -> PenaltyReport {
        let entries = self
            .terms
            .iter()
            .filter_map(|term| {
                let cost = term.evaluate(solution);
                (cost != 0).then(|| PenaltyReportEntry {
                    name: term.name.clone(),
                    value: cost / term.coefficient,
                    cost,
                })
            })
            .collect();
        PenaltyReport {
            entries,
            total: self.evaluate(solution),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PenaltyReportEntry {
    pub name: String,
    pub value: i64,
    pub cost: i64,
}

/// The realised value of every non-zero penalty term and the total objective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PenaltyReport {
    pub entries: Vec<PenaltyReportEntry>,
    pub total: i64,
}

impl Display for PenaltyReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "  {} = {} (cost {})",
                entry.name, entry.value, entry.cost
            )?;
        }
        write!(f, "  total = {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn building_sums_every_weighted_term() {
        let mut model = Model::default();
        let violated = model.new_bool_var("violated");
        let excess = model.new_int_var(0, 4, "excess");

        let mut builder = ObjectiveBuilder::default();
        builder.add_term("violated", violated, 3);
        builder.add_term("excess", excess, 2);
        let objective = builder.build();

        let solution = Solution::from(vec![1, 4]);
        assert_eq!(objective.evaluate(&solution), 11);

        let report = objective.report(&solution);
        assert_eq!(report.total, 11);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].value, 4);
    }

    #[test]
    fn zero_terms_are_left_out_of_the_report() {
        let mut model = Model::default();
        let violated = model.new_bool_var("violated");

        let mut builder = ObjectiveBuilder::default();
        builder.add_term("violated", violated, 5);
        let objective = builder.build();

        assert!(objective.report(&Solution::from(vec![0])).entries.is_empty());
    }
}
