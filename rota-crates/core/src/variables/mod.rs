//! The variables of a [`Model`](crate::model::Model) and the expressions built from them.
//!
//! Every variable is an integer variable identified by a [`VariableId`]; a [`BoolVar`] is an
//! integer variable with the domain `[0, 1]`. A [`Literal`] is a boolean variable or its negation,
//! and a [`LinearExpr`] is a weighted sum of variables plus a constant.
mod linear_expr;

use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Not;

pub use linear_expr::*;

use crate::containers::StorageKey;

/// The identifier of a variable within a [`Model`](crate::model::Model).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(u32);

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId(index as u32)
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A variable with the domain `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoolVar(VariableId);

impl BoolVar {
    pub(crate) fn new(id: VariableId) -> Self {
        BoolVar(id)
    }

    pub fn id(self) -> VariableId {
        self.0
    }
}

impl Not for BoolVar {
    type Output = Literal;

    fn not(self) -> Self::Output {
        !Literal::from(self)
    }
}

impl From<BoolVar> for VariableId {
    fn from(value: BoolVar) -> Self {
        value.0
    }
}

/// A bounded integer variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVar(VariableId);

impl IntVar {
    pub(crate) fn new(id: VariableId) -> Self {
        IntVar(id)
    }

    pub fn id(self) -> VariableId {
        self.0
    }
}

impl From<IntVar> for VariableId {
    fn from(value: IntVar) -> Self {
        value.0
    }
}

/// A [`BoolVar`] or its negation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    variable: VariableId,
    negated: bool,
}

impl Literal {
    pub fn variable(self) -> VariableId {
        self.variable
    }

    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// The truth value of the literal given the value of its variable.
    pub fn evaluate(self, value: i64) -> bool {
        (value != 0) != self.negated
    }
}

impl From<BoolVar> for Literal {
    fn from(value: BoolVar) -> Self {
        Literal {
            variable: value.0,
            negated: false,
        }
    }
}

impl From<&BoolVar> for Literal {
    fn from(value: &BoolVar) -> Self {
        Literal::from(*value)
    }
}

impl From<&Literal> for Literal {
    fn from(value: &Literal) -> Self {
        *value
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            variable: self.variable,
            negated: !self.negated,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "!{}", self.variable)
        } else {
            write!(f, "{}", self.variable)
        }
    }
}

/// Negates every literal in the given sequence.
pub fn negated(literals: &[Literal]) -> Vec<Literal> {
    literals.iter().map(|&literal| !literal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_negation_is_identity() {
        let variable = BoolVar::new(VariableId::create_from_index(3));
        let literal = Literal::from(variable);

        assert_eq!(literal, !!literal);
        assert!((!variable).is_negated());
        assert_eq!((!variable).variable(), variable.id());
    }

    #[test]
    fn literals_evaluate_against_their_polarity() {
        let variable = BoolVar::new(VariableId::create_from_index(0));

        assert!(Literal::from(variable).evaluate(1));
        assert!(!Literal::from(variable).evaluate(0));
        assert!((!variable).evaluate(0));
        assert!(!(!variable).evaluate(1));
    }
}
