use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;
use log::warn;

use super::Model;
use crate::containers::StorageKey;
use crate::variables::LinearExpr;
use crate::variables::Literal;
use crate::variables::VariableId;

/// The identifier of a constraint posted to a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(u32);

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId(index as u32)
    }
}

impl Display for ConstraintId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// The relations which can be posted to a [`Model`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// At least one of the literals is true.
    BoolOr(Box<[Literal]>),
    /// All of the literals are true.
    BoolAnd(Box<[Literal]>),
    /// `lower_bound <= expression <= upper_bound`; an infinite side is `i64::MIN`/`i64::MAX`.
    Linear {
        expression: LinearExpr,
        lower_bound: i64,
        upper_bound: i64,
    },
    /// `target == max(expressions)`
    MaxEquality {
        target: LinearExpr,
        expressions: Box<[LinearExpr]>,
    },
    /// `target == |expression|`
    AbsEquality {
        target: LinearExpr,
        expression: LinearExpr,
    },
    /// `target == left * right`
    MultiplicationEquality {
        target: LinearExpr,
        left: LinearExpr,
        right: LinearExpr,
    },
}

impl ConstraintKind {
    /// Whether the relation holds for the given assignment.
    pub fn is_satisfied(&self, value_of: impl Fn(VariableId) -> i64 + Copy) -> bool {
        let literal_value = |literal: &Literal| literal.evaluate(value_of(literal.variable()));
        match self {
            ConstraintKind::BoolOr(literals) => literals.iter().any(literal_value),
            ConstraintKind::BoolAnd(literals) => literals.iter().all(literal_value),
            ConstraintKind::Linear {
                expression,
                lower_bound,
                upper_bound,
            } => (*lower_bound..=*upper_bound).contains(&expression.evaluate(value_of)),
            ConstraintKind::MaxEquality {
                target,
                expressions,
            } => {
                let maximum = expressions
                    .iter()
                    .map(|expression| expression.evaluate(value_of))
                    .max();
                maximum == Some(target.evaluate(value_of))
            }
            ConstraintKind::AbsEquality { target, expression } => {
                target.evaluate(value_of) == expression.evaluate(value_of).abs()
            }
            ConstraintKind::MultiplicationEquality {
                target,
                left,
                right,
            } => target.evaluate(value_of) == left.evaluate(value_of) * right.evaluate(value_of),
        }
    }
}

/// A relation together with the literals which enforce it.
///
/// The relation only has to hold when all of the enforcement literals are true.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub enforcement: Box<[Literal]>,
    pub name: Option<String>,
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "'{name}' ")?;
        }
        match &self.kind {
            ConstraintKind::BoolOr(literals) => write!(f, "or({})", literals.iter().join(", "))?,
            ConstraintKind::BoolAnd(literals) => {
                write!(f, "and({})", literals.iter().join(", "))?
            }
            ConstraintKind::Linear {
                expression,
                lower_bound,
                upper_bound,
            } => write!(f, "{lower_bound} <= {expression} <= {upper_bound}")?,
            ConstraintKind::MaxEquality {
                target,
                expressions,
            } => write!(f, "{target} == max({})", expressions.iter().join(", "))?,
            ConstraintKind::AbsEquality { target, expression } => {
                write!(f, "{target} == |{expression}|")?
            }
            ConstraintKind::MultiplicationEquality {
                target,
                left,
                right,
            } => write!(f, "{target} == ({left}) * ({right})")?,
        }
        if !self.enforcement.is_empty() {
            write!(f, " if {}", self.enforcement.iter().join(" & "))?;
        }
        Ok(())
    }
}

/// A temporary structure which adds a created constraint to the [`Model`]. For an example on how
/// to use this, see [`Model::add_bool_or`].
#[derive(Debug)]
#[must_use = "a constraint is only added to the model once it is posted"]
pub struct ConstraintPoster<'model> {
    model: &'model mut Model,
    constraint: Option<Constraint>,
}

impl<'model> ConstraintPoster<'model> {
    pub(crate) fn new(model: &'model mut Model, kind: ConstraintKind) -> Self {
        ConstraintPoster {
            model,
            constraint: Some(Constraint {
                kind,
                enforcement: Box::new([]),
                name: None,
            }),
        }
    }

    /// Only enforce the constraint when all of the given literals are true (half-reification).
    pub fn only_enforce_if(
        mut self,
        literals: impl IntoIterator<Item = impl Into<Literal>>,
    ) -> Self {
        if let Some(constraint) = self.constraint.as_mut() {
            constraint.enforcement = constraint
                .enforcement
                .iter()
                .copied()
                .chain(literals.into_iter().map(Into::into))
                .collect();
        }
        self
    }

    /// Attach a descriptive name, reported when the constraint is violated.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some(constraint) = self.constraint.as_mut() {
            constraint.name = Some(name.into());
        }
        self
    }

    /// Add the constraint to the model.
    pub fn post(mut self) {
        if let Some(constraint) = self.constraint.take() {
            let _ = self.model.push_constraint(constraint);
        }
    }
}

impl Drop for ConstraintPoster<'_> {
    fn drop(&mut self) {
        if self.constraint.is_some() {
            warn!("A constraint poster is never used, this is likely a mistake.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforcement_literals_accumulate() {
        let mut model = Model::default();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let c = model.new_bool_var("c");

        model
            .add_bool_or([a])
            .only_enforce_if([b])
            .only_enforce_if([!c])
            .post();

        let (_, constraint) = model.constraints().next().expect("one constraint was posted");
        assert_eq!(constraint.enforcement.as_ref(), &[b.into(), !c]);
    }

    #[test]
    fn max_equality_is_checked_against_the_largest_expression() {
        let kind = ConstraintKind::MaxEquality {
            target: LinearExpr::constant(4),
            expressions: vec![LinearExpr::constant(1), LinearExpr::constant(4)].into(),
        };

        assert!(kind.is_satisfied(|_| 0));
    }
}
