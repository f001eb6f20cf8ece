use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Add;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Sub;

use itertools::Itertools;

use super::BoolVar;
use super::IntVar;
use super::Literal;
use super::VariableId;

/// A linear expression `Σ a_i * x_i + c`.
///
/// The terms are kept normalised: every variable occurs at most once, sorted by identifier, and
/// no term has a zero coefficient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LinearExpr {
    terms: Vec<(i64, VariableId)>,
    constant: i64,
}

impl LinearExpr {
    /// The expression consisting of only the constant `value`.
    pub fn constant(value: i64) -> LinearExpr {
        LinearExpr {
            terms: vec![],
            constant: value,
        }
    }

    /// The sum of the given expressions.
    pub fn sum<Item: Into<LinearExpr>>(items: impl IntoIterator<Item = Item>) -> LinearExpr {
        items
            .into_iter()
            .fold(LinearExpr::default(), |sum, item| sum.plus(item))
    }

    /// The sum of the given expressions, each multiplied by its weight.
    pub fn weighted_sum<Item: Into<LinearExpr>>(
        items: impl IntoIterator<Item = (Item, i64)>,
    ) -> LinearExpr {
        items
            .into_iter()
            .fold(LinearExpr::default(), |sum, (item, weight)| {
                sum.plus(item.into().scaled(weight))
            })
    }

    pub fn terms(&self) -> &[(i64, VariableId)] {
        &self.terms
    }

    pub fn constant_term(&self) -> i64 {
        self.constant
    }

    /// Returns the variable if the expression is exactly `1 * x + 0`.
    pub fn as_variable(&self) -> Option<VariableId> {
        match self.terms.as_slice() {
            [(1, variable)] if self.constant == 0 => Some(*variable),
            _ => None,
        }
    }

    pub fn scaled(mut self, factor: i64) -> LinearExpr {
        if factor == 0 {
            return LinearExpr::constant(0);
        }
        self.terms
            .iter_mut()
            .for_each(|(coefficient, _)| *coefficient *= factor);
        self.constant *= factor;
        self
    }

    pub fn offset(mut self, offset: i64) -> LinearExpr {
        self.constant += offset;
        self
    }

    pub fn plus(mut self, other: impl Into<LinearExpr>) -> LinearExpr {
        let other = other.into();
        self.constant += other.constant;
        self.terms.extend(other.terms);
        self.normalise()
    }

    pub fn minus(self, other: impl Into<LinearExpr>) -> LinearExpr {
        self.plus(other.into().scaled(-1))
    }

    /// Evaluates the expression given the value of each variable.
    pub fn evaluate(&self, value_of: impl Fn(VariableId) -> i64) -> i64 {
        self.terms
            .iter()
            .map(|&(coefficient, variable)| coefficient * value_of(variable))
            .sum::<i64>()
            + self.constant
    }

    fn normalise(mut self) -> LinearExpr {
        self.terms.sort_by_key(|&(_, variable)| variable);
        self.terms = self
            .terms
            .into_iter()
            .coalesce(|(a, x), (b, y)| {
                if x == y {
                    Ok((a + b, x))
                } else {
                    Err(((a, x), (b, y)))
                }
            })
            .filter(|&(coefficient, _)| coefficient != 0)
            .collect();
        self
    }
}

impl Display for LinearExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, &(coefficient, variable)) in self.terms.iter().enumerate() {
            match (position, coefficient) {
                (0, 1) => write!(f, "{variable}")?,
                (0, -1) => write!(f, "-{variable}")?,
                (0, _) => write!(f, "{coefficient}*{variable}")?,
                (_, 1) => write!(f, " + {variable}")?,
                (_, -1) => write!(f, " - {variable}")?,
                (_, c) if c < 0 => write!(f, " - {}*{variable}", -c)?,
                (_, _) => write!(f, " + {coefficient}*{variable}")?,
            }
        }
        match (self.terms.is_empty(), self.constant) {
            (true, constant) => write!(f, "{constant}"),
            (false, 0) => Ok(()),
            (false, c) if c < 0 => write!(f, " - {}", -c),
            (false, c) => write!(f, " + {c}"),
        }
    }
}

impl From<i64> for LinearExpr {
    fn from(value: i64) -> Self {
        LinearExpr::constant(value)
    }
}

impl From<VariableId> for LinearExpr {
    fn from(value: VariableId) -> Self {
        LinearExpr {
            terms: vec![(1, value)],
            constant: 0,
        }
    }
}

impl From<IntVar> for LinearExpr {
    fn from(value: IntVar) -> Self {
        LinearExpr::from(value.id())
    }
}

impl From<BoolVar> for LinearExpr {
    fn from(value: BoolVar) -> Self {
        LinearExpr::from(value.id())
    }
}

impl From<Literal> for LinearExpr {
    fn from(value: Literal) -> Self {
        if value.is_negated() {
            // !x == 1 - x
            LinearExpr {
                terms: vec![(-1, value.variable())],
                constant: 1,
            }
        } else {
            LinearExpr::from(value.variable())
        }
    }
}

impl From<&Literal> for LinearExpr {
    fn from(value: &Literal) -> Self {
        LinearExpr::from(*value)
    }
}

impl<Rhs: Into<LinearExpr>> Add<Rhs> for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: Rhs) -> Self::Output {
        self.plus(rhs)
    }
}

impl<Rhs: Into<LinearExpr>> Sub<Rhs> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: Rhs) -> Self::Output {
        self.minus(rhs)
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: i64) -> Self::Output {
        self.scaled(rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        self.scaled(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    fn var(index: usize) -> BoolVar {
        BoolVar::new(VariableId::create_from_index(index))
    }

    #[test]
    fn duplicate_terms_are_merged() {
        let expr = LinearExpr::sum([var(1), var(0), var(1)]);

        assert_eq!(
            expr.terms(),
            &[
                (1, VariableId::create_from_index(0)),
                (2, VariableId::create_from_index(1))
            ]
        );
    }

    #[test]
    fn cancelling_terms_are_removed() {
        let expr = LinearExpr::from(var(2)) - var(2) + 4;

        assert!(expr.terms().is_empty());
        assert_eq!(expr.constant_term(), 4);
    }

    #[test]
    fn negated_literal_is_one_minus_variable() {
        let expr = LinearExpr::from(!var(0));

        assert_eq!(expr.evaluate(|_| 1), 0);
        assert_eq!(expr.evaluate(|_| 0), 1);
    }

    #[test]
    fn display_writes_signed_terms() {
        let expr = LinearExpr::weighted_sum([(var(0), 1), (var(1), -3)]).offset(-2);

        assert_eq!(expr.to_string(), "x0 - 3*x1 - 2");
    }

    #[test]
    fn weighted_sum_evaluates_each_weight() {
        let expr = LinearExpr::weighted_sum([(var(0), 3), (var(1), -2)]).offset(5);

        assert_eq!(expr.evaluate(|id| if id.index() == 0 { 2 } else { 1 }), 9);
    }
}
