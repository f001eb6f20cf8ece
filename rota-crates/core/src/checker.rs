//! Independent verification of solutions against the model they were produced for.
//!
//! The checker re-evaluates every declared domain and every posted constraint directly from the
//! assignment; it does not share any code with the lowering onto the solver.
use thiserror::Error;

use crate::model::Model;
use crate::results::Solution;
use crate::variables::VariableId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckerError {
    #[error("the solution assigns {actual} variables but the model declares {expected}")]
    WrongNumberOfVariables { expected: usize, actual: usize },
    #[error("variable '{name}' ({variable}) = {value} is outside [{lower_bound}, {upper_bound}]")]
    OutOfDomain {
        variable: VariableId,
        name: String,
        value: i64,
        lower_bound: i64,
        upper_bound: i64,
    },
    #[error("constraint {constraint} is violated")]
    ConstraintViolated { constraint: String },
}

/// Returns the first violation of the model by the given solution, if any.
pub fn verify(model: &Model, solution: &Solution) -> Result<(), CheckerError> {
    if solution.num_variables() != model.num_variables() {
        return Err(CheckerError::WrongNumberOfVariables {
            expected: model.num_variables(),
            actual: solution.num_variables(),
        });
    }

    for (variable, info) in model.variables() {
        let value = solution.value(variable);
        if value < info.lower_bound() || value > info.upper_bound() {
            return Err(CheckerError::OutOfDomain {
                variable,
                name: info.name().to_owned(),
                value,
                lower_bound: info.lower_bound(),
                upper_bound: info.upper_bound(),
            });
        }
    }

    for (id, constraint) in model.constraints() {
        let enforced = constraint
            .enforcement
            .iter()
            .all(|&literal| solution.literal_value(literal));
        if enforced && !constraint.kind.is_satisfied(|variable| solution.value(variable)) {
            return Err(CheckerError::ConstraintViolated {
                constraint: format!("{id} {constraint}"),
            });
        }
    }

    Ok(())
}
