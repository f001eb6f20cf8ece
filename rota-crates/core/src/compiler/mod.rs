//! Compiles sequence rules into constraints on a [`Model`](crate::model::Model) and penalty terms
//! on an [`ObjectiveBuilder`](crate::objective::ObjectiveBuilder).
//!
//! The [`hard`] compilers make forbidden patterns infeasible, the [`soft`] compilers add violation
//! variables with a cost. Each of them validates its parameters before posting anything, so a
//! rejected rule leaves the model untouched.
mod bounds;
pub mod hard;
pub mod soft;

pub use bounds::*;
pub use hard::*;
pub use soft::*;

#[cfg(test)]
pub(crate) mod tests {
    use crate::engine::SolveParameters;
    use crate::engine::Solver;
    use crate::error::ValidationError;
    use crate::model::Model;
    use crate::objective::ObjectiveBuilder;
    use crate::results::OptimisationResult;
    use crate::results::Solution;
    use crate::termination::Indefinite;
    use crate::variables::Literal;

    /// Every assignment of `n` booleans.
    pub(crate) fn assignments(n: usize) -> impl Iterator<Item = Vec<bool>> {
        (0..1_u32 << n).map(move |bits| (0..n).map(|i| bits & (1 << i) != 0).collect())
    }

    /// The `(start, length)` of every maximal run of `true` values.
    pub(crate) fn runs(values: &[bool]) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..values.len())
            .filter(|&i| values[i] && (i == 0 || !values[i - 1]))
            .map(|start| {
                let length = values[start..].iter().take_while(|&&v| v).count();
                (start, length)
            })
    }

    fn sequence(model: &mut Model, prefix: &str, n: usize) -> Vec<Literal> {
        (0..n)
            .map(|i| model.new_bool_var(format!("{prefix}{i}")).into())
            .collect()
    }

    /// Whether the constraints built by `build` hold when the sequence is fixed to `values` and
    /// the condition sequence to `condition_values`.
    pub(crate) fn fixed_sequence_holds(
        values: &[bool],
        condition_values: &[bool],
        build: impl FnOnce(&mut Model, &[Literal], &[Literal]) -> Result<(), ValidationError>,
    ) -> bool {
        let mut model = Model::default();
        let x = sequence(&mut model, "x", values.len());
        let p = sequence(&mut model, "p", condition_values.len());
        build(&mut model, &x, &p).expect("the rule is valid");

        let solution = Solution::from(
            values
                .iter()
                .chain(condition_values)
                .map(|&value| i64::from(value))
                .collect::<Vec<_>>(),
        );
        crate::checker::verify(&model, &solution).is_ok()
    }

    /// The minimal penalty of the terms built by `build` when the sequences are fixed, or `None`
    /// when the fixed sequences are infeasible.
    pub(crate) fn fixed_sequence_penalty(
        values: &[bool],
        condition_values: &[bool],
        build: impl FnOnce(
            &mut Model,
            &mut ObjectiveBuilder,
            &[Literal],
            &[Literal],
        ) -> Result<(), ValidationError>,
    ) -> Option<i64> {
        let mut model = Model::default();
        let mut objective = ObjectiveBuilder::default();
        let x = sequence(&mut model, "x", values.len());
        let p = sequence(&mut model, "p", condition_values.len());
        build(&mut model, &mut objective, &x, &p).expect("the rule is valid");

        for (literal, &value) in x.iter().chain(&p).zip(values.iter().chain(condition_values)) {
            let value = i64::from(value);
            model.add_linear(*literal, value, value).post();
        }

        let objective = objective.build();
        match Solver::new(&model, SolveParameters::default()).minimise(&objective, Indefinite) {
            OptimisationResult::Optimal(solution) => Some(objective.evaluate(&solution)),
            OptimisationResult::Unsatisfiable => None,
            result => panic!("an indefinite search concludes, got {result:?}"),
        }
    }

    #[test]
    fn runs_are_maximal() {
        let values = [true, true, false, true, false, false, true];

        assert_eq!(runs(&values).collect::<Vec<_>>(), vec![(0, 2), (3, 1), (6, 1)]);
    }

    #[test]
    fn assignments_enumerate_every_combination() {
        assert_eq!(assignments(3).count(), 8);
        assert!(assignments(2).any(|values| values == vec![true, false]));
    }
}
