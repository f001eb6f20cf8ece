//! Constraints which make forbidden patterns infeasible.
use log::trace;

use crate::error::ValidationError;
use crate::model::Model;
use crate::sequence::post_predicates;
use crate::sequence::predicates;
use crate::sequence::shift_span;
use crate::sequence::window_size;
use crate::sequence::Condition;
use crate::variables::negated;
use crate::variables::LinearExpr;
use crate::variables::Literal;

/// Forbids runs of more than `hard_max` true literals in `x`, within the windows selected by
/// `condition`.
///
/// Returns the number of constraints posted.
pub fn forbid_max(
    model: &mut Model,
    x: &[Literal],
    hard_max: usize,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;

    let n = x.len();
    let width = hard_max + 1;
    let mut posted = 0;

    match condition {
        Condition::None | Condition::Prior(_) | Condition::Post(_) => {
            for start in 0..window_size(n, width, condition) {
                let mut clause = negated(&predicates(start, condition));
                clause.extend(negated(&post_predicates(start, width, condition)));
                clause.extend(negated(&shift_span(x, start, width, false, condition)));
                clause.extend(condition.continuation(start + condition.prior_width()));
                model.add_bool_or(clause).with_name(name).post();
                posted += 1;
            }
        }
        Condition::Both { .. } => {
            let widest = n.saturating_sub(condition.prior_width() + condition.post_width());
            for length in width..=widest {
                for start in 0..window_size(n, length, condition) {
                    let mut clause = negated(&predicates(start, condition));
                    clause.extend(negated(&post_predicates(start, length, condition)));
                    clause.extend(negated(&shift_span(x, start, length, false, condition)));
                    model.add_bool_or(clause).with_name(name).post();
                    posted += 1;
                }
            }
        }
    }

    trace!("{name}: forbid_max({hard_max}) posted {posted} constraints");
    Ok(posted)
}

/// Forbids runs (unconditioned) or gaps (conditioned) of fewer than `hard_min` literals.
///
/// Without a condition, every maximal run of true literals must be empty or at least `hard_min`
/// long. After a prior match the next `hard_min` literals must be false, and before a post match
/// the previous `hard_min` literals must be false; both are truncated at the horizon. Between a
/// prior and a post match at most `hard_min - 1` apart, at least one literal must be true.
///
/// Returns the number of constraints posted.
pub fn forbid_min(
    model: &mut Model,
    x: &[Literal],
    hard_min: usize,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;

    let n = x.len();
    let mut posted = 0;
    if hard_min == 0 {
        return Ok(posted);
    }

    match condition {
        Condition::None => {
            for length in 1..hard_min {
                for start in 0..window_size(n, length, condition) {
                    let span = shift_span(x, start, length, true, condition);
                    model.add_bool_or(negated(&span)).with_name(name).post();
                    posted += 1;
                }
            }
        }
        Condition::Prior(_) => {
            for start in 0..window_size(n, 1, condition) {
                let begin = start + condition.prior_width();
                let length = hard_min.min(n - begin);
                let gap = shift_span(x, start, length, false, condition);
                let mut enforcement = predicates(start, condition);
                enforcement.extend(condition.continuation(begin).map(|literal| !literal));
                model
                    .add_bool_and(negated(&gap))
                    .only_enforce_if(enforcement)
                    .with_name(name)
                    .post();
                posted += 1;
            }
        }
        Condition::Post(_) => {
            for post_start in 1..window_size(n, 0, condition) {
                let gap = &x[post_start.saturating_sub(hard_min)..post_start];
                model
                    .add_bool_and(negated(gap))
                    .only_enforce_if(post_predicates(post_start, 0, condition))
                    .with_name(name)
                    .post();
                posted += 1;
            }
        }
        Condition::Both { .. } => {
            for length in 0..hard_min {
                for start in 0..window_size(n, length, condition) {
                    let mut enforcement = predicates(start, condition);
                    enforcement.extend(post_predicates(start, length, condition));
                    model
                        .add_bool_or(shift_span(x, start, length, false, condition))
                        .only_enforce_if(enforcement)
                        .with_name(name)
                        .post();
                    posted += 1;
                }
            }
        }
    }

    trace!("{name}: forbid_min({hard_min}) posted {posted} constraints");
    Ok(posted)
}

/// Forbids all of the given literals; used to restrict staff to a subset of the shifts.
pub fn x_shifts_only(
    model: &mut Model,
    literals: impl IntoIterator<Item = Literal>,
    name: &str,
) -> Result<(), ValidationError> {
    let literals = literals.into_iter().collect::<Vec<_>>();
    if literals.is_empty() {
        return Ok(());
    }
    model
        .add_linear(LinearExpr::sum(literals), 0, 0)
        .with_name(name)
        .post();
    Ok(())
}

/// Exactly one of the literals is true.
pub fn exactly_one(
    model: &mut Model,
    literals: &[Literal],
    name: &str,
) -> Result<(), ValidationError> {
    if literals.is_empty() {
        return Err(ValidationError::EmptyDomain {
            rule: name.to_owned(),
            what: "set of candidates",
        });
    }
    model
        .add_linear(LinearExpr::sum(literals), 1, 1)
        .with_name(name)
        .post();
    Ok(())
}

/// At most one of the literals is true.
pub fn at_most_one(model: &mut Model, literals: &[Literal], name: &str) {
    model
        .add_linear(LinearExpr::sum(literals), 0, 1)
        .with_name(name)
        .post();
}

pub(crate) fn check_sequence(
    name: &str,
    x: &[Literal],
    condition: &Condition,
) -> Result<(), ValidationError> {
    if x.is_empty() {
        return Err(ValidationError::EmptyDomain {
            rule: name.to_owned(),
            what: "sequence",
        });
    }
    condition.validate(name, x.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tests::assignments;
    use crate::compiler::tests::fixed_sequence_holds;
    use crate::compiler::tests::runs;
    use crate::sequence::Post;
    use crate::sequence::Prior;

    #[test]
    fn forbid_max_matches_the_longest_run_for_all_short_sequences() {
        for n in 1..=6 {
            for hard_max in 0..=n {
                for values in assignments(n) {
                    let holds = fixed_sequence_holds(&values, &[], |model, x, _| {
                        let _ = forbid_max(model, x, hard_max, &Condition::None, "max")?;
                        Ok(())
                    });
                    let longest = runs(&values).map(|(_, length)| length).max().unwrap_or(0);

                    assert_eq!(holds, longest <= hard_max, "{values:?} hard_max={hard_max}");
                }
            }
        }
    }

    #[test]
    fn forbid_min_matches_the_shortest_run_for_all_short_sequences() {
        for n in 1..=6 {
            for hard_min in 0..=n {
                for values in assignments(n) {
                    let holds = fixed_sequence_holds(&values, &[], |model, x, _| {
                        let _ = forbid_min(model, x, hard_min, &Condition::None, "min")?;
                        Ok(())
                    });
                    let shortest = runs(&values).map(|(_, length)| length).min();

                    assert_eq!(
                        holds,
                        shortest.map_or(true, |length| length >= hard_min),
                        "{values:?} hard_min={hard_min}"
                    );
                }
            }
        }
    }

    #[test]
    fn forbid_max_after_prior_bounds_the_run_following_each_match() {
        for n in 2..=6 {
            for hard_max in 0..n {
                for values in assignments(n) {
                    for prior in assignments(n) {
                        let holds = fixed_sequence_holds(&values, &prior, |model, x, p| {
                            let condition = Condition::Prior(Prior::new(p.to_vec(), vec![true]));
                            let _ = forbid_max(model, x, hard_max, &condition, "max")?;
                            Ok(())
                        });
                        let expected = (0..n - 1).filter(|&start| prior[start]).all(|start| {
                            values[start + 1..].iter().take_while(|&&v| v).count() <= hard_max
                        });

                        assert_eq!(holds, expected, "{values:?} {prior:?} hard_max={hard_max}");
                    }
                }
            }
        }
    }

    #[test]
    fn forbid_max_with_continuing_prior_exempts_continued_runs() {
        for n in 2..=6 {
            for hard_max in 0..n {
                for values in assignments(n) {
                    for prior in assignments(n) {
                        let holds = fixed_sequence_holds(&values, &prior, |model, x, p| {
                            let condition =
                                Condition::Prior(Prior::continuing(p.to_vec(), vec![true]));
                            let _ = forbid_max(model, x, hard_max, &condition, "max")?;
                            Ok(())
                        });
                        let expected = (0..n - 1)
                            .filter(|&start| prior[start] && !prior[start + 1])
                            .all(|start| {
                                values[start + 1..].iter().take_while(|&&v| v).count() <= hard_max
                            });

                        assert_eq!(holds, expected, "{values:?} {prior:?} hard_max={hard_max}");
                    }
                }
            }
        }
    }

    #[test]
    fn forbid_min_after_prior_requires_a_gap() {
        for n in 2..=6 {
            for hard_min in 1..=n {
                for values in assignments(n) {
                    for prior in assignments(n) {
                        let holds = fixed_sequence_holds(&values, &prior, |model, x, p| {
                            let condition = Condition::Prior(Prior::new(p.to_vec(), vec![true]));
                            let _ = forbid_min(model, x, hard_min, &condition, "min")?;
                            Ok(())
                        });
                        let expected = (0..n - 1).filter(|&start| prior[start]).all(|start| {
                            values[start + 1..].iter().take(hard_min).all(|&v| !v)
                        });

                        assert_eq!(holds, expected, "{values:?} {prior:?} hard_min={hard_min}");
                    }
                }
            }
        }
    }

    #[test]
    fn forbid_min_with_continuing_prior_starts_the_gap_when_the_prior_stops() {
        for n in 2..=6 {
            for hard_min in 1..=n {
                for values in assignments(n) {
                    for prior in assignments(n) {
                        let holds = fixed_sequence_holds(&values, &prior, |model, x, p| {
                            let condition =
                                Condition::Prior(Prior::continuing(p.to_vec(), vec![true]));
                            let _ = forbid_min(model, x, hard_min, &condition, "min")?;
                            Ok(())
                        });
                        let expected = (0..n - 1)
                            .filter(|&start| prior[start] && !prior[start + 1])
                            .all(|start| {
                                values[start + 1..].iter().take(hard_min).all(|&v| !v)
                            });

                        assert_eq!(holds, expected, "{values:?} {prior:?} hard_min={hard_min}");
                    }
                }
            }
        }
    }

    #[test]
    fn forbid_min_before_post_requires_a_gap() {
        for n in 2..=6 {
            for hard_min in 1..=n {
                for values in assignments(n) {
                    for post in assignments(n) {
                        let holds = fixed_sequence_holds(&values, &post, |model, x, q| {
                            let condition = Condition::Post(Post::new(q.to_vec(), vec![true]));
                            let _ = forbid_min(model, x, hard_min, &condition, "min")?;
                            Ok(())
                        });
                        let expected = (1..n).filter(|&p| post[p]).all(|p| {
                            values[p.saturating_sub(hard_min)..p].iter().all(|&v| !v)
                        });

                        assert_eq!(holds, expected, "{values:?} {post:?} hard_min={hard_min}");
                    }
                }
            }
        }
    }

    #[test]
    fn forbid_min_between_prior_and_post_requires_work_in_short_gaps() {
        for n in 2..=5 {
            for hard_min in 1..=n {
                for values in assignments(n) {
                    for pattern in assignments(n) {
                        // The prior and the post share one sequence: a gap between two marks.
                        let holds = fixed_sequence_holds(&values, &pattern, |model, x, p| {
                            let condition = Condition::Both {
                                prior: Prior::new(p.to_vec(), vec![true]),
                                post: Post::new(p.to_vec(), vec![true]),
                            };
                            let _ = forbid_min(model, x, hard_min, &condition, "min")?;
                            Ok(())
                        });
                        let expected = (0..n).filter(|&i| pattern[i]).all(|i| {
                            (i + 1..n)
                                .filter(|&j| pattern[j] && j - i - 1 < hard_min)
                                .all(|j| values[i + 1..j].iter().any(|&v| v))
                        });

                        assert_eq!(holds, expected, "{values:?} {pattern:?} hard_min={hard_min}");
                    }
                }
            }
        }
    }

    #[test]
    fn x_shifts_only_forbids_every_literal() {
        let holds = |values: &[bool]| {
            fixed_sequence_holds(values, &[], |model, x, _| {
                x_shifts_only(model, x.iter().copied(), "only")
            })
        };

        assert!(holds(&[false, false, false]));
        assert!(!holds(&[false, true, false]));
    }

    #[test]
    fn exactly_one_rejects_an_empty_set() {
        let mut model = Model::default();

        assert!(matches!(
            exactly_one(&mut model, &[], "cover"),
            Err(ValidationError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn empty_sequences_are_rejected() {
        let mut model = Model::default();

        assert!(matches!(
            forbid_max(&mut model, &[], 2, &Condition::None, "max"),
            Err(ValidationError::EmptyDomain { what: "sequence", .. })
        ));
    }
}
