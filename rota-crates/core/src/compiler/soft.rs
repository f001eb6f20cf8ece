//! Penalties for patterns which are allowed but undesirable.
//!
//! Every penalty is a fresh violation variable which the posted constraints force to be
//! (at least) the size of the violation, added to the [`ObjectiveBuilder`] with its cost.
use log::trace;

use super::bounds::MaxBounds;
use super::bounds::MinBounds;
use super::bounds::SequenceBounds;
use super::bounds::SumBounds;
use super::hard::check_sequence;
use super::hard::forbid_max;
use super::hard::forbid_min;
use crate::error::ValidationError;
use crate::model::Model;
use crate::objective::ObjectiveBuilder;
use crate::sequence::post_predicates;
use crate::sequence::predicates;
use crate::sequence::shift_span;
use crate::sequence::window_size;
use crate::sequence::Condition;
use crate::variables::negated;
use crate::variables::LinearExpr;
use crate::variables::Literal;

/// Penalises runs (unconditioned) or gaps (conditioned) with a length `L` in
/// `hard_min <= L < soft_min` by `min_cost * (soft_min - L)`.
///
/// A gap after a prior match has to be closed by a true literal, and a gap before a post match has
/// to be preceded by one; gaps cut off by the horizon are not penalised. Returns the number of
/// terms added to the objective.
pub fn penalize_min(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    x: &[Literal],
    bounds: MinBounds,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;
    bounds.validate(name, x.len())?;

    let n = x.len();
    let lp = condition.prior_width();
    let terms_before = objective.len();
    if bounds.min_cost == 0 {
        return Ok(0);
    }

    for length in bounds.hard_min..bounds.soft_min {
        let cost = bounds.min_cost * (bounds.soft_min - length) as i64;
        match condition {
            Condition::None => {
                if length == 0 {
                    continue;
                }
                for start in 0..window_size(n, length, condition) {
                    let clause = negated(&shift_span(x, start, length, true, condition));
                    add_violation(model, objective, name, "under_span", start, length, cost)
                        .clause(clause, vec![]);
                }
            }
            Condition::Prior(_) => {
                // The gap has to be closed by a true literal, so it needs one more position.
                for start in 0..window_size(n, length + 1, condition) {
                    let begin = start + lp;
                    let mut clause = shift_span(x, start, length, false, condition);
                    clause.push(!x[begin + length]);
                    clause.extend(condition.continuation(begin));
                    add_violation(model, objective, name, "under_span", start, length, cost)
                        .clause(clause, predicates(start, condition));
                }
            }
            Condition::Post(_) => {
                for start in 1..window_size(n, length, condition) {
                    let mut clause = shift_span(x, start, length, false, condition);
                    clause.push(!x[start - 1]);
                    add_violation(model, objective, name, "under_span", start, length, cost)
                        .clause(clause, post_predicates(start, length, condition));
                }
            }
            Condition::Both { .. } => {
                for start in 0..window_size(n, length, condition) {
                    let clause = shift_span(x, start, length, false, condition);
                    let mut enforcement = predicates(start, condition);
                    enforcement.extend(post_predicates(start, length, condition));
                    add_violation(model, objective, name, "under_span", start, length, cost)
                        .clause(clause, enforcement);
                }
            }
        }
    }

    let added = objective.len() - terms_before;
    trace!("{name}: penalize_min added {added} terms");
    Ok(added)
}

/// Penalises maximal runs with a length `L` in `soft_max < L <= hard_max` by
/// `max_cost * (L - soft_max)`.
///
/// With a prior the run has to start directly after the match, with a post it has to end directly
/// before it, and with both it has to fill the gap between them. Returns the number of terms added
/// to the objective.
pub fn penalize_max(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    x: &[Literal],
    bounds: MaxBounds,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;
    bounds.validate(name)?;

    let n = x.len();
    let lp = condition.prior_width();
    let terms_before = objective.len();
    if bounds.max_cost == 0 {
        return Ok(0);
    }

    for length in bounds.soft_max + 1..=bounds.hard_max {
        let cost = bounds.max_cost * (length - bounds.soft_max) as i64;
        for start in 0..window_size(n, length, condition) {
            let begin = start + lp;
            let (clause, enforcement) = match condition {
                Condition::None => (
                    negated(&shift_span(x, start, length, true, condition)),
                    vec![],
                ),
                Condition::Prior(_) => {
                    let mut clause = negated(&shift_span(x, start, length, false, condition));
                    clause.extend(x.get(begin + length).copied());
                    clause.extend(condition.continuation(begin));
                    (clause, predicates(start, condition))
                }
                Condition::Post(_) => {
                    let mut clause = negated(&shift_span(x, start, length, false, condition));
                    if start > 0 {
                        clause.push(x[start - 1]);
                    }
                    (clause, post_predicates(start, length, condition))
                }
                Condition::Both { .. } => {
                    let mut enforcement = predicates(start, condition);
                    enforcement.extend(post_predicates(start, length, condition));
                    (
                        negated(&shift_span(x, start, length, false, condition)),
                        enforcement,
                    )
                }
            };
            add_violation(model, objective, name, "over_span", start, length, cost)
                .clause(clause, enforcement);
        }
    }

    let added = objective.len() - terms_before;
    trace!("{name}: penalize_max added {added} terms");
    Ok(added)
}

/// [`forbid_min`] at `hard_min` and [`penalize_min`] up to `soft_min`.
pub fn add_soft_sequence_min(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    x: &[Literal],
    bounds: MinBounds,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;
    bounds.validate(name, x.len())?;

    let _ = forbid_min(model, x, bounds.hard_min, condition, name)?;
    penalize_min(model, objective, x, bounds, condition, name)
}

/// [`forbid_max`] at `hard_max` and [`penalize_max`] from `soft_max`.
pub fn add_soft_sequence_max(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    x: &[Literal],
    bounds: MaxBounds,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;
    bounds.validate(name)?;

    let _ = forbid_max(model, x, bounds.hard_max, condition, name)?;
    penalize_max(model, objective, x, bounds, condition, name)
}

/// Both [`add_soft_sequence_min`] and [`add_soft_sequence_max`].
pub fn add_soft_sequence(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    x: &[Literal],
    bounds: SequenceBounds,
    condition: &Condition,
    name: &str,
) -> Result<usize, ValidationError> {
    check_sequence(name, x, condition)?;
    bounds.validate(name, x.len())?;

    let under = add_soft_sequence_min(model, objective, x, bounds.min_side(), condition, name)?;
    let over = add_soft_sequence_max(model, objective, x, bounds.max_side(), condition, name)?;
    Ok(under + over)
}

/// Bounds the number of true literals to `[hard_min, hard_max]` and penalises every unit below
/// `soft_min` or above `soft_max`.
pub fn add_soft_sum(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    literals: &[Literal],
    bounds: SumBounds,
    name: &str,
) -> Result<usize, ValidationError> {
    if literals.is_empty() {
        return Err(ValidationError::EmptyDomain {
            rule: name.to_owned(),
            what: "sequence",
        });
    }
    bounds.validate(name, literals.len())?;

    let n = literals.len() as i64;
    let sum = model.new_int_var(bounds.hard_min, bounds.hard_max.min(n), format!("{name}: sum"));
    model
        .add_equality(sum, LinearExpr::sum(literals))
        .with_name(name)
        .post();

    let mut added = 0;
    if bounds.soft_min > bounds.hard_min && bounds.min_cost > 0 {
        let most = bounds.soft_min - bounds.hard_min;
        let delta = model.new_int_var(-n, most, format!("{name}: under_delta"));
        model
            .add_equality(delta, LinearExpr::constant(bounds.soft_min) - sum)
            .with_name(name)
            .post();
        let excess = model.new_int_var(0, most, format!("{name}: under_sum"));
        model
            .add_max_equality(excess, [LinearExpr::from(delta), LinearExpr::constant(0)])
            .with_name(name)
            .post();
        objective.add_term(format!("{name}: under_sum"), excess, bounds.min_cost);
        added += 1;
    }
    if bounds.soft_max < bounds.hard_max && bounds.max_cost > 0 {
        let most = bounds.hard_max - bounds.soft_max;
        let delta = model.new_int_var(-n - bounds.soft_max, most, format!("{name}: over_delta"));
        model
            .add_equality(delta, LinearExpr::from(sum).offset(-bounds.soft_max))
            .with_name(name)
            .post();
        let excess = model.new_int_var(0, most, format!("{name}: over_sum"));
        model
            .add_max_equality(excess, [LinearExpr::from(delta), LinearExpr::constant(0)])
            .with_name(name)
            .post();
        objective.add_term(format!("{name}: over_sum"), excess, bounds.max_cost);
        added += 1;
    }

    trace!("{name}: add_soft_sum added {added} terms");
    Ok(added)
}

/// Penalises the distance between the number of true literals and `target` by the triangle
/// number `|d| * (|d| + 1)`, scaled by `weight`.
///
/// The cost is 0 exactly at the target, symmetric and convex, so the slack is spread evenly.
pub fn distribution(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    literals: &[Literal],
    target: i64,
    weight: i64,
    name: &str,
) -> Result<usize, ValidationError> {
    if literals.is_empty() {
        return Err(ValidationError::EmptyDomain {
            rule: name.to_owned(),
            what: "sequence",
        });
    }
    if weight < 0 {
        return Err(ValidationError::NegativeCost {
            rule: name.to_owned(),
            bound: "weight",
            cost: weight,
        });
    }
    if target < 0 {
        return Err(ValidationError::InfeasibleBounds {
            rule: name.to_owned(),
            bound: format!("target {target} is negative"),
        });
    }

    let n = literals.len() as i64;
    let largest = target.max(n - target);

    let count = model.new_int_var(0, n, format!("{name}: count"));
    model
        .add_equality(count, LinearExpr::sum(literals))
        .with_name(name)
        .post();
    let diff = model.new_int_var(target - n, target, format!("{name}: diff"));
    model
        .add_equality(diff, LinearExpr::constant(target) - count)
        .with_name(name)
        .post();
    let abs = model.new_int_var(0, largest, format!("{name}: abs"));
    model.add_abs_equality(abs, diff).with_name(name).post();
    let abs_plus_one = model.new_int_var(1, largest + 1, format!("{name}: abs_plus_one"));
    model
        .add_equality(abs_plus_one, LinearExpr::from(abs).offset(1))
        .with_name(name)
        .post();
    let triangle = model.new_int_var(0, largest * (largest + 1), format!("{name}: triangle"));
    model
        .add_multiplication_equality(triangle, abs, abs_plus_one)
        .with_name(name)
        .post();

    if weight == 0 {
        return Ok(0);
    }
    objective.add_term(format!("{name}: distribution"), triangle, weight);
    Ok(1)
}

/// Penalises working `previous` and then `next` by `cost`.
pub fn transition_penalty(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    previous: Literal,
    next: Literal,
    cost: i64,
    name: &str,
) -> Result<usize, ValidationError> {
    check_penalty_cost(name, cost)?;
    if cost == 0 {
        return Ok(0);
    }
    let violation = model.new_bool_var(name);
    model
        .add_bool_or([!previous, !next, violation.into()])
        .with_name(name)
        .post();
    objective.add_term(name, violation, cost);
    Ok(1)
}

/// Penalises exactly one of `first` and `second` being true by `cost`, e.g. working only half of
/// a weekend.
pub fn penalize_split_pair(
    model: &mut Model,
    objective: &mut ObjectiveBuilder,
    first: Literal,
    second: Literal,
    cost: i64,
    name: &str,
) -> Result<usize, ValidationError> {
    check_penalty_cost(name, cost)?;
    if cost == 0 {
        return Ok(0);
    }
    let violation = model.new_bool_var(name);
    model
        .add_bool_or([!first, second, violation.into()])
        .with_name(name)
        .post();
    model
        .add_bool_or([first, !second, violation.into()])
        .with_name(name)
        .post();
    objective.add_term(name, violation, cost);
    Ok(1)
}

fn check_penalty_cost(name: &str, cost: i64) -> Result<(), ValidationError> {
    if cost < 0 {
        return Err(ValidationError::NegativeCost {
            rule: name.to_owned(),
            bound: "cost",
            cost,
        });
    }
    Ok(())
}

/// A fresh violation literal which still has to be tied to its pattern.
struct Violation<'a> {
    model: &'a mut Model,
    literal: Literal,
    name: String,
}

impl Violation<'_> {
    /// Posts `clause ∨ violation`, enforced by `enforcement`.
    fn clause(self, mut clause: Vec<Literal>, enforcement: Vec<Literal>) {
        clause.push(self.literal);
        self.model
            .add_bool_or(clause)
            .only_enforce_if(enforcement)
            .with_name(self.name)
            .post();
    }
}

fn add_violation<'a>(
    model: &'a mut Model,
    objective: &mut ObjectiveBuilder,
    name: &str,
    kind: &str,
    start: usize,
    length: usize,
    cost: i64,
) -> Violation<'a> {
    let name = format!("{name}: {kind}(start={start}, length={length})");
    let literal = Literal::from(model.new_bool_var(name.as_str()));
    objective.add_term(name.as_str(), literal, cost);
    Violation {
        model,
        literal,
        name,
    }
}
