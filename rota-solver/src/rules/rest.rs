//! Rules on runs of shifts and the days off between them.
use rota_core::compiler::add_soft_sequence_max;
use rota_core::compiler::add_soft_sequence_min;
use rota_core::compiler::add_soft_sum;
use rota_core::compiler::forbid_min;
use rota_core::compiler::MaxBounds;
use rota_core::compiler::MinBounds;
use rota_core::compiler::SumBounds;
use rota_core::error::ValidationError;
use rota_core::sequence::window;
use rota_core::sequence::Condition;
use rota_core::sequence::Post;
use rota_core::sequence::Prior;

use super::Rule;
use super::RuleContext;
use crate::aggregates::AggregateKind;
use crate::config::RuleSettings;
use crate::instance::ShiftOrAny;
use crate::instance::Weekday;

fn min_bounds(context: &RuleContext<'_>, settings: &RuleSettings) -> MinBounds {
    MinBounds::new(
        settings.hard_min,
        settings.soft_min,
        context.weight(settings.min_cost),
    )
}

fn max_bounds(context: &RuleContext<'_>, settings: &RuleSettings) -> MaxBounds {
    MaxBounds::new(
        settings.soft_max,
        settings.hard_max,
        context.weight(settings.max_cost),
    )
}

/// Bounds the length of every run of `kind` for the selected staff.
fn runs_of(
    context: &mut RuleContext<'_>,
    rule: Rule,
    settings: &RuleSettings,
    kind: AggregateKind,
    exempt_midnight_staff: bool,
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;
    let bounds = max_bounds(context, settings);

    for staff in 0..context.instance.num_staff() {
        if exempt_midnight_staff && context.instance.staff()[staff].midnight_only {
            continue;
        }
        let name = context.name(rule, staff);
        let _ = add_soft_sequence_max(
            context.model,
            context.objective,
            aggregates.sequence(kind, staff),
            bounds,
            &Condition::None,
            &name,
        )?;
    }
    Ok(())
}

pub(super) fn max_days_worked(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    runs_of(
        context,
        Rule::MaxDaysWorked,
        settings,
        AggregateKind::Worked,
        false,
    )
}

pub(super) fn max_midnights_in_a_row(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    runs_of(
        context,
        Rule::MaxMidnightsInARow,
        settings,
        AggregateKind::Midnight,
        true,
    )
}

pub(super) fn late_shifts_in_a_row(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    runs_of(
        context,
        Rule::LateShiftsInARow,
        settings,
        AggregateKind::Late,
        false,
    )
}

pub(super) fn avoid_consecutive_full_time_shifts(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    runs_of(
        context,
        Rule::AvoidConsecutiveFullTimeShifts,
        settings,
        AggregateKind::FullTime,
        false,
    )
}

/// Days off after a block of midnight shifts; the block itself may run on.
pub(super) fn min_days_off_after_midnight(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;
    let bounds = min_bounds(context, settings);

    for staff in context.instance.staff_where(|member| !member.midnight_only) {
        let condition = Condition::Prior(Prior::continuing(
            aggregates.sequence(AggregateKind::Midnight, staff).to_vec(),
            vec![true],
        ));
        let name = context.name(Rule::MinDaysOffAfterMidnight, staff);
        let _ = add_soft_sequence_min(
            context.model,
            context.objective,
            aggregates.sequence(AggregateKind::Worked, staff),
            bounds,
            &condition,
            &name,
        )?;
    }
    Ok(())
}

/// After at least three days worked in a row, the next day off is followed by another one.
pub(super) fn days_off_after_consecutive_shifts(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;
    let bounds = min_bounds(context, settings);

    for staff in 0..context.instance.num_staff() {
        let worked = aggregates.sequence(AggregateKind::Worked, staff);
        let condition = Condition::Prior(Prior::continuing(worked.to_vec(), vec![true; 3]));
        let name = context.name(Rule::DaysOffAfterConsecutiveShifts, staff);
        let _ = add_soft_sequence_min(
            context.model,
            context.objective,
            worked,
            bounds,
            &condition,
            &name,
        )?;
    }
    Ok(())
}

/// Days off between a late shift and a later shift of the `next` kind.
pub(super) fn days_off_between_late_and(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
    rule: Rule,
    next: AggregateKind,
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;
    let bounds = min_bounds(context, settings);

    for staff in 0..context.instance.num_staff() {
        let condition = Condition::Both {
            prior: Prior::new(
                aggregates.sequence(AggregateKind::Late, staff).to_vec(),
                vec![true],
            ),
            post: Post::new(aggregates.sequence(next, staff).to_vec(), vec![true]),
        };
        let name = context.name(rule, staff);
        let _ = add_soft_sequence_min(
            context.model,
            context.objective,
            aggregates.sequence(AggregateKind::Worked, staff),
            bounds,
            &condition,
            &name,
        )?;
    }
    Ok(())
}

/// No more than a few late shifts within every period of consecutive days.
pub(super) fn late_shifts_in_period(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    if settings.period == 0 {
        return Err(ValidationError::EmptyDomain {
            rule: Rule::LateShiftsInPeriod.to_string(),
            what: "period",
        });
    }

    let aggregates = context.aggregates;
    let bounds = SumBounds::at_most(
        settings.soft_max as i64,
        settings.hard_max as i64,
        context.weight(settings.max_cost),
    );
    // A horizon shorter than the period is a single window.
    let period = settings.period.min(context.instance.num_days());

    for staff in 0..context.instance.num_staff() {
        let late = aggregates.sequence(AggregateKind::Late, staff);
        for (start, days) in window(late, period).enumerate() {
            let name = format!(
                "{}, days {start}..{}",
                context.name(Rule::LateShiftsInPeriod, staff),
                start + period
            );
            let _ = add_soft_sum(context.model, context.objective, days, bounds, &name)?;
        }
    }
    Ok(())
}

/// The evening before a requested day off carries no shift ending after 5 pm.
pub(super) fn no_late_shift_before_time_off(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    for staff in 0..context.instance.num_staff() {
        let days_off = context
            .instance
            .requests()
            .iter()
            .filter(|request| {
                request.staff == staff
                    && request.shift == ShiftOrAny::Any
                    && context.weight(request.weight) > 0
            })
            .map(|request| request.day)
            .collect::<Vec<_>>();
        if days_off.is_empty() {
            continue;
        }
        after_five_before_days_off(
            context,
            settings,
            Rule::NoLateShiftBeforeTimeOff,
            staff,
            &days_off,
        )?;
    }
    Ok(())
}

/// Avoid shifts ending after 5 pm on a Friday before a weekend off.
pub(super) fn no_night_shifts_before_weekend_off(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let saturdays = context.instance.calendar().days(Weekday::Saturday).to_vec();
    if saturdays.is_empty() {
        return Ok(());
    }
    for staff in 0..context.instance.num_staff() {
        after_five_before_days_off(
            context,
            settings,
            Rule::NoNightShiftsBeforeWeekendOff,
            staff,
            &saturdays,
        )?;
    }
    Ok(())
}

/// Bounds the after-five shifts directly before the given days whenever they are not worked.
fn after_five_before_days_off(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
    rule: Rule,
    staff: usize,
    days: &[usize],
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;
    let bounds = min_bounds(context, settings);
    let condition = Condition::Post(Post::new(context.off_on(staff, days), vec![false]));
    let name = context.name(rule, staff);
    let _ = add_soft_sequence_min(
        context.model,
        context.objective,
        aggregates.sequence(AggregateKind::AfterFive, staff),
        bounds,
        &condition,
        &name,
    )?;
    Ok(())
}

/// The day before an on-call shift only allows day shifts, and the day after allows none.
pub(super) fn on_call_rules(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let aggregates = context.aggregates;

    for staff in 0..context.instance.num_staff() {
        let on_call = aggregates.sequence(AggregateKind::OnCall, staff).to_vec();
        let name = context.name(Rule::OnCallRules, staff);

        let _ = forbid_min(
            context.model,
            aggregates.sequence(AggregateKind::AfterNineThirty, staff),
            settings.hard_min,
            &Condition::Post(Post::new(on_call.clone(), vec![true])),
            &format!("{name} before"),
        )?;
        let _ = forbid_min(
            context.model,
            aggregates.sequence(AggregateKind::Day, staff),
            settings.hard_min,
            &Condition::Prior(Prior::new(on_call, vec![true])),
            &format!("{name} after"),
        )?;
    }
    Ok(())
}
