//! Spreading the load evenly over the staff.
use log::debug;
use rota_core::compiler::distribution;
use rota_core::compiler::penalize_split_pair;
use rota_core::error::ValidationError;

use super::Rule;
use super::RuleContext;
use crate::aggregates::AggregateKind;
use crate::config::RuleSettings;
use crate::instance::Instance;
use crate::instance::Weekday;

/// What an equalization rule spreads evenly over the staff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Equalization {
    Weekends,
    Weekdays,
    Midnights,
    Lates,
    Days,
    Afternoons,
}

impl Equalization {
    /// The rule under which the penalties are named and logged.
    fn rule(self) -> Rule {
        match self {
            Equalization::Weekends => Rule::EqualizeWeekends,
            Equalization::Weekdays => Rule::EqualizeWeekdays,
            Equalization::Midnights => Rule::EqualizeMidnights,
            Equalization::Lates => Rule::EqualizeLates,
            Equalization::Days => Rule::EqualizeDays,
            Equalization::Afternoons => Rule::EqualizeAfternoons,
        }
    }

    /// The aggregate and the days which are counted.
    fn counted(self, instance: &Instance) -> (AggregateKind, Vec<usize>) {
        let calendar = instance.calendar();
        let every_day = || (0..instance.num_days()).collect();
        match self {
            Equalization::Weekends => (AggregateKind::Worked, calendar.weekends()),
            Equalization::Weekdays => (AggregateKind::Worked, calendar.weekdays()),
            Equalization::Midnights => (AggregateKind::Midnight, every_day()),
            Equalization::Lates => (AggregateKind::Late, every_day()),
            Equalization::Days => (AggregateKind::Day, every_day()),
            Equalization::Afternoons => (AggregateKind::Afternoon, every_day()),
        }
    }
}

/// The fair share of every staff member: the shifts to be covered on the counted days, divided
/// over the staff and rounded up.
fn target(instance: &Instance, kind: AggregateKind, days: usize) -> i64 {
    let slots = instance
        .shifts()
        .iter()
        .filter(|shift| kind.includes(shift))
        .count();
    (slots * days).div_ceil(instance.num_staff()) as i64
}

pub(super) fn equalize(
    context: &mut RuleContext<'_>,
    equalization: Equalization,
) -> Result<(), ValidationError> {
    let instance = context.instance;
    let aggregates = context.aggregates;
    let rule = equalization.rule();
    let (kind, days) = equalization.counted(instance);
    let target = target(instance, kind, days.len());
    if days.is_empty() || target == 0 {
        debug!("{rule} has nothing to equalize");
        return Ok(());
    }

    for staff in 0..instance.num_staff() {
        let literals = days
            .iter()
            .map(|&day| aggregates.get(kind, staff, day))
            .collect::<Vec<_>>();
        let name = context.name(rule, staff);
        let _ = distribution(
            context.model,
            context.objective,
            &literals,
            target,
            context.fairness_weight,
            &name,
        )?;
    }
    Ok(())
}

/// Penalises weekends on which only one of Saturday and Sunday is worked.
pub(super) fn minimize_split_weekends(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let instance = context.instance;
    let aggregates = context.aggregates;
    let cost = context.weight(settings.cost);
    let weekends = instance
        .calendar()
        .days(Weekday::Saturday)
        .iter()
        .copied()
        .filter(|&saturday| saturday + 1 < instance.num_days())
        .collect::<Vec<_>>();

    for staff in 0..instance.num_staff() {
        let name = context.name(Rule::MinimizeSplitWeekends, staff);
        for &saturday in &weekends {
            let _ = penalize_split_pair(
                context.model,
                context.objective,
                aggregates.get(AggregateKind::Worked, staff, saturday),
                aggregates.get(AggregateKind::Worked, staff, saturday + 1),
                cost,
                &format!("{name}, day {saturday}"),
            )?;
        }
    }
    Ok(())
}
