//! Penalties on the change of start time from one day to the next.
use itertools::Itertools;
use rota_core::compiler::transition_penalty;
use rota_core::error::ValidationError;

use super::Rule;
use super::RuleContext;
use crate::config::Cost;
use crate::config::RuleSettings;
use crate::instance::Shift;
use crate::instance::ShiftCategory;

/// Starting more than this many minutes later than the day before costs `max_cost`.
const LATER_START_LIMIT: i64 = 150;
/// Starting more than this many minutes earlier than the day before costs `mid_cost`.
const EARLIER_START_LIMIT: i64 = 90;

/// Which of the two costs applies when `next` is worked the day after `previous`, if any.
fn transition_cost(previous: &Shift, next: &Shift, settings: &RuleSettings) -> Option<Cost> {
    let gap = next.start_minutes() - previous.start_minutes();
    if gap > LATER_START_LIMIT {
        Some(settings.max_cost)
    } else if gap < -EARLIER_START_LIMIT {
        Some(settings.mid_cost)
    } else {
        None
    }
}

pub(super) fn transitions(
    context: &mut RuleContext<'_>,
    settings: &RuleSettings,
) -> Result<(), ValidationError> {
    let instance = context.instance;
    let works = context.works;
    let shifts = instance.shifts_where(|shift| !shift.is(ShiftCategory::OnCall));

    let penalised = shifts
        .iter()
        .copied()
        .permutations(2)
        .filter_map(|pair| {
            let (previous, next) = (pair[0], pair[1]);
            let cost = transition_cost(
                &instance.shifts()[previous],
                &instance.shifts()[next],
                settings,
            )?;
            let weight = context.weight(cost);
            (weight != 0).then_some((previous, next, weight))
        })
        .collect::<Vec<_>>();

    for staff in 0..instance.num_staff() {
        let name = context.name(Rule::Transitions, staff);
        for (day, &(previous, next, weight)) in
            (1..instance.num_days()).cartesian_product(penalised.iter())
        {
            let _ = transition_penalty(
                context.model,
                context.objective,
                works.get(staff, day - 1, previous),
                works.get(staff, day, next),
                weight,
                &format!(
                    "{name}, day {day}: {} to {}",
                    instance.shifts()[previous].label,
                    instance.shifts()[next].label
                ),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    #[test]
    fn start_time_gaps_select_the_tier() {
        let settings = Rule::Transitions.default_settings();
        let roster = Instance::default_roster();
        let shift = |index: usize| &roster.shifts()[index];

        // 1800 followed by 0700 starts eleven hours earlier.
        assert_eq!(
            transition_cost(shift(7), shift(0), &settings),
            Some(settings.mid_cost)
        );
        // 0700 followed by 1200 starts five hours later.
        assert_eq!(
            transition_cost(shift(0), shift(3), &settings),
            Some(settings.max_cost)
        );
        // 1800 followed by 2000 is within both limits.
        assert_eq!(transition_cost(shift(7), shift(8), &settings), None);
        assert_eq!(transition_cost(shift(1), shift(2), &settings), None);
    }
}
