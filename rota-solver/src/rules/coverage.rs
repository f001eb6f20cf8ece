//! Which staff may or must work which shifts.
use itertools::iproduct;
use rota_core::compiler::exactly_one;
use rota_core::compiler::x_shifts_only;
use rota_core::error::ValidationError;

use super::Rule;
use super::RuleContext;
use crate::instance::Shift;
use crate::instance::ShiftCategory;
use crate::instance::Staff;

/// Every shift of every day is worked by exactly one staff member.
pub(super) fn all_shifts_taken(context: &mut RuleContext<'_>) -> Result<(), ValidationError> {
    let instance = context.instance;
    for (day, shift) in iproduct!(0..instance.num_days(), 0..instance.num_shifts()) {
        let name = format!(
            "{}[day {day}, {}]",
            Rule::AllShiftsTaken,
            instance.shifts()[shift].label
        );
        exactly_one(context.model, &context.works.covering(day, shift), &name)?;
    }
    Ok(())
}

pub(super) fn midnight_staff_only_midnights(
    context: &mut RuleContext<'_>,
) -> Result<(), ValidationError> {
    exclude_shifts(
        context,
        Rule::MidnightStaffOnlyMidnights,
        |member| member.midnight_only,
        |shift| !shift.is(ShiftCategory::Midnight),
    )
}

pub(super) fn no_midnights_for_new_staff(
    context: &mut RuleContext<'_>,
) -> Result<(), ValidationError> {
    exclude_shifts(
        context,
        Rule::NoMidnightsForNewStaff,
        |member| member.new_hire,
        |shift| shift.is(ShiftCategory::Midnight),
    )
}

pub(super) fn full_time_staff_only_full_time(
    context: &mut RuleContext<'_>,
) -> Result<(), ValidationError> {
    exclude_shifts(
        context,
        Rule::FullTimeStaffOnlyFullTime,
        |member| member.full_time_only,
        |shift| !shift.is(ShiftCategory::FullTime),
    )
}

/// The selected staff never work the excluded shifts, on any day.
fn exclude_shifts(
    context: &mut RuleContext<'_>,
    rule: Rule,
    staff: impl Fn(&Staff) -> bool,
    excluded: impl Fn(&Shift) -> bool,
) -> Result<(), ValidationError> {
    let instance = context.instance;
    let works = context.works;
    let excluded = instance.shifts_where(excluded);

    for member in instance.staff_where(staff) {
        let name = context.name(rule, member);
        let literals = iproduct!(0..instance.num_days(), excluded.iter())
            .map(|(day, &shift)| works.get(member, day, shift));
        x_shifts_only(context.model, literals, &name)?;
    }
    Ok(())
}
