use rota_core::error::ValidationError;

use super::Rule;
use super::RuleContext;
use crate::aggregates::AggregateKind;
use crate::instance::ShiftOrAny;

/// Every request adds its weight to the objective when the requested assignment is worked.
pub(super) fn apply_requests(context: &mut RuleContext<'_>) -> Result<(), ValidationError> {
    let instance = context.instance;

    for request in instance.requests() {
        let weight = context.weight(request.weight);
        if weight == 0 {
            continue;
        }
        let (literal, what) = match request.shift {
            ShiftOrAny::Any => (
                context
                    .aggregates
                    .get(AggregateKind::Worked, request.staff, request.day),
                "any shift".to_owned(),
            ),
            ShiftOrAny::Shift(shift) => (
                context.works.get(request.staff, request.day, shift),
                instance.shifts()[shift].label.clone(),
            ),
        };
        let name = format!(
            "{}, day {}: {what}",
            context.name(Rule::ApplyRequests, request.staff),
            request.day
        );
        context.objective.add_term(name, literal, weight);
    }
    Ok(())
}
