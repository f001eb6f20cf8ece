//! The assignment variables and the per-staff-per-day aggregates derived from them.
use std::fmt::Display;
use std::fmt::Formatter;

use enum_map::Enum;
use enum_map::EnumMap;
use itertools::iproduct;
use rota_core::model::Model;
use rota_core::variables::LinearExpr;
use rota_core::variables::Literal;

use crate::instance::Instance;
use crate::instance::Shift;
use crate::instance::ShiftCategory;

/// The boolean `works[staff, day, shift]` for every staff member, day and shift, stored densely in
/// staff-major order.
#[derive(Clone, Debug)]
pub struct Works {
    literals: Vec<Literal>,
    num_staff: usize,
    num_days: usize,
    num_shifts: usize,
}

impl Works {
    pub fn new(model: &mut Model, instance: &Instance) -> Works {
        let literals = iproduct!(
            0..instance.num_staff(),
            0..instance.num_days(),
            0..instance.num_shifts()
        )
        .map(|(staff, day, shift)| {
            Literal::from(model.new_bool_var(format!("works_s{staff}d{day}s{shift}")))
        })
        .collect();

        Works {
            literals,
            num_staff: instance.num_staff(),
            num_days: instance.num_days(),
            num_shifts: instance.num_shifts(),
        }
    }

    fn index(&self, staff: usize, day: usize, shift: usize) -> usize {
        (staff * self.num_days + day) * self.num_shifts + shift
    }

    pub fn get(&self, staff: usize, day: usize, shift: usize) -> Literal {
        self.literals[self.index(staff, day, shift)]
    }

    /// The literals of every shift of `staff` on `day`.
    pub fn on_day(&self, staff: usize, day: usize) -> &[Literal] {
        let start = self.index(staff, day, 0);
        &self.literals[start..start + self.num_shifts]
    }

    /// The literals of every staff member for `shift` on `day`.
    pub fn covering(&self, day: usize, shift: usize) -> Vec<Literal> {
        (0..self.num_staff)
            .map(|staff| self.get(staff, day, shift))
            .collect()
    }

    pub fn all(&self) -> &[Literal] {
        &self.literals
    }
}

/// The kinds of aggregate: whether a staff member works a shift of some kind on a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum AggregateKind {
    /// Any shift.
    Worked,
    Midnight,
    Late,
    /// Shifts ending after 5 pm: late and midnight shifts.
    AfterFive,
    /// Every shift which is not a day shift.
    AfterNineThirty,
    Day,
    Afternoon,
    FullTime,
    OnCall,
}

impl AggregateKind {
    pub fn includes(self, shift: &Shift) -> bool {
        match self {
            AggregateKind::Worked => true,
            AggregateKind::Midnight => shift.is(ShiftCategory::Midnight),
            AggregateKind::Late => shift.is(ShiftCategory::Late),
            AggregateKind::AfterFive => {
                shift.is(ShiftCategory::Late) || shift.is(ShiftCategory::Midnight)
            }
            AggregateKind::AfterNineThirty => !shift.is(ShiftCategory::Day),
            AggregateKind::Day => shift.is(ShiftCategory::Day),
            AggregateKind::Afternoon => shift.is(ShiftCategory::Afternoon),
            AggregateKind::FullTime => shift.is(ShiftCategory::FullTime),
            AggregateKind::OnCall => shift.is(ShiftCategory::OnCall),
        }
    }
}

impl Display for AggregateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggregateKind::Worked => "worked",
            AggregateKind::Midnight => "midnight",
            AggregateKind::Late => "late",
            AggregateKind::AfterFive => "after_five",
            AggregateKind::AfterNineThirty => "after_nine_thirty",
            AggregateKind::Day => "day",
            AggregateKind::Afternoon => "afternoon",
            AggregateKind::FullTime => "full_time",
            AggregateKind::OnCall => "on_call",
        };
        write!(f, "{name}")
    }
}

/// One boolean per staff member and day for every [`AggregateKind`], equal to the number of shifts
/// of that kind worked on that day.
///
/// Since an aggregate is boolean, the `Worked` aggregate also allows at most one shift per staff
/// member and day.
#[derive(Clone, Debug)]
pub struct Aggregates {
    literals: EnumMap<AggregateKind, Vec<Literal>>,
    num_days: usize,
}

impl Aggregates {
    pub fn new(model: &mut Model, instance: &Instance, works: &Works) -> Aggregates {
        let mut literals: EnumMap<AggregateKind, Vec<Literal>> = EnumMap::default();

        for (kind, table) in literals.iter_mut() {
            let shifts = instance.shifts_where(|shift| kind.includes(shift));
            for (staff, day) in iproduct!(0..instance.num_staff(), 0..instance.num_days()) {
                let aggregate = Literal::from(model.new_bool_var(format!("{kind}_s{staff}d{day}")));
                let sum = LinearExpr::sum(shifts.iter().map(|&shift| works.get(staff, day, shift)));
                model
                    .add_equality(aggregate, sum)
                    .with_name(format!("{kind}_s{staff}d{day}"))
                    .post();
                table.push(aggregate);
            }
        }

        Aggregates {
            literals,
            num_days: instance.num_days(),
        }
    }

    pub fn get(&self, kind: AggregateKind, staff: usize, day: usize) -> Literal {
        self.literals[kind][staff * self.num_days + day]
    }

    /// The aggregate of `staff` for every day, in order.
    pub fn sequence(&self, kind: AggregateKind, staff: usize) -> &[Literal] {
        let start = staff * self.num_days;
        &self.literals[kind][start..start + self.num_days]
    }
}

#[cfg(test)]
mod tests {
    use rota_core::engine::SolveParameters;
    use rota_core::engine::Solver;
    use rota_core::results::SatisfactionResult;
    use rota_core::termination::Indefinite;

    use super::*;
    use crate::instance::Calendar;
    use crate::instance::Staff;
    use crate::instance::Weekday;

    fn instance() -> Instance {
        Instance::new(
            vec![Staff::named("Ann"), Staff::named("Bo")],
            vec![
                Shift::new("early", (7, 0), 480, ShiftCategory::Day),
                Shift::new("late", (18, 0), 480, ShiftCategory::Late),
                Shift::new("night", (23, 59), 421, ShiftCategory::Midnight),
            ],
            Calendar::new(Weekday::Monday, 2),
            vec![],
        )
        .expect("valid instance")
    }

    #[test]
    fn works_are_indexed_staff_major() {
        let mut model = Model::default();
        let works = Works::new(&mut model, &instance());

        assert_eq!(works.all().len(), 12);
        assert_eq!(works.on_day(1, 0), &works.all()[6..9]);
        assert_eq!(works.get(1, 1, 2), works.all()[11]);
        assert_eq!(works.covering(1, 2), vec![works.get(0, 1, 2), works.get(1, 1, 2)]);
    }

    #[test]
    fn aggregates_follow_the_assignment() {
        let instance = instance();
        let mut model = Model::default();
        let works = Works::new(&mut model, &instance);
        let aggregates = Aggregates::new(&mut model, &instance, &works);
        model.add_bool_and([works.get(0, 1, 2)]).post();

        let SatisfactionResult::Satisfiable(solution) =
            Solver::new(&model, SolveParameters::default()).satisfy(Indefinite)
        else {
            panic!("the assignment is satisfiable");
        };

        assert!(solution.literal_value(aggregates.get(AggregateKind::Worked, 0, 1)));
        assert!(solution.literal_value(aggregates.get(AggregateKind::Midnight, 0, 1)));
        assert!(solution.literal_value(aggregates.get(AggregateKind::AfterFive, 0, 1)));
        assert!(solution.literal_value(aggregates.get(AggregateKind::AfterNineThirty, 0, 1)));
        assert!(!solution.literal_value(aggregates.get(AggregateKind::Late, 0, 1)));
        assert!(!solution.literal_value(aggregates.get(AggregateKind::Day, 0, 1)));
        assert_eq!(aggregates.sequence(AggregateKind::Worked, 0).len(), 2);
    }

    #[test]
    fn at_most_one_shift_per_day() {
        let instance = instance();
        let mut model = Model::default();
        let works = Works::new(&mut model, &instance);
        let _ = Aggregates::new(&mut model, &instance, &works);
        model
            .add_bool_and([works.get(0, 0, 0), works.get(0, 0, 1)])
            .post();

        assert!(matches!(
            Solver::new(&model, SolveParameters::default()).satisfy(Indefinite),
            SatisfactionResult::Unsatisfiable
        ));
    }
}
