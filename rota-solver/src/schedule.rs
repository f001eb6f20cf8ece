//! The solved assignment of staff to shifts, and its textual forms.
use std::fmt::Display;
use std::fmt::Formatter;

use rota_core::results::Solution;

use crate::aggregates::AggregateKind;
use crate::aggregates::Works;
use crate::instance::Instance;

/// For every staff member and day the shift worked, or `None` for a day off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    assignments: Vec<Option<usize>>,
    num_days: usize,
}

impl Schedule {
    pub fn from_solution(instance: &Instance, works: &Works, solution: &Solution) -> Schedule {
        let num_days = instance.num_days();
        let assignments = (0..instance.num_staff())
            .flat_map(|staff| (0..num_days).map(move |day| (staff, day)))
            .map(|(staff, day)| {
                works
                    .on_day(staff, day)
                    .iter()
                    .position(|&literal| solution.literal_value(literal))
            })
            .collect();
        Schedule {
            assignments,
            num_days,
        }
    }

    pub fn shift(&self, staff: usize, day: usize) -> Option<usize> {
        self.assignments[staff * self.num_days + day]
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn num_staff(&self) -> usize {
        self.assignments.len() / self.num_days.max(1)
    }

    /// The shifts of `staff`, day by day.
    pub fn shifts_of(&self, staff: usize) -> &[Option<usize>] {
        &self.assignments[staff * self.num_days..(staff + 1) * self.num_days]
    }

    /// The staff member working `shift` on `day`, if any.
    pub fn staff_on(&self, day: usize, shift: usize) -> Option<usize> {
        (0..self.num_staff()).find(|&staff| self.shift(staff, day) == Some(shift))
    }

    /// The number of days on which `staff` works a shift of the given kind.
    pub fn count(&self, instance: &Instance, staff: usize, kind: AggregateKind) -> usize {
        self.shifts_of(staff)
            .iter()
            .flatten()
            .filter(|&&shift| kind.includes(&instance.shifts()[shift]))
            .count()
    }

    /// The day-by-day roster.
    pub fn roster<'a>(&'a self, instance: &'a Instance) -> Roster<'a> {
        Roster {
            schedule: self,
            instance,
        }
    }

    /// The shift counts of every staff member.
    pub fn summary<'a>(&'a self, instance: &'a Instance) -> Summary<'a> {
        Summary {
            schedule: self,
            instance,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Roster<'a> {
    schedule: &'a Schedule,
    instance: &'a Instance,
}

impl Display for Roster<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for day in 0..self.schedule.num_days() {
            writeln!(
                f,
                "Day {} ({:?})",
                day + 1,
                self.instance.calendar().weekday(day)
            )?;
            for (index, shift) in self.instance.shifts().iter().enumerate() {
                let staff = self
                    .schedule
                    .staff_on(day, index)
                    .map_or("-", |staff| self.instance.staff()[staff].name.as_str());
                writeln!(f, "  {:<20} {staff}", shift.label)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Summary<'a> {
    schedule: &'a Schedule,
    instance: &'a Instance,
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<12} {:>6} {:>8} {:>6} {:>6} {:>10} {:>8}",
            "staff", "worked", "weekend", "day", "late", "midnight", "on call"
        )?;
        let weekends = self.instance.calendar().weekends();
        for (staff, member) in self.instance.staff().iter().enumerate() {
            let weekend_days = weekends
                .iter()
                .filter(|&&day| self.schedule.shift(staff, day).is_some())
                .count();
            let count = |kind| self.schedule.count(self.instance, staff, kind);
            writeln!(
                f,
                "{:<12} {:>6} {:>8} {:>6} {:>6} {:>10} {:>8}",
                member.name,
                count(AggregateKind::Worked),
                weekend_days,
                count(AggregateKind::Day),
                count(AggregateKind::Late),
                count(AggregateKind::Midnight),
                count(AggregateKind::OnCall),
            )?;
        }
        Ok(())
    }
}
