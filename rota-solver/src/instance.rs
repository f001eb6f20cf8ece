//! The static data of a scheduling problem: who can work, which shifts have to be covered, on
//! which days, and what the staff asked for.
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use enum_map::Enum;
use enum_map::EnumMap;
use enumset::EnumSet;
use enumset::EnumSetType;
use rota_core::containers::HashMap;
use rota_core::containers::HashSet;
use serde::Deserialize;
use serde::Serialize;

use crate::config::Cost;
use crate::config::Priority;
use crate::error::RotaError;

/// The groupings of shifts which rules and aggregates are expressed over.
#[derive(Debug, Hash, EnumSetType, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    Midnight,
    Late,
    Day,
    Afternoon,
    FullTime,
    OnCall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    fn from_index(index: usize) -> Weekday {
        Weekday::from_usize(index % Weekday::LENGTH)
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

/// The days of the planning horizon and the weekday each of them falls on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    first_weekday: Weekday,
    num_days: usize,
    days_by_weekday: EnumMap<Weekday, Vec<usize>>,
}

impl Calendar {
    pub fn new(first_weekday: Weekday, num_days: usize) -> Calendar {
        let mut days_by_weekday: EnumMap<Weekday, Vec<usize>> = EnumMap::default();
        for day in 0..num_days {
            days_by_weekday[Weekday::from_index(first_weekday.into_usize() + day)].push(day);
        }
        Calendar {
            first_weekday,
            num_days,
            days_by_weekday,
        }
    }

    /// The calendar of a whole month; `month` counts from 1.
    pub fn month(year: i32, month: u32) -> Result<Calendar, RotaError> {
        if !(1..=12).contains(&month) {
            return Err(RotaError::invalid_instance(format!(
                "month {month} is not between 1 and 12"
            )));
        }
        Ok(Calendar::new(
            weekday_of(year, month, 1),
            days_in_month(year, month),
        ))
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub fn weekday(&self, day: usize) -> Weekday {
        Weekday::from_index(self.first_weekday.into_usize() + day)
    }

    /// The days which fall on `weekday`, in increasing order.
    pub fn days(&self, weekday: Weekday) -> &[usize] {
        &self.days_by_weekday[weekday]
    }

    pub fn weekdays(&self) -> Vec<usize> {
        (0..self.num_days)
            .filter(|&day| !self.weekday(day).is_weekend())
            .collect()
    }

    pub fn weekends(&self) -> Vec<usize> {
        (0..self.num_days)
            .filter(|&day| self.weekday(day).is_weekend())
            .collect()
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> usize {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Sakamoto's method.
fn weekday_of(year: i32, month: u32, day: u32) -> Weekday {
    const OFFSETS: [i32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let year = if month < 3 { year - 1 } else { year };
    let from_sunday = (year + year.div_euclid(4) - year.div_euclid(100)
        + year.div_euclid(400)
        + OFFSETS[month as usize - 1]
        + day as i32)
        .rem_euclid(7);
    Weekday::from_index(from_sunday as usize + 6)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Staff {
    pub name: String,
    pub midnight_only: bool,
    pub full_time_only: bool,
    /// Within the first six months, which excludes midnight shifts.
    pub new_hire: bool,
    pub productivity_rank: u32,
}

impl Staff {
    pub fn named(name: impl Into<String>) -> Staff {
        Staff {
            name: name.into(),
            ..Staff::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shift {
    pub label: String,
    /// The start as `(hour, minute)` on a 24 hour clock.
    pub start: (u32, u32),
    pub duration_minutes: u32,
    #[serde(default)]
    pub categories: EnumSet<ShiftCategory>,
}

impl Shift {
    pub fn new(
        label: impl Into<String>,
        start: (u32, u32),
        duration_minutes: u32,
        categories: impl Into<EnumSet<ShiftCategory>>,
    ) -> Shift {
        Shift {
            label: label.into(),
            start,
            duration_minutes,
            categories: categories.into(),
        }
    }

    pub fn start_minutes(&self) -> i64 {
        i64::from(self.start.0) * 60 + i64::from(self.start.1)
    }

    pub fn is(&self, category: ShiftCategory) -> bool {
        self.categories.contains(category)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftOrAny {
    /// Any shift, or in other words the whole day.
    Any,
    Shift(usize),
}

/// A wish of one staff member. A positive weight asks to avoid the assignment, a negative one
/// asks for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub staff: usize,
    pub day: usize,
    pub shift: ShiftOrAny,
    pub weight: Cost,
}

impl Request {
    /// A request to have `day` off.
    pub fn day_off(staff: usize, day: usize, weight: impl Into<Cost>) -> Request {
        Request {
            staff,
            day,
            shift: ShiftOrAny::Any,
            weight: weight.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    staff: Vec<Staff>,
    shifts: Vec<Shift>,
    calendar: Calendar,
    requests: Vec<Request>,
}

impl Instance {
    pub fn new(
        staff: Vec<Staff>,
        shifts: Vec<Shift>,
        calendar: Calendar,
        requests: Vec<Request>,
    ) -> Result<Instance, RotaError> {
        if staff.is_empty() {
            return Err(RotaError::invalid_instance("there are no staff"));
        }
        if shifts.is_empty() {
            return Err(RotaError::invalid_instance("there are no shifts"));
        }
        if calendar.num_days() == 0 {
            return Err(RotaError::invalid_instance("the calendar has no days"));
        }

        let mut names: HashSet<&String> = HashSet::default();
        if let Some(member) = staff.iter().find(|member| !names.insert(&member.name)) {
            return Err(RotaError::invalid_instance(format!(
                "the staff member '{}' is listed twice",
                member.name
            )));
        }
        let mut labels: HashSet<&String> = HashSet::default();
        if let Some(shift) = shifts.iter().find(|shift| !labels.insert(&shift.label)) {
            return Err(RotaError::invalid_instance(format!(
                "the shift '{}' is listed twice",
                shift.label
            )));
        }
        if let Some(shift) = shifts
            .iter()
            .find(|shift| shift.start.0 >= 24 || shift.start.1 >= 60 || shift.duration_minutes == 0)
        {
            return Err(RotaError::invalid_instance(format!(
                "the shift '{}' has an invalid start or duration",
                shift.label
            )));
        }

        for request in &requests {
            let shift_in_range = match request.shift {
                ShiftOrAny::Any => true,
                ShiftOrAny::Shift(shift) => shift < shifts.len(),
            };
            if request.staff >= staff.len() || request.day >= calendar.num_days() || !shift_in_range
            {
                return Err(RotaError::invalid_instance(format!(
                    "the request {request:?} is out of range"
                )));
            }
        }

        Ok(Instance {
            staff,
            shifts,
            calendar,
            requests,
        })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Instance, RotaError> {
        let contents = std::fs::read_to_string(path)?;
        Instance::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Instance, RotaError> {
        let file: InstanceFile = toml::from_str(contents)?;
        file.resolve()
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn num_staff(&self) -> usize {
        self.staff.len()
    }

    pub fn num_shifts(&self) -> usize {
        self.shifts.len()
    }

    pub fn num_days(&self) -> usize {
        self.calendar.num_days()
    }

    /// The shifts which belong to `category`.
    pub fn shifts_in(&self, category: ShiftCategory) -> Vec<usize> {
        self.shifts_where(|shift| shift.is(category))
    }

    pub fn shifts_where(&self, predicate: impl Fn(&Shift) -> bool) -> Vec<usize> {
        self.shifts
            .iter()
            .enumerate()
            .filter(|(_, shift)| predicate(shift))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn staff_where(&self, predicate: impl Fn(&Staff) -> bool) -> Vec<usize> {
        self.staff
            .iter()
            .enumerate()
            .filter(|(_, member)| predicate(member))
            .map(|(index, _)| index)
            .collect()
    }

    /// The 20 staff and 12 shifts of the roster for January 2021.
    pub fn default_roster() -> Instance {
        use ShiftCategory::*;

        let staff = [
            ("Olivia", 0),
            ("Emma", 1),
            ("Ava", 1),
            ("Charlotte", 1),
            ("Sophia", 0),
            ("Amelia", 0),
            ("Isabella", 1),
            ("Mia", 1),
            ("Evelyn", 1),
            ("Harper", 0),
            ("Camila", 0),
            ("Gianna", 0),
            ("Abigail", 0),
            ("Luna", 0),
            ("Ella", 0),
            ("Elizabeth", 0),
            ("Sofia", 1),
            ("Emily", 1),
            ("Avery", 0),
            ("Mila", 1),
        ]
        .into_iter()
        .map(|(name, productivity_rank)| Staff {
            productivity_rank,
            ..Staff::named(name)
        })
        .collect();

        let shifts = vec![
            Shift::new("0700 - 1500", (7, 0), 480, Day),
            Shift::new("0730 - 1530 (FT)", (7, 30), 480, Day | FullTime),
            Shift::new("0930 - 1730", (9, 30), 480, Day),
            Shift::new("1200 - 2000", (12, 0), 480, Afternoon),
            Shift::new("1400 - 2200", (14, 0), 480, Afternoon),
            Shift::new("1530 - 2330 (FT)", (15, 30), 480, Afternoon | FullTime),
            Shift::new("1600 - 2400", (16, 0), 480, Afternoon),
            Shift::new("1800 - 0200", (18, 0), 480, Late),
            Shift::new("2000 - 0400", (20, 0), 480, Late),
            Shift::new("2200 - 0400", (22, 0), 360, Late),
            Shift::new("2359 - 0700", (23, 59), 421, Midnight),
            Shift::new("On call (22:00)", (22, 0), 480, OnCall),
        ];

        let calendar = Calendar::new(Weekday::Friday, 31);
        Instance {
            staff,
            shifts,
            calendar,
            requests: vec![],
        }
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} staff, {} shifts, {} days starting on a {:?}, {} requests",
            self.num_staff(),
            self.num_shifts(),
            self.num_days(),
            self.calendar.first_weekday(),
            self.requests.len()
        )
    }
}

/// The layout of an instance file, before names are resolved to indices.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceFile {
    staff: Vec<Staff>,
    /// The shifts of the default roster when absent.
    shifts: Option<Vec<Shift>>,
    calendar: CalendarEntry,
    #[serde(default)]
    requests: Vec<RequestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CalendarEntry {
    Month { year: i32, month: u32 },
    Days { first_weekday: Weekday, days: usize },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestEntry {
    staff: String,
    day: usize,
    /// The label of the shift; the whole day when absent.
    shift: Option<String>,
    #[serde(default = "default_request_weight")]
    weight: Cost,
}

fn default_request_weight() -> Cost {
    Cost::Priority(Priority::High)
}

impl InstanceFile {
    fn resolve(self) -> Result<Instance, RotaError> {
        let shifts = match self.shifts {
            Some(shifts) => shifts,
            None => Instance::default_roster().shifts,
        };
        let calendar = match self.calendar {
            CalendarEntry::Month { year, month } => Calendar::month(year, month)?,
            CalendarEntry::Days {
                first_weekday,
                days,
            } => Calendar::new(first_weekday, days),
        };

        let staff_by_name: HashMap<&str, usize> = self
            .staff
            .iter()
            .enumerate()
            .map(|(index, member)| (member.name.as_str(), index))
            .collect();
        let shift_by_label: HashMap<&str, usize> = shifts
            .iter()
            .enumerate()
            .map(|(index, shift)| (shift.label.as_str(), index))
            .collect();

        let requests = self
            .requests
            .iter()
            .map(|entry| {
                let staff = *staff_by_name.get(entry.staff.as_str()).ok_or_else(|| {
                    RotaError::invalid_instance(format!(
                        "a request names the unknown staff member '{}'",
                        entry.staff
                    ))
                })?;
                let shift = match &entry.shift {
                    None => ShiftOrAny::Any,
                    Some(label) => {
                        ShiftOrAny::Shift(*shift_by_label.get(label.as_str()).ok_or_else(
                            || {
                                RotaError::invalid_instance(format!(
                                    "a request names the unknown shift '{label}'"
                                ))
                            },
                        )?)
                    }
                };
                Ok(Request {
                    staff,
                    day: entry.day,
                    shift,
                    weight: entry.weight,
                })
            })
            .collect::<Result<Vec<_>, RotaError>>()?;

        Instance::new(self.staff, shifts, calendar, requests)
    }
}
