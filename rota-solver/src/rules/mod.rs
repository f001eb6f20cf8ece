//! The catalog of scheduling rules.
//!
//! Every rule is compiled into hard constraints and penalty terms by calling the compilers of
//! [`rota_core::compiler`] on the assignment variables and their aggregates. Rules are enabled and
//! parameterised through [`RotaConfig`]; a disabled rule posts nothing.
mod coverage;
mod fairness;
mod requests;
mod rest;
mod transitions;

use std::fmt::Display;
use std::fmt::Formatter;

use enum_map::Enum;
use log::debug;
use rota_core::convert_case::Case;
use rota_core::convert_case::Casing;
use rota_core::error::ValidationError;
use rota_core::model::Model;
use rota_core::objective::ObjectiveBuilder;
use rota_core::variables::Literal;
use serde::Deserialize;

use crate::aggregates::AggregateKind;
use crate::aggregates::Aggregates;
use crate::aggregates::Works;
use crate::config::Cost;
use crate::config::Priorities;
use crate::config::Priority;
use crate::config::RotaConfig;
use crate::config::RuleSettings;
use crate::instance::Instance;
use fairness::Equalization;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    AllShiftsTaken,
    MaxDaysWorked,
    MinDaysOffAfterMidnight,
    MidnightStaffOnlyMidnights,
    NoMidnightsForNewStaff,
    MaxMidnightsInARow,
    FullTimeStaffOnlyFullTime,
    NoLateShiftBeforeTimeOff,
    OnCallRules,
    DaysOffAfterConsecutiveShifts,
    Transitions,
    DaysOffBetweenLateAndDay,
    DaysOffBetweenLateAndAfternoon,
    LateShiftsInARow,
    LateShiftsInPeriod,
    AvoidConsecutiveFullTimeShifts,
    EqualizeWeekends,
    EqualizeWeekdays,
    EqualizeMidnights,
    EqualizeLates,
    EqualizeDays,
    EqualizeAfternoons,
    MinimizeSplitWeekends,
    NoNightShiftsBeforeWeekendOff,
    ApplyRequests,
}

impl Rule {
    pub fn all() -> impl Iterator<Item = Rule> {
        (0..Rule::LENGTH).map(Rule::from_usize)
    }

    /// The parameters of the rule when the configuration does not override them.
    pub fn default_settings(self) -> RuleSettings {
        let defaults = RuleSettings::default();
        let medium = Cost::Priority(Priority::Medium);
        let low = Cost::Priority(Priority::Low);

        match self {
            Rule::MaxDaysWorked => RuleSettings {
                soft_max: 5,
                hard_max: 7,
                max_cost: medium,
                ..defaults
            },
            Rule::MinDaysOffAfterMidnight => RuleSettings {
                hard_min: 2,
                soft_min: 3,
                min_cost: medium,
                ..defaults
            },
            Rule::MaxMidnightsInARow => RuleSettings {
                soft_max: 1,
                hard_max: 2,
                max_cost: medium,
                ..defaults
            },
            Rule::NoLateShiftBeforeTimeOff | Rule::OnCallRules => RuleSettings {
                hard_min: 1,
                soft_min: 1,
                ..defaults
            },
            Rule::DaysOffAfterConsecutiveShifts | Rule::DaysOffBetweenLateAndAfternoon => {
                RuleSettings {
                    hard_min: 2,
                    soft_min: 2,
                    ..defaults
                }
            }
            Rule::Transitions => RuleSettings {
                max_cost: Cost::Priority(Priority::Highest),
                mid_cost: medium,
                ..defaults
            },
            Rule::DaysOffBetweenLateAndDay => RuleSettings {
                hard_min: 3,
                soft_min: 3,
                ..defaults
            },
            Rule::LateShiftsInARow => RuleSettings {
                soft_max: 2,
                hard_max: 3,
                max_cost: medium,
                ..defaults
            },
            Rule::LateShiftsInPeriod => RuleSettings {
                soft_max: 4,
                hard_max: 5,
                max_cost: low,
                period: 14,
                ..defaults
            },
            Rule::AvoidConsecutiveFullTimeShifts => RuleSettings {
                soft_max: 1,
                hard_max: 2,
                max_cost: low,
                ..defaults
            },
            Rule::MinimizeSplitWeekends => RuleSettings {
                cost: low,
                ..defaults
            },
            Rule::NoNightShiftsBeforeWeekendOff => RuleSettings {
                hard_min: 0,
                soft_min: 1,
                min_cost: Cost::Priority(Priority::High),
                ..defaults
            },
            Rule::AllShiftsTaken
            | Rule::MidnightStaffOnlyMidnights
            | Rule::NoMidnightsForNewStaff
            | Rule::FullTimeStaffOnlyFullTime
            | Rule::EqualizeWeekends
            | Rule::EqualizeWeekdays
            | Rule::EqualizeMidnights
            | Rule::EqualizeLates
            | Rule::EqualizeDays
            | Rule::EqualizeAfternoons
            | Rule::ApplyRequests => defaults,
        }
    }

    fn compile(
        self,
        context: &mut RuleContext<'_>,
        settings: &RuleSettings,
    ) -> Result<(), ValidationError> {
        match self {
            Rule::AllShiftsTaken => coverage::all_shifts_taken(context),
            Rule::MidnightStaffOnlyMidnights => coverage::midnight_staff_only_midnights(context),
            Rule::NoMidnightsForNewStaff => coverage::no_midnights_for_new_staff(context),
            Rule::FullTimeStaffOnlyFullTime => coverage::full_time_staff_only_full_time(context),
            Rule::MaxDaysWorked => rest::max_days_worked(context, settings),
            Rule::MinDaysOffAfterMidnight => rest::min_days_off_after_midnight(context, settings),
            Rule::MaxMidnightsInARow => rest::max_midnights_in_a_row(context, settings),
            Rule::NoLateShiftBeforeTimeOff => {
                rest::no_late_shift_before_time_off(context, settings)
            }
            Rule::OnCallRules => rest::on_call_rules(context, settings),
            Rule::DaysOffAfterConsecutiveShifts => {
                rest::days_off_after_consecutive_shifts(context, settings)
            }
            Rule::DaysOffBetweenLateAndDay => {
                rest::days_off_between_late_and(context, settings, self, AggregateKind::Day)
            }
            Rule::DaysOffBetweenLateAndAfternoon => {
                rest::days_off_between_late_and(context, settings, self, AggregateKind::Afternoon)
            }
            Rule::LateShiftsInARow => rest::late_shifts_in_a_row(context, settings),
            Rule::LateShiftsInPeriod => rest::late_shifts_in_period(context, settings),
            Rule::AvoidConsecutiveFullTimeShifts => {
                rest::avoid_consecutive_full_time_shifts(context, settings)
            }
            Rule::NoNightShiftsBeforeWeekendOff => {
                rest::no_night_shifts_before_weekend_off(context, settings)
            }
            Rule::Transitions => transitions::transitions(context, settings),
            Rule::EqualizeWeekends => fairness::equalize(context, Equalization::Weekends),
            Rule::EqualizeWeekdays => fairness::equalize(context, Equalization::Weekdays),
            Rule::EqualizeMidnights => fairness::equalize(context, Equalization::Midnights),
            Rule::EqualizeLates => fairness::equalize(context, Equalization::Lates),
            Rule::EqualizeDays => fairness::equalize(context, Equalization::Days),
            Rule::EqualizeAfternoons => fairness::equalize(context, Equalization::Afternoons),
            Rule::MinimizeSplitWeekends => fairness::minimize_split_weekends(context, settings),
            Rule::ApplyRequests => requests::apply_requests(context),
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{self:?}").to_case(Case::Snake))
    }
}

/// Everything a rule needs to post its constraints and penalties.
#[derive(Debug)]
pub struct RuleContext<'a> {
    pub model: &'a mut Model,
    pub objective: &'a mut ObjectiveBuilder,
    pub works: &'a Works,
    pub aggregates: &'a Aggregates,
    pub instance: &'a Instance,
    pub priorities: Priorities,
    /// The weight of every distribution penalty.
    pub fairness_weight: i64,
}

impl RuleContext<'_> {
    fn weight(&self, cost: Cost) -> i64 {
        self.priorities.weight(cost)
    }

    /// The name under which `rule` posts constraints and penalties for `staff`.
    fn name(&self, rule: Rule, staff: usize) -> String {
        format!("{rule}[{}]", self.instance.staff()[staff].name)
    }

    /// One literal per day which is `Worked[staff, day]` on the given days and the constant `true`
    /// on every other day; used as a post pattern with the choice `false` to match exactly the
    /// selected days which are not worked.
    fn off_on(&mut self, staff: usize, days: &[usize]) -> Vec<Literal> {
        let always = self.model.new_constant(true);
        (0..self.instance.num_days())
            .map(|day| {
                if days.contains(&day) {
                    self.aggregates.get(AggregateKind::Worked, staff, day)
                } else {
                    always
                }
            })
            .collect()
    }
}

/// Compiles every enabled rule of `config`.
pub fn compile_rules(
    context: &mut RuleContext<'_>,
    config: &RotaConfig,
) -> Result<(), ValidationError> {
    for (rule, settings) in config.all_settings() {
        if !settings.enabled {
            debug!("Skipping {rule}, it is disabled");
            continue;
        }

        let constraints = context.model.num_constraints();
        let terms = context.objective.len();
        rule.compile(context, &settings)?;
        debug!(
            "Compiled {rule}: {} constraints, {} penalty terms",
            context.model.num_constraints() - constraints,
            context.objective.len() - terms
        );
    }
    Ok(())
}
