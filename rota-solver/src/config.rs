//! The rule configuration, read from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration. Rules are configured by
//! name under `[rules.<name>]`; the fields given there override the defaults of that rule.
//!
//! ```
//! # use rota_solver::config::RotaConfig;
//! # use rota_solver::rules::Rule;
//! let config = RotaConfig::from_toml_str(
//!     r#"
//!     fairness_weight = 3
//!
//!     [rules.max_days_worked]
//!     soft_max = 4
//!     max_cost = "high"
//!
//!     [rules.transitions]
//!     enabled = false
//!     "#,
//! )
//! .unwrap();
//!
//! let settings = config.settings(Rule::MaxDaysWorked);
//! assert_eq!((settings.hard_max, settings.soft_max), (7, 4));
//! assert_eq!(config.priorities.weight(settings.max_cost), 40);
//! assert!(!config.settings(Rule::Transitions).enabled);
//! ```
use std::path::Path;

use enum_map::EnumMap;
use rota_core::containers::HashMap;
use serde::Deserialize;

use crate::error::RotaError;
use crate::rules::Rule;

/// The named cost levels. Each is four times a triangle number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Debug,
    Highest,
    High,
    Medium,
    Low,
}

/// A cost given either by priority level or as a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Cost {
    Priority(Priority),
    Fixed(i64),
}

impl From<Priority> for Cost {
    fn from(priority: Priority) -> Self {
        Cost::Priority(priority)
    }
}

impl From<i64> for Cost {
    fn from(cost: i64) -> Self {
        Cost::Fixed(cost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Priorities {
    pub debug: i64,
    pub highest: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl Default for Priorities {
    fn default() -> Self {
        let level = |n: i64| n * (n + 1) / 2 * 4;
        Priorities {
            debug: level(8),
            highest: level(5),
            high: level(4),
            medium: level(3),
            low: level(2),
        }
    }
}

impl Priorities {
    pub fn weight(&self, cost: Cost) -> i64 {
        match cost {
            Cost::Fixed(cost) => cost,
            Cost::Priority(Priority::Debug) => self.debug,
            Cost::Priority(Priority::Highest) => self.highest,
            Cost::Priority(Priority::High) => self.high,
            Cost::Priority(Priority::Medium) => self.medium,
            Cost::Priority(Priority::Low) => self.low,
        }
    }
}

/// The fields of `[rules.<name>]`; anything left out keeps the default of that rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOverride {
    pub enabled: Option<bool>,
    pub hard_min: Option<usize>,
    pub soft_min: Option<usize>,
    pub min_cost: Option<Cost>,
    pub soft_max: Option<usize>,
    pub hard_max: Option<usize>,
    pub max_cost: Option<Cost>,
    pub mid_cost: Option<Cost>,
    pub period: Option<usize>,
    pub cost: Option<Cost>,
}

/// The effective parameters of a rule. Each rule only reads the fields it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSettings {
    pub enabled: bool,
    pub hard_min: usize,
    pub soft_min: usize,
    pub min_cost: Cost,
    pub soft_max: usize,
    pub hard_max: usize,
    pub max_cost: Cost,
    /// The cost of the middle tier, for rules with more than one.
    pub mid_cost: Cost,
    /// The length of the sliding period, for rules that count over one.
    pub period: usize,
    pub cost: Cost,
}

impl Default for RuleSettings {
    fn default() -> Self {
        RuleSettings {
            enabled: true,
            hard_min: 0,
            soft_min: 0,
            min_cost: Cost::Fixed(0),
            soft_max: 0,
            hard_max: 0,
            max_cost: Cost::Fixed(0),
            mid_cost: Cost::Fixed(0),
            period: 0,
            cost: Cost::Fixed(0),
        }
    }
}

impl RuleSettings {
    fn apply(mut self, changes: &RuleOverride) -> RuleSettings {
        self.enabled = changes.enabled.unwrap_or(self.enabled);
        self.hard_min = changes.hard_min.unwrap_or(self.hard_min);
        self.soft_min = changes.soft_min.unwrap_or(self.soft_min);
        self.min_cost = changes.min_cost.unwrap_or(self.min_cost);
        self.soft_max = changes.soft_max.unwrap_or(self.soft_max);
        self.hard_max = changes.hard_max.unwrap_or(self.hard_max);
        self.max_cost = changes.max_cost.unwrap_or(self.max_cost);
        self.mid_cost = changes.mid_cost.unwrap_or(self.mid_cost);
        self.period = changes.period.unwrap_or(self.period);
        self.cost = changes.cost.unwrap_or(self.cost);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotaConfig {
    pub priorities: Priorities,
    /// The weight of every distribution penalty.
    pub fairness_weight: i64,
    pub rules: HashMap<Rule, RuleOverride>,
}

impl Default for RotaConfig {
    fn default() -> Self {
        RotaConfig {
            priorities: Priorities::default(),
            fairness_weight: 2,
            rules: HashMap::default(),
        }
    }
}

impl RotaConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RotaError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, RotaError> {
        Ok(toml::from_str(contents)?)
    }

    /// The settings of `rule`: its defaults with the configured overrides applied.
    pub fn settings(&self, rule: Rule) -> RuleSettings {
        let defaults = rule.default_settings();
        match self.rules.get(&rule) {
            Some(changes) => defaults.apply(changes),
            None => defaults,
        }
    }

    pub fn all_settings(&self) -> EnumMap<Rule, RuleSettings> {
        EnumMap::from_fn(|rule| self.settings(rule))
    }

    /// Turns off every rule except the given ones.
    pub fn only(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        let keep = rules.into_iter().collect::<Vec<_>>();
        for rule in Rule::all() {
            self.rules.entry(rule).or_default().enabled = Some(keep.contains(&rule));
        }
        self
    }

    /// Overrides the settings of one rule.
    pub fn with_rule(mut self, rule: Rule, changes: RuleOverride) -> Self {
        let _ = self.rules.insert(rule, changes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_the_defaults() {
        let config = RotaConfig::from_toml_str("").expect("empty config is valid");

        assert_eq!(config, RotaConfig::default());
        assert_eq!(config.fairness_weight, 2);
        assert_eq!(config.priorities.debug, 144);
        assert_eq!(config.priorities.highest, 60);
        assert_eq!(config.priorities.high, 40);
        assert_eq!(config.priorities.medium, 24);
        assert_eq!(config.priorities.low, 12);
    }

    #[test]
    fn costs_can_be_priorities_or_numbers() {
        let config = RotaConfig::from_toml_str(
            r#"
            [priorities]
            medium = 30

            [rules.late_shifts_in_a_row]
            max_cost = "medium"

            [rules.max_midnights_in_a_row]
            max_cost = 7
            "#,
        )
        .expect("valid config");

        let late = config.settings(Rule::LateShiftsInARow);
        let midnights = config.settings(Rule::MaxMidnightsInARow);
        assert_eq!(config.priorities.weight(late.max_cost), 30);
        assert_eq!(config.priorities.weight(midnights.max_cost), 7);
        assert_eq!(late.hard_max, 3);
    }

    #[test]
    fn unknown_rules_are_rejected() {
        let result = RotaConfig::from_toml_str("[rules.no_such_rule]\nenabled = false\n");

        assert!(matches!(result, Err(RotaError::Config(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = RotaConfig::from_toml_str("[rules.max_days_worked]\nhard_maximum = 3\n");

        assert!(matches!(result, Err(RotaError::Config(_))));
    }

    #[test]
    fn only_disables_every_other_rule() {
        let config = RotaConfig::default().only([Rule::AllShiftsTaken, Rule::ApplyRequests]);

        let enabled = config
            .all_settings()
            .into_iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(rule, _)| rule)
            .collect::<Vec<_>>();
        assert_eq!(enabled, vec![Rule::AllShiftsTaken, Rule::ApplyRequests]);
    }
}
