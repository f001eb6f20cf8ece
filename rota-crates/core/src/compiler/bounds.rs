use crate::error::ValidationError;

/// The lower bounds on the length of a run: shorter than `hard_min` is forbidden, shorter than
/// `soft_min` costs `min_cost` per missing unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MinBounds {
    pub hard_min: usize,
    pub soft_min: usize,
    pub min_cost: i64,
}

/// The upper bounds on the length of a run: longer than `hard_max` is forbidden, longer than
/// `soft_max` costs `max_cost` per extra unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaxBounds {
    pub soft_max: usize,
    pub hard_max: usize,
    pub max_cost: i64,
}

/// Both sides of the bounds on the length of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SequenceBounds {
    pub hard_min: usize,
    pub soft_min: usize,
    pub min_cost: i64,
    pub soft_max: usize,
    pub hard_max: usize,
    pub max_cost: i64,
}

/// The bounds on the number of true literals in a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SumBounds {
    pub hard_min: i64,
    pub soft_min: i64,
    pub min_cost: i64,
    pub soft_max: i64,
    pub hard_max: i64,
    pub max_cost: i64,
}

impl MinBounds {
    pub fn new(hard_min: usize, soft_min: usize, min_cost: i64) -> MinBounds {
        MinBounds {
            hard_min,
            soft_min,
            min_cost,
        }
    }

    pub(crate) fn validate(&self, rule: &str, sequence_len: usize) -> Result<(), ValidationError> {
        check_cost(rule, "min_cost", self.min_cost)?;
        if self.soft_min < self.hard_min {
            return Err(ValidationError::InconsistentSoftHard {
                rule: rule.to_owned(),
                bound: "soft_min",
                soft: self.soft_min as i64,
                hard: self.hard_min as i64,
            });
        }
        if self.hard_min > sequence_len {
            return Err(ValidationError::InfeasibleBounds {
                rule: rule.to_owned(),
                bound: format!(
                    "hard_min {} exceeds the sequence length {sequence_len}",
                    self.hard_min
                ),
            });
        }
        Ok(())
    }
}

impl MaxBounds {
    pub fn new(soft_max: usize, hard_max: usize, max_cost: i64) -> MaxBounds {
        MaxBounds {
            soft_max,
            hard_max,
            max_cost,
        }
    }

    pub(crate) fn validate(&self, rule: &str) -> Result<(), ValidationError> {
        check_cost(rule, "max_cost", self.max_cost)?;
        if self.soft_max > self.hard_max {
            return Err(ValidationError::InconsistentSoftHard {
                rule: rule.to_owned(),
                bound: "soft_max",
                soft: self.soft_max as i64,
                hard: self.hard_max as i64,
            });
        }
        Ok(())
    }
}

impl SequenceBounds {
    pub fn min_side(&self) -> MinBounds {
        MinBounds::new(self.hard_min, self.soft_min, self.min_cost)
    }

    pub fn max_side(&self) -> MaxBounds {
        MaxBounds::new(self.soft_max, self.hard_max, self.max_cost)
    }

    pub(crate) fn validate(&self, rule: &str, sequence_len: usize) -> Result<(), ValidationError> {
        self.min_side().validate(rule, sequence_len)?;
        self.max_side().validate(rule)?;
        if self.hard_min > self.hard_max {
            return Err(ValidationError::InfeasibleBounds {
                rule: rule.to_owned(),
                bound: format!(
                    "hard_min {} exceeds hard_max {}",
                    self.hard_min, self.hard_max
                ),
            });
        }
        Ok(())
    }
}

impl SumBounds {
    /// An upper bound only; the sum may go down to 0 at no cost.
    pub fn at_most(soft_max: i64, hard_max: i64, max_cost: i64) -> SumBounds {
        SumBounds {
            hard_min: 0,
            soft_min: 0,
            min_cost: 0,
            soft_max,
            hard_max,
            max_cost,
        }
    }

    pub(crate) fn validate(&self, rule: &str, sequence_len: usize) -> Result<(), ValidationError> {
        check_cost(rule, "min_cost", self.min_cost)?;
        check_cost(rule, "max_cost", self.max_cost)?;
        if self.hard_min < 0 || self.hard_min > self.hard_max {
            return Err(ValidationError::InfeasibleBounds {
                rule: rule.to_owned(),
                bound: format!("[{}, {}]", self.hard_min, self.hard_max),
            });
        }
        if self.hard_min > sequence_len as i64 {
            return Err(ValidationError::InfeasibleBounds {
                rule: rule.to_owned(),
                bound: format!(
                    "hard_min {} exceeds the sequence length {sequence_len}",
                    self.hard_min
                ),
            });
        }
        if self.soft_min < self.hard_min {
            return Err(ValidationError::InconsistentSoftHard {
                rule: rule.to_owned(),
                bound: "soft_min",
                soft: self.soft_min,
                hard: self.hard_min,
            });
        }
        if self.soft_max > self.hard_max {
            return Err(ValidationError::InconsistentSoftHard {
                rule: rule.to_owned(),
                bound: "soft_max",
                soft: self.soft_max,
                hard: self.hard_max,
            });
        }
        Ok(())
    }
}

fn check_cost(rule: &str, bound: &'static str, cost: i64) -> Result<(), ValidationError> {
    if cost < 0 {
        return Err(ValidationError::NegativeCost {
            rule: rule.to_owned(),
            bound,
            cost,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_minimum_below_hard_minimum_is_inconsistent() {
        let result = MinBounds::new(3, 2, 1).validate("rule", 10);

        assert_eq!(
            result,
            Err(ValidationError::InconsistentSoftHard {
                rule: "rule".to_owned(),
                bound: "soft_min",
                soft: 2,
                hard: 3,
            })
        );
    }

    #[test]
    fn soft_maximum_above_hard_maximum_is_inconsistent() {
        assert!(matches!(
            MaxBounds::new(5, 4, 1).validate("rule"),
            Err(ValidationError::InconsistentSoftHard {
                bound: "soft_max",
                ..
            })
        ));
    }

    #[test]
    fn negative_costs_are_rejected() {
        assert!(matches!(
            MaxBounds::new(1, 2, -3).validate("rule"),
            Err(ValidationError::NegativeCost { cost: -3, .. })
        ));
    }

    #[test]
    fn crossing_hard_bounds_are_infeasible() {
        let bounds = SequenceBounds {
            hard_min: 3,
            soft_min: 3,
            min_cost: 0,
            soft_max: 2,
            hard_max: 2,
            max_cost: 0,
        };

        assert!(matches!(
            bounds.validate("rule", 10),
            Err(ValidationError::InfeasibleBounds { .. })
        ));
    }

    #[test]
    fn hard_sum_minimum_longer_than_the_sequence_is_infeasible() {
        let bounds = SumBounds {
            hard_min: 4,
            soft_min: 4,
            min_cost: 0,
            soft_max: 5,
            hard_max: 5,
            max_cost: 0,
        };

        assert!(bounds.validate("rule", 3).is_err());
        assert!(bounds.validate("rule", 4).is_ok());
    }
}
