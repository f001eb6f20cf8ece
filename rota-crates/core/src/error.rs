use thiserror::Error;

/// The parameters of a rule were rejected before any of its constraints were posted.
///
/// Every variant names the rule (the prefix passed to the compiler) and the offending bound.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{rule}: the bounds are infeasible ({bound})")]
    InfeasibleBounds { rule: String, bound: String },
    #[error("{rule}: the {what} is empty")]
    EmptyDomain { rule: String, what: &'static str },
    #[error("{rule}: the soft bound {bound} = {soft} is stricter than allowed by the hard bound {hard}")]
    InconsistentSoftHard {
        rule: String,
        bound: &'static str,
        soft: i64,
        hard: i64,
    },
    #[error("{rule}: the cost {cost} of {bound} is negative")]
    NegativeCost {
        rule: String,
        bound: &'static str,
        cost: i64,
    },
    #[error("{rule}: the {side} condition has {condition_len} literals, the sequence has {sequence_len}")]
    ConditionMismatch {
        rule: String,
        side: &'static str,
        condition_len: usize,
        sequence_len: usize,
    },
    #[error("{rule}: the {side} condition has an empty choice pattern")]
    EmptyPattern { rule: String, side: &'static str },
    #[error("{rule}: a continuing prior cannot be combined with a post condition")]
    ContinuingPriorWithPost { rule: String },
}
