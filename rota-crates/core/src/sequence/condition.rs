use crate::error::ValidationError;
use crate::variables::Literal;

/// A fixed pattern which has to match immediately before the window under consideration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prior {
    /// Aligned index-for-index with the constrained sequence.
    pub literals: Vec<Literal>,
    /// The value every position of the pattern has to take.
    pub choices: Vec<bool>,
    /// The run after the pattern is exempt for as long as `literals` stays true at its start.
    pub continue_shifts: bool,
}

impl Prior {
    pub fn new(literals: Vec<Literal>, choices: Vec<bool>) -> Prior {
        Prior {
            literals,
            choices,
            continue_shifts: false,
        }
    }

    pub fn continuing(literals: Vec<Literal>, choices: Vec<bool>) -> Prior {
        Prior {
            literals,
            choices,
            continue_shifts: true,
        }
    }
}

/// A fixed pattern which has to match immediately after the window under consideration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub literals: Vec<Literal>,
    pub choices: Vec<bool>,
}

impl Post {
    pub fn new(literals: Vec<Literal>, choices: Vec<bool>) -> Post {
        Post { literals, choices }
    }
}

/// Restricts where a sequence rule applies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Condition {
    /// Windows slide freely over the whole sequence.
    #[default]
    None,
    Prior(Prior),
    Post(Post),
    /// Windows are the gap strictly between a prior match and a post match.
    Both { prior: Prior, post: Post },
}

impl Condition {
    pub fn prior(&self) -> Option<&Prior> {
        match self {
            Condition::Prior(prior) | Condition::Both { prior, .. } => Some(prior),
            Condition::None | Condition::Post(_) => None,
        }
    }

    pub fn post(&self) -> Option<&Post> {
        match self {
            Condition::Post(post) | Condition::Both { post, .. } => Some(post),
            Condition::None | Condition::Prior(_) => None,
        }
    }

    /// The width of the prior pattern, or 0 without a prior.
    pub fn prior_width(&self) -> usize {
        self.prior().map_or(0, |prior| prior.choices.len())
    }

    /// The width of the post pattern, or 0 without a post.
    pub fn post_width(&self) -> usize {
        self.post().map_or(0, |post| post.choices.len())
    }

    /// Whether the prior exempts runs that continue its own sequence.
    pub fn is_continuing(&self) -> bool {
        self.prior().is_some_and(|prior| prior.continue_shifts)
    }

    /// The prior literal at the first position after a prior match ending just before `index`,
    /// when the prior is continuing.
    pub(crate) fn continuation(&self, index: usize) -> Option<Literal> {
        self.prior()
            .filter(|prior| prior.continue_shifts)
            .and_then(|prior| prior.literals.get(index).copied())
    }

    /// Checks that the condition can be applied to a sequence of `sequence_len` literals.
    pub fn validate(&self, rule: &str, sequence_len: usize) -> Result<(), ValidationError> {
        if let Some(prior) = self.prior() {
            check_pattern(rule, "prior", &prior.literals, &prior.choices, sequence_len)?;
        }
        if let Some(post) = self.post() {
            check_pattern(rule, "post", &post.literals, &post.choices, sequence_len)?;
        }
        if let Condition::Both { prior, .. } = self {
            if prior.continue_shifts {
                return Err(ValidationError::ContinuingPriorWithPost {
                    rule: rule.to_owned(),
                });
            }
        }
        Ok(())
    }
}

fn check_pattern(
    rule: &str,
    side: &'static str,
    literals: &[Literal],
    choices: &[bool],
    sequence_len: usize,
) -> Result<(), ValidationError> {
    if choices.is_empty() {
        return Err(ValidationError::EmptyPattern {
            rule: rule.to_owned(),
            side,
        });
    }
    if literals.len() != sequence_len {
        return Err(ValidationError::ConditionMismatch {
            rule: rule.to_owned(),
            side,
            condition_len: literals.len(),
            sequence_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn literals(model: &mut Model, n: usize) -> Vec<Literal> {
        (0..n)
            .map(|i| model.new_bool_var(format!("p{i}")).into())
            .collect()
    }

    #[test]
    fn widths_follow_the_choice_patterns() {
        let mut model = Model::default();
        let condition = Condition::Both {
            prior: Prior::new(literals(&mut model, 4), vec![true, true]),
            post: Post::new(literals(&mut model, 4), vec![false]),
        };

        assert_eq!(condition.prior_width(), 2);
        assert_eq!(condition.post_width(), 1);
        assert!(!condition.is_continuing());
        assert_eq!(Condition::None.prior_width(), 0);
    }

    #[test]
    fn misaligned_literals_are_rejected() {
        let mut model = Model::default();
        let condition = Condition::Prior(Prior::new(literals(&mut model, 3), vec![true]));

        assert_eq!(
            condition.validate("rule", 4),
            Err(ValidationError::ConditionMismatch {
                rule: "rule".to_owned(),
                side: "prior",
                condition_len: 3,
                sequence_len: 4,
            })
        );
        assert!(condition.validate("rule", 3).is_ok());
    }

    #[test]
    fn empty_patterns_are_rejected() {
        let mut model = Model::default();
        let condition = Condition::Post(Post::new(literals(&mut model, 3), vec![]));

        assert!(matches!(
            condition.validate("rule", 3),
            Err(ValidationError::EmptyPattern { side: "post", .. })
        ));
    }

    #[test]
    fn continuing_prior_cannot_be_combined_with_post() {
        let mut model = Model::default();
        let condition = Condition::Both {
            prior: Prior::continuing(literals(&mut model, 3), vec![true]),
            post: Post::new(literals(&mut model, 3), vec![true]),
        };

        assert!(matches!(
            condition.validate("rule", 3),
            Err(ValidationError::ContinuingPriorWithPost { .. })
        ));
    }
}
