//! Windowing and pattern helpers over ordered literal sequences.
//!
//! A window at offset `start` with run length `length` consists of the prior pattern at
//! `[start, start + lp)`, the span at `[start + lp, start + lp + length)` and the post pattern
//! directly after the span, where `lp` and `lq` are the widths of the prior and post patterns of
//! the [`Condition`] (0 when absent).
mod condition;

use std::ops::RangeInclusive;
use std::slice::Windows;

pub use condition::*;

use crate::variables::Literal;

/// A lazy, restartable iterator over the overlapping length-`n` slices of a sequence.
#[derive(Clone, Debug)]
pub struct Window<'a, T> {
    inner: Option<Windows<'a, T>>,
}

impl<'a, T> Iterator for Window<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(Iterator::next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), Iterator::size_hint)
    }
}

/// All overlapping length-`n` slices of `seq`, in order. Yields nothing when `n` is 0 or larger
/// than the sequence.
pub fn window<T>(seq: &[T], n: usize) -> Window<'_, T> {
    Window {
        inner: (n > 0).then(|| seq.windows(n)),
    }
}

/// The literals of `seq[start .. start + length]`, preceded by `¬seq[start - 1]` and followed by
/// `¬seq[start + length]` where those positions exist.
///
/// All literals in the result being true means `seq` has a maximal run of exactly `length` true
/// literals at `start`.
pub fn bounded_span(seq: &[Literal], start: usize, length: usize) -> Vec<Literal> {
    let mut span = Vec::with_capacity(length + 2);
    if start > 0 {
        span.push(!seq[start - 1]);
    }
    span.extend_from_slice(&seq[start..start + length]);
    if start + length < seq.len() {
        span.push(!seq[start + length]);
    }
    span
}

/// The number of offsets at which the prior, a span of `length` and the post all fit in a
/// sequence of length `n`.
pub fn window_size(n: usize, length: usize, condition: &Condition) -> usize {
    (n + 1).saturating_sub(length + condition.prior_width() + condition.post_width())
}

/// The span lengths to examine: only `length`, or every length up to it when the span grows.
pub fn window_lengths(length: usize, grows: bool) -> RangeInclusive<usize> {
    if grows {
        0..=length
    } else {
        length..=length
    }
}

/// The span of the window at `start`; when `bounded`, including the sentinels that make the run
/// maximal.
pub fn shift_span(
    seq: &[Literal],
    start: usize,
    length: usize,
    bounded: bool,
    condition: &Condition,
) -> Vec<Literal> {
    let begin = start + condition.prior_width();
    if bounded {
        bounded_span(seq, begin, length)
    } else {
        seq[begin..begin + length].to_vec()
    }
}

/// The literals which are all true exactly when the prior pattern matches at `start`.
pub fn predicates(start: usize, condition: &Condition) -> Vec<Literal> {
    condition.prior().map_or_else(Vec::new, |prior| {
        apply_choices(&prior.literals[start..start + prior.choices.len()], &prior.choices)
    })
}

/// The literals which are all true exactly when the post pattern matches directly after the span
/// of the window at `start` with the given length.
pub fn post_predicates(start: usize, length: usize, condition: &Condition) -> Vec<Literal> {
    let begin = start + condition.prior_width() + length;
    condition.post().map_or_else(Vec::new, |post| {
        apply_choices(&post.literals[begin..begin + post.choices.len()], &post.choices)
    })
}

fn apply_choices(literals: &[Literal], choices: &[bool]) -> Vec<Literal> {
    literals
        .iter()
        .zip(choices)
        .map(|(&literal, &choice)| if choice { literal } else { !literal })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn sequence(model: &mut Model, n: usize) -> Vec<Literal> {
        (0..n)
            .map(|i| model.new_bool_var(format!("x{i}")).into())
            .collect()
    }

    #[test]
    fn window_yields_overlapping_slices() {
        let windows = window(&[1, 2, 3, 4], 3).collect::<Vec<_>>();

        assert_eq!(windows, vec![&[1, 2, 3][..], &[2, 3, 4][..]]);
    }

    #[test]
    fn window_is_restartable() {
        let windows = window(&[1, 2, 3], 2);

        assert_eq!(windows.clone().count(), 2);
        assert_eq!(windows.count(), 2);
    }

    #[test]
    fn degenerate_windows_are_empty() {
        assert_eq!(window(&[1, 2, 3], 0).count(), 0);
        assert_eq!(window(&[1, 2, 3], 4).count(), 0);
        assert_eq!(window::<u8>(&[], 1).count(), 0);
    }

    #[test]
    fn bounded_span_adds_both_sentinels_inside_the_sequence() {
        let mut model = Model::default();
        let x = sequence(&mut model, 5);

        assert_eq!(bounded_span(&x, 1, 2), vec![!x[0], x[1], x[2], !x[3]]);
    }

    #[test]
    fn bounded_span_omits_sentinels_at_the_edges() {
        let mut model = Model::default();
        let x = sequence(&mut model, 3);

        assert_eq!(bounded_span(&x, 0, 2), vec![x[0], x[1], !x[2]]);
        assert_eq!(bounded_span(&x, 1, 2), vec![!x[0], x[1], x[2]]);
        assert_eq!(bounded_span(&x, 0, 3), x);
    }

    #[test]
    fn zero_length_bounded_span_is_only_sentinels() {
        let mut model = Model::default();
        let x = sequence(&mut model, 3);

        assert_eq!(bounded_span(&x, 1, 0), vec![!x[0], !x[1]]);
        assert_eq!(bounded_span(&x, 0, 0), vec![!x[0]]);
        assert_eq!(bounded_span(&x, 3, 0), vec![!x[2]]);
    }

    #[test]
    fn window_size_shrinks_with_the_pattern_widths() {
        let mut model = Model::default();
        let x = sequence(&mut model, 6);
        let condition = Condition::Both {
            prior: Prior::new(x.clone(), vec![true, true]),
            post: Post::new(x.clone(), vec![true]),
        };

        assert_eq!(window_size(6, 2, &Condition::None), 5);
        assert_eq!(window_size(6, 2, &condition), 2);
        assert_eq!(window_size(6, 4, &condition), 0);
        assert_eq!(window_size(6, 7, &Condition::None), 0);
    }

    #[test]
    fn window_lengths_grow_from_zero() {
        assert_eq!(window_lengths(3, true).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(window_lengths(3, false).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn shift_span_starts_after_the_prior() {
        let mut model = Model::default();
        let x = sequence(&mut model, 5);
        let condition = Condition::Prior(Prior::new(x.clone(), vec![true]));

        assert_eq!(shift_span(&x, 1, 2, false, &condition), vec![x[2], x[3]]);
        assert_eq!(
            shift_span(&x, 1, 2, true, &condition),
            vec![!x[1], x[2], x[3], !x[4]]
        );
    }

    #[test]
    fn predicates_apply_the_choices() {
        let mut model = Model::default();
        let x = sequence(&mut model, 5);
        let p = sequence(&mut model, 5);
        let condition = Condition::Both {
            prior: Prior::new(p.clone(), vec![true, false]),
            post: Post::new(x.clone(), vec![false]),
        };

        assert_eq!(predicates(1, &condition), vec![p[1], !p[2]]);
        assert_eq!(post_predicates(1, 1, &condition), vec![!x[4]]);
        assert!(predicates(0, &Condition::None).is_empty());
        assert!(post_predicates(0, 2, &Condition::None).is_empty());
    }
}
