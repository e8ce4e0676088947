//! Double-sorting split search, shared by every box dimensionality.
//!
//! Given the spans of the entries overflowing a page (one axis at a time),
//! the search considers candidate boundaries `(left_upper, right_lower)`
//! produced by two symmetric sweeps over the entries sorted by lower and by
//! upper bound, keeping the candidate with the smallest group overlap among
//! those that satisfy the balance floor. The adapters then classify entries
//! as forced-left, forced-right or common, and distribute the common ones
//! with a secondary ranking.

use crate::bound::{SpanBound, bound_cmp};
use crate::boxes::AxisKey;
use crate::index::SplitResult;
use crate::span::Span;
use std::cmp::Ordering;

/// A split boundary selected by the candidate search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitCandidate {
    /// Greatest lower bound of the right group.
    pub right_lower: SpanBound,
    /// Least upper bound of the left group.
    pub left_upper: SpanBound,
    /// Target size of the left group, assuming the most uniform
    /// distribution of common entries.
    pub left_count: usize,
    /// `min(left, right) / total` for the targeted distribution.
    pub ratio: f64,
    /// Signed gap `left_upper - right_lower`; negative means the two
    /// groups truly do not overlap.
    pub overlap: f64,
}

struct CandidateSearch {
    total: usize,
    limit_ratio: f64,
    best: Option<SplitCandidate>,
}

impl CandidateSearch {
    fn new(total: usize, limit_ratio: f64) -> Self {
        Self {
            total,
            limit_ratio,
            best: None,
        }
    }

    /// Consider one candidate boundary.
    ///
    /// `min_left` entries cannot go right (their lower bound precedes
    /// `right_lower`); `max_left` entries can go left (their upper bound
    /// does not exceed `left_upper`). The targeted left size is picked
    /// inside that window, as close to half as the window allows.
    fn consider(
        &mut self,
        right_lower: SpanBound,
        min_left: usize,
        left_upper: SpanBound,
        max_left: usize,
    ) {
        let half = self.total.div_ceil(2);
        let left_count = if min_left >= half {
            min_left
        } else if self.total - max_left >= half {
            max_left
        } else {
            self.total / 2
        };
        let right_count = self.total - left_count;
        let ratio = left_count.min(right_count) as f64 / self.total as f64;
        if ratio <= self.limit_ratio {
            return;
        }

        let overlap = left_upper.value.signed_delta(&right_lower.value);
        let better = match &self.best {
            None => true,
            Some(best) => {
                overlap < best.overlap || (overlap == best.overlap && ratio > best.ratio)
            }
        };
        if better {
            self.best = Some(SplitCandidate {
                right_lower,
                left_upper,
                left_count,
                ratio,
                overlap,
            });
        }
    }
}

/// Search for the best split boundary over one axis.
///
/// Returns `None` when no candidate satisfies the balance floor (degenerate
/// input, e.g. all spans identical); the caller then takes its fallback.
pub(crate) fn search_candidates(spans: &[Span], limit_ratio: f64) -> Option<SplitCandidate> {
    let n = spans.len();
    debug_assert!(n >= 2);

    // The two auxiliary orderings: entries as (lower, upper) bound pairs,
    // sorted by lower bound and by upper bound.
    let mut by_lower: Vec<(SpanBound, SpanBound)> =
        spans.iter().map(|s| (*s.lower(), *s.upper())).collect();
    let mut by_upper = by_lower.clone();
    by_lower.sort_by(|a, b| bound_cmp(&a.0, &b.0));
    by_upper.sort_by(|a, b| bound_cmp(&a.1, &b.1));

    let mut search = CandidateSearch::new(n, limit_ratio);

    // Sweep ascending over distinct lower bounds: each distinct lower bound
    // becomes the right group's lower boundary, and the least upper bound
    // covering everything that must stay left becomes the left boundary.
    let mut i1 = 0usize;
    let mut i2 = 0usize;
    let mut right_lower = by_lower[0].0;
    let mut left_upper = by_upper[0].0;
    loop {
        while i1 < n && bound_cmp(&right_lower, &by_lower[i1].0) == Ordering::Equal {
            if bound_cmp(&by_lower[i1].1, &left_upper) == Ordering::Greater {
                left_upper = by_lower[i1].1;
            }
            i1 += 1;
        }
        if i1 >= n {
            break;
        }
        right_lower = by_lower[i1].0;

        while i2 < n && bound_cmp(&by_upper[i2].1, &left_upper) != Ordering::Greater {
            i2 += 1;
        }

        search.consider(right_lower, i1, left_upper, i2);
    }

    // Symmetric sweep descending over distinct upper bounds: each distinct
    // upper bound becomes the left boundary, and the greatest lower bound
    // below everything forced right becomes the right boundary.
    let mut j1 = n as isize - 1;
    let mut j2 = n as isize - 1;
    let mut right_lower = by_upper[n - 1].0;
    let mut left_upper = by_upper[n - 1].1;
    loop {
        while j2 >= 0 && bound_cmp(&left_upper, &by_upper[j2 as usize].1) == Ordering::Equal {
            if bound_cmp(&by_upper[j2 as usize].0, &right_lower) == Ordering::Less {
                right_lower = by_upper[j2 as usize].0;
            }
            j2 -= 1;
        }
        if j2 < 0 {
            break;
        }
        left_upper = by_upper[j2 as usize].1;

        while j1 >= 0 && bound_cmp(&by_lower[j1 as usize].0, &right_lower) != Ordering::Less {
            j1 -= 1;
        }

        search.consider(
            right_lower,
            (j1 + 1) as usize,
            left_upper,
            (j2 + 1) as usize,
        );
    }

    search.best
}

/// Union of two axis keys after operand kinds have been validated; lone
/// axes are copied through.
pub(crate) fn merge_axis_keys<K: AxisKey>(a: &K, b: &K) -> K {
    let mut out = K::empty();
    for n in 0..K::DIMENSIONS {
        match (a.axis(n), b.axis(n)) {
            (Some(x), Some(y)) => out.set_axis(n, x.union_unchecked(y)),
            (Some(x), None) => out.set_axis(n, *x),
            (None, Some(y)) => out.set_axis(n, *y),
            (None, None) => {}
        }
    }
    out
}

/// Accumulator for the two split groups: two index lists plus two group
/// keys grown by folding union as entries are placed.
///
/// The merge closure is the key union; adapters validate operand kinds
/// before any split work begins, so it is infallible here.
pub(crate) struct SplitBuilder<K, F>
where
    F: Fn(&K, &K) -> K,
{
    merge: F,
    left: Vec<usize>,
    right: Vec<usize>,
    left_key: Option<K>,
    right_key: Option<K>,
}

impl<K: Clone, F: Fn(&K, &K) -> K> SplitBuilder<K, F> {
    pub(crate) fn new(merge: F) -> Self {
        Self {
            merge,
            left: Vec::new(),
            right: Vec::new(),
            left_key: None,
            right_key: None,
        }
    }

    pub(crate) fn place_left(&mut self, index: usize, key: &K) {
        self.left.push(index);
        self.left_key = Some(match &self.left_key {
            Some(acc) => (self.merge)(acc, key),
            None => key.clone(),
        });
    }

    pub(crate) fn place_right(&mut self, index: usize, key: &K) {
        self.right.push(index);
        self.right_key = Some(match &self.right_key {
            Some(acc) => (self.merge)(acc, key),
            None => key.clone(),
        });
    }

    pub(crate) fn left_len(&self) -> usize {
        self.left.len()
    }

    pub(crate) fn right_len(&self) -> usize {
        self.right.len()
    }

    pub(crate) fn left_key(&self) -> Option<&K> {
        self.left_key.as_ref()
    }

    pub(crate) fn right_key(&self) -> Option<&K> {
        self.right_key.as_ref()
    }

    /// Finish the split. `None` when either group ended up empty, which the
    /// adapters treat as a signal to fall back to the trivial split.
    pub(crate) fn build(self, used_fallback: bool) -> Option<SplitResult<K>> {
        match (self.left_key, self.right_key) {
            (Some(left_key), Some(right_key)) => Some(SplitResult {
                left: self.left,
                right: self.right,
                left_key,
                right_key,
                used_fallback,
            }),
            _ => None,
        }
    }
}

/// Trivial fallback split: entries sorted by lower bound, cut in half.
///
/// `axis_span` maps an entry position to the span that orders it; the key
/// handed to the builder is the entry's full key.
pub(crate) fn fallback_split<K: Clone>(
    keys: &[K],
    axis_span: impl Fn(usize) -> Span,
    merge: impl Fn(&K, &K) -> K,
) -> Option<SplitResult<K>> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| bound_cmp(axis_span(a).lower(), axis_span(b).lower()));

    let mut builder = SplitBuilder::new(merge);
    let cut = keys.len().div_ceil(2);
    for (pos, &idx) in order.iter().enumerate() {
        if pos < cut {
            builder.place_left(idx, &keys[idx]);
        } else {
            builder.place_right(idx, &keys[idx]);
        }
    }
    builder.build(true)
}

/// One-sided growth of `original` needed to absorb `candidate`: how far the
/// union's lower bound precedes the original's plus how far its upper bound
/// follows, in the base type's natural unit.
pub(crate) fn span_growth(original: &Span, candidate: &Span) -> f64 {
    let union = original.union_unchecked(candidate);
    original.lower().value.signed_delta(&union.lower().value)
        + union.upper().value.signed_delta(&original.upper().value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(i64, i64)]) -> Vec<Span> {
        pairs.iter().map(|&(l, u)| Span::int(l, u).unwrap()).collect()
    }

    #[test]
    fn test_disjoint_clusters_split_cleanly() {
        let s = spans(&[(0, 2), (1, 3), (10, 12), (11, 13)]);
        let cand = search_candidates(&s, 0.3).unwrap();
        // The winning gap separates the clusters: negative overlap.
        assert!(cand.overlap < 0.0);
        assert_eq!(cand.left_count, 2);
        assert!(cand.ratio > 0.3);
    }

    #[test]
    fn test_identical_spans_have_no_candidate() {
        let s = spans(&[(5, 9), (5, 9), (5, 9), (5, 9)]);
        assert!(search_candidates(&s, 0.3).is_none());
    }

    #[test]
    fn test_unbalanced_candidates_rejected() {
        // One outlier against many identical spans: any boundary puts
        // almost everything on one side.
        let s = spans(&[(0, 1), (5, 9), (5, 9), (5, 9), (5, 9), (5, 9)]);
        assert!(search_candidates(&s, 0.3).is_none());
    }

    #[test]
    fn test_span_growth() {
        let original = Span::int(5, 10).unwrap();
        assert_eq!(span_growth(&original, &Span::int(6, 9).unwrap()), 0.0);
        assert_eq!(span_growth(&original, &Span::int(2, 12).unwrap()), 5.0);
        assert_eq!(span_growth(&original, &Span::int(5, 15).unwrap()), 5.0);
    }

    #[test]
    fn test_fallback_split_halves() {
        let s = spans(&[(5, 9), (0, 2), (7, 8), (3, 4)]);
        let result = fallback_split(&s, |i| s[i], |a, b| a.union_unchecked(b)).unwrap();
        assert!(result.used_fallback);
        assert_eq!(result.left.len(), 2);
        assert_eq!(result.right.len(), 2);
        // Sorted by lower bound: (0,2) and (3,4) go left.
        assert_eq!(result.left_key, Span::int(0, 4).unwrap());
        assert_eq!(result.right_key, Span::int(5, 9).unwrap());
    }

    #[test]
    fn test_builder_accumulates_union() {
        let s = spans(&[(0, 2), (8, 9), (1, 5)]);
        let mut builder = SplitBuilder::new(|a: &Span, b: &Span| a.union_unchecked(b));
        builder.place_left(0, &s[0]);
        builder.place_left(2, &s[2]);
        builder.place_right(1, &s[1]);
        let result = builder.build(false).unwrap();
        assert_eq!(result.left_key, Span::int(0, 5).unwrap());
        assert_eq!(result.right_key, Span::int(8, 9).unwrap());
        assert!(!result.used_fallback);
    }
}
