//! Bounded one-dimensional intervals and their topological algebra.
//!
//! A `Span` is an interval over one ordinal base type with independently
//! inclusive or exclusive endpoints. Every predicate here is defined purely
//! in terms of the total bound order, so the index adapters never reason
//! about inclusivity themselves.
//!
//! ```rust
//! use spanbox::Span;
//!
//! let a = Span::int(0, 5)?;
//! let b = Span::int(3, 9)?;
//! assert!(a.overlaps(&b));
//! assert!(a.union(&b)?.contains_span(&a));
//! # Ok::<(), spanbox::IndexError>(())
//! ```

use crate::bound::{SpanBound, bound_cmp, bound_max, bound_min};
use crate::error::{IndexError, Result};
use crate::scalar::{Scalar, ScalarKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A bounded interval over one ordinal base type.
///
/// Invariant: `lower <= upper` under the total bound order, both bounds of
/// the same kind. Construction rejects malformed input instead of repairing
/// it; no operation discovers a bad span mid-algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    lower: SpanBound,
    upper: SpanBound,
}

impl Span {
    /// Create a span from explicit bound values and inclusivity flags.
    pub fn new(lower: Scalar, upper: Scalar, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        if lower.kind() != upper.kind() {
            return Err(IndexError::TypeMismatch {
                expected: lower.kind(),
                got: upper.kind(),
            });
        }
        let lower = SpanBound::lower(lower, lower_inc);
        let upper = SpanBound::upper(upper, upper_inc);
        // An empty span ([x,x) or (x,x]) is rejected, not silently dropped.
        if lower.value.total_cmp(&upper.value) == Ordering::Greater
            || (lower.value.total_cmp(&upper.value) == Ordering::Equal
                && !(lower.inclusive && upper.inclusive))
        {
            return Err(IndexError::InvalidSpan {
                lower: lower.value.to_string(),
                upper: upper.value.to_string(),
            });
        }
        Ok(Self { lower, upper })
    }

    /// Canonical closed-open integer span `[lower, upper)`.
    pub fn int(lower: i64, upper: i64) -> Result<Self> {
        Self::new(Scalar::Int(lower), Scalar::Int(upper), true, false)
    }

    /// Closed float span `[lower, upper]`.
    pub fn float(lower: f64, upper: f64) -> Result<Self> {
        Self::new(Scalar::Float(lower), Scalar::Float(upper), true, true)
    }

    /// Closed-open timestamp span over microseconds since the epoch.
    pub fn timestamp(lower_us: i64, upper_us: i64) -> Result<Self> {
        Self::new(
            Scalar::Timestamp(lower_us),
            Scalar::Timestamp(upper_us),
            true,
            false,
        )
    }

    /// Assemble a span from pre-validated bounds. Used for derived prefix
    /// spans (e.g. quad-tree centroids), which may be degenerate in ways
    /// `new` rejects for user spans.
    pub(crate) fn from_bounds(lower: SpanBound, upper: SpanBound) -> Self {
        debug_assert_eq!(lower.value.kind(), upper.value.kind());
        Self { lower, upper }
    }

    /// The lower bound.
    pub fn lower(&self) -> &SpanBound {
        &self.lower
    }

    /// The upper bound.
    pub fn upper(&self) -> &SpanBound {
        &self.upper
    }

    /// The base-type kind of both bounds.
    pub fn kind(&self) -> ScalarKind {
        self.lower.value.kind()
    }

    /// Width of the span in the base type's natural unit.
    pub fn width(&self) -> f64 {
        self.upper.value.signed_delta(&self.lower.value)
    }

    /// True when the two spans share at least one point.
    pub fn overlaps(&self, other: &Span) -> bool {
        bound_cmp(&self.lower, &other.upper) != Ordering::Greater
            && bound_cmp(&other.lower, &self.upper) != Ordering::Greater
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains_span(&self, other: &Span) -> bool {
        bound_cmp(&self.lower, &other.lower) != Ordering::Greater
            && bound_cmp(&self.upper, &other.upper) != Ordering::Less
    }

    /// True when this span lies entirely inside `other`.
    pub fn contained_by(&self, other: &Span) -> bool {
        other.contains_span(self)
    }

    /// Exact structural equality: both bounds and both inclusivity flags.
    ///
    /// Index consistency forbids fuzzy comparison, so this is deliberately
    /// the only equality the adapters use.
    pub fn same(&self, other: &Span) -> bool {
        self == other
    }

    /// True when the spans touch without sharing a point: one ends exactly
    /// where the other starts, with exactly one of the meeting bounds
    /// inclusive.
    pub fn adjacent(&self, other: &Span) -> bool {
        bounds_touch(&self.upper, &other.lower) || bounds_touch(&other.upper, &self.lower)
    }

    /// True when this span ends strictly before `other` starts.
    pub fn before(&self, other: &Span) -> bool {
        bound_cmp(&self.upper, &other.lower) == Ordering::Less
    }

    /// True when this span does not extend past the end of `other`.
    pub fn over_before(&self, other: &Span) -> bool {
        bound_cmp(&self.upper, &other.upper) != Ordering::Greater
    }

    /// True when this span starts strictly after `other` ends.
    pub fn after(&self, other: &Span) -> bool {
        bound_cmp(&self.lower, &other.upper) == Ordering::Greater
    }

    /// True when this span does not extend before the start of `other`.
    pub fn over_after(&self, other: &Span) -> bool {
        bound_cmp(&self.lower, &other.lower) != Ordering::Less
    }

    /// Smallest span containing both operands.
    ///
    /// Folding this over any sequence of spans yields the same result
    /// regardless of order.
    pub fn union(&self, other: &Span) -> Result<Span> {
        if self.kind() != other.kind() {
            return Err(IndexError::TypeMismatch {
                expected: self.kind(),
                got: other.kind(),
            });
        }
        Ok(Span {
            lower: bound_min(self.lower, other.lower),
            upper: bound_max(self.upper, other.upper),
        })
    }

    /// Union without the kind check, for split internals that validate
    /// operand kinds once up front.
    pub(crate) fn union_unchecked(&self, other: &Span) -> Span {
        debug_assert_eq!(self.kind(), other.kind());
        Span {
            lower: bound_min(self.lower, other.lower),
            upper: bound_max(self.upper, other.upper),
        }
    }

    /// Gap between the spans: zero when they overlap, otherwise the
    /// distance between the nearer bounds. Used for scoring only.
    pub fn distance(&self, other: &Span) -> Result<f64> {
        if self.kind() != other.kind() {
            return Err(IndexError::TypeMismatch {
                expected: self.kind(),
                got: other.kind(),
            });
        }
        if self.overlaps(other) {
            return Ok(0.0);
        }
        if self.before(other) {
            Ok(other.lower.value.distance(&self.upper.value))
        } else {
            Ok(self.lower.value.distance(&other.upper.value))
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower.inclusive { '[' } else { '(' },
            self.lower.value,
            self.upper.value,
            if self.upper.inclusive { ']' } else { ')' },
        )
    }
}

/// True when an upper bound meets a lower bound at the same value with
/// exactly one side inclusive, e.g. `[1,5)` next to `[5,9]`.
fn bounds_touch(upper: &SpanBound, lower: &SpanBound) -> bool {
    upper.value.total_cmp(&lower.value) == Ordering::Equal
        && upper.inclusive != lower.inclusive
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(l: i64, u: i64) -> Span {
        Span::int(l, u).unwrap()
    }

    #[test]
    fn test_construction_rejects_malformed() {
        assert!(Span::int(5, 1).is_err());
        // [x,x) is empty.
        assert!(Span::int(3, 3).is_err());
        // A single point [x,x] is fine.
        assert!(Span::new(Scalar::Int(3), Scalar::Int(3), true, true).is_ok());
        // Mixed kinds are rejected at construction.
        assert!(Span::new(Scalar::Int(0), Scalar::Float(1.0), true, false).is_err());
    }

    #[test]
    fn test_overlap_respects_inclusivity() {
        // [1,5) and [5,9) share no point.
        assert!(!span(1, 5).overlaps(&span(5, 9)));
        // [1,5] and [5,9] share the point 5.
        let a = Span::new(Scalar::Int(1), Scalar::Int(5), true, true).unwrap();
        let b = Span::new(Scalar::Int(5), Scalar::Int(9), true, true).unwrap();
        assert!(a.overlaps(&b));
        assert!(span(1, 6).overlaps(&span(5, 9)));
    }

    #[test]
    fn test_containment() {
        assert!(span(0, 10).contains_span(&span(2, 5)));
        assert!(span(0, 10).contains_span(&span(0, 10)));
        assert!(!span(2, 5).contains_span(&span(0, 10)));
        assert!(span(2, 5).contained_by(&span(0, 10)));
    }

    #[test]
    fn test_adjacency() {
        assert!(span(1, 5).adjacent(&span(5, 9)));
        assert!(span(5, 9).adjacent(&span(1, 5)));
        assert!(!span(1, 5).adjacent(&span(6, 9)));
        // Both inclusive at 5: overlapping, not adjacent.
        let a = Span::new(Scalar::Int(1), Scalar::Int(5), true, true).unwrap();
        let b = Span::new(Scalar::Int(5), Scalar::Int(9), true, true).unwrap();
        assert!(!a.adjacent(&b));
    }

    #[test]
    fn test_ordering_predicates() {
        // before is strict, over_before is not.
        assert!(span(1, 5).before(&span(5, 9)));
        assert!(!span(1, 6).before(&span(5, 9)));
        assert!(span(1, 6).over_before(&span(5, 9)));
        assert!(span(6, 9).after(&span(1, 5)));
        assert!(span(5, 9).over_after(&span(1, 5)));
        assert!(!span(0, 9).over_after(&span(1, 5)));
    }

    #[test]
    fn test_union_fold_order_independent() {
        let spans = [span(0, 2), span(5, 9), span(1, 4)];
        let ab = spans[0].union(&spans[1]).unwrap();
        let abc = ab.union(&spans[2]).unwrap();
        let bc = spans[1].union(&spans[2]).unwrap();
        let a_bc = spans[0].union(&bc).unwrap();
        assert_eq!(abc, a_bc);
        assert_eq!(abc, span(0, 9));
        // Idempotence.
        assert_eq!(spans[0].union(&spans[0]).unwrap(), spans[0]);
    }

    #[test]
    fn test_union_contains_operands() {
        let a = span(0, 3);
        let b = span(7, 11);
        let u = a.union(&b).unwrap();
        assert!(u.contains_span(&a));
        assert!(u.contains_span(&b));
    }

    #[test]
    fn test_distance() {
        assert_eq!(span(0, 5).distance(&span(3, 9)).unwrap(), 0.0);
        assert_eq!(span(0, 5).distance(&span(8, 9)).unwrap(), 3.0);
        assert_eq!(span(8, 9).distance(&span(0, 5)).unwrap(), 3.0);
    }

    #[test]
    fn test_distance_rejects_mixed_kinds() {
        let a = span(0, 5);
        let b = Span::float(0.0, 5.0).unwrap();
        assert!(a.distance(&b).is_err());
        assert!(a.union(&b).is_err());
    }

    #[test]
    fn test_width_units() {
        assert_eq!(span(2, 9).width(), 7.0);
        let t = Span::timestamp(0, 3_000_000).unwrap();
        assert_eq!(t.width(), 3.0);
    }

    #[test]
    fn test_same_is_structural() {
        let half_open = span(1, 5);
        let closed = Span::new(Scalar::Int(1), Scalar::Int(5), true, true).unwrap();
        assert!(!half_open.same(&closed));
        assert!(half_open.same(&span(1, 5)));
    }
}
