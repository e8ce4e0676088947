//! Span bounds and their total order.
//!
//! The bound order is the foundation every split and consistency decision
//! is built on: both sort-based splitting and the topological predicates
//! reduce to comparisons of the four bounds involved.

use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One endpoint of a span: a value plus which side it sits on and whether
/// the value itself belongs to the span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanBound {
    pub value: Scalar,
    /// True for a lower bound, false for an upper bound.
    pub lower: bool,
    /// True when the bound value is part of the span.
    pub inclusive: bool,
}

impl SpanBound {
    /// Create a lower bound.
    pub fn lower(value: Scalar, inclusive: bool) -> Self {
        Self {
            value,
            lower: true,
            inclusive,
        }
    }

    /// Create an upper bound.
    pub fn upper(value: Scalar, inclusive: bool) -> Self {
        Self {
            value,
            lower: false,
            inclusive,
        }
    }
}

/// Strict total order over span bounds.
///
/// Bounds compare by value first. At equal values the side and inclusivity
/// decide:
///
/// - among lower bounds, inclusive sorts before exclusive (`[x` starts at
///   `x`, `(x` starts just after it);
/// - among upper bounds, exclusive sorts before inclusive (`x)` ends just
///   before `x`, `x]` ends at it);
/// - a lower bound against an upper bound at the same value counts the
///   shared point only when both sides are inclusive: `[x` sorts before
///   `x]`, while any exclusive side pushes the lower bound after the upper
///   one, so `[1,5)` and `[5,9]` never register as touching at `5`.
///
/// Antisymmetric and transitive, which the sort-based split relies on.
pub fn bound_cmp(a: &SpanBound, b: &SpanBound) -> Ordering {
    let cmp = a.value.total_cmp(&b.value);
    if cmp != Ordering::Equal {
        return cmp;
    }
    match (a.inclusive, b.inclusive) {
        (false, false) => {
            if a.lower == b.lower {
                Ordering::Equal
            } else if a.lower {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            if a.lower {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (true, false) => {
            if b.lower {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (true, true) => {
            if a.lower == b.lower {
                Ordering::Equal
            } else if a.lower {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

/// The smaller of two bounds under [`bound_cmp`].
pub(crate) fn bound_min(a: SpanBound, b: SpanBound) -> SpanBound {
    if bound_cmp(&a, &b) == Ordering::Greater { b } else { a }
}

/// The larger of two bounds under [`bound_cmp`].
pub(crate) fn bound_max(a: SpanBound, b: SpanBound) -> SpanBound {
    if bound_cmp(&a, &b) == Ordering::Less { b } else { a }
}
